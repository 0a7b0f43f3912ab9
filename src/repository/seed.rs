//! Seed data
//!
//! The base rows are inserted by `migrations/0002_seed_data.sql` (and preloaded
//! by the in-memory store). [`seed`] then links the books to their authors and
//! categories, once: if any link already exists it does nothing.

use chrono::NaiveDate;

use super::Store;
use crate::{
    error::AppResult,
    models::{Author, Category, Publisher},
};

pub(crate) const PUBLISHERS: &[(i32, &str)] = &[
    (1, "Northwind Press"),
    (2, "Harbor House"),
    (3, "Lantern Books"),
];

pub(crate) const CATEGORIES: &[(i32, &str)] = &[
    (1, "Fiction"),
    (2, "Science"),
    (3, "History"),
    (4, "Technology"),
];

/// (id, first name, last name, biography, (year, month, day))
pub(crate) const AUTHORS: &[(i32, &str, &str, &str, (i32, u32, u32))] = &[
    (1, "Elena", "Marlowe", "Writes about the people behind early computing.", (1985, 3, 15)),
    (2, "Tomas", "Reyes", "Historian of maritime trade routes.", (1978, 7, 22)),
    (3, "Priya", "Natarajan", "Systems engineer and essayist.", (1982, 11, 8)),
    (4, "Jonas", "Berg", "Novelist set on the Baltic coast.", (1990, 4, 12)),
    (5, "Margaret", "Okafor", "Science journalist covering astronomy.", (1975, 9, 30)),
];

/// (id, title, publication year, copies, publisher id)
pub(crate) const BOOKS: &[(i32, &str, i32, i32, i32)] = &[
    (1, "The Quiet Circuit", 2022, 15, 1),
    (2, "Echoes of Empire", 2021, 12, 2),
    (3, "Patterns in the Noise", 2023, 8, 3),
    (4, "Harbor Lights", 2020, 20, 1),
    (5, "The Measured Sky", 2022, 10, 2),
    (6, "Signals and Silence", 2021, 18, 3),
];

/// (book id, author ids, category ids)
const BOOK_LINKS: &[(i32, &[i32], &[i32])] = &[
    (1, &[1, 3], &[4, 2]),
    (2, &[2], &[3]),
    (3, &[1, 3], &[4, 2]),
    (4, &[4], &[1]),
    (5, &[5, 2], &[2, 3]),
    (6, &[3, 4], &[4, 2]),
];

pub(crate) fn publishers() -> impl Iterator<Item = Publisher> {
    PUBLISHERS.iter().map(|(id, name)| Publisher {
        id: *id,
        name: name.to_string(),
    })
}

pub(crate) fn categories() -> impl Iterator<Item = Category> {
    CATEGORIES.iter().map(|(id, name)| Category {
        id: *id,
        name: name.to_string(),
    })
}

pub(crate) fn authors() -> impl Iterator<Item = Author> {
    AUTHORS
        .iter()
        .filter_map(|(id, first, last, bio, (y, m, d))| {
            Some(Author {
                id: *id,
                first_name: first.to_string(),
                last_name: last.to_string(),
                biography: bio.to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(*y, *m, *d)?,
            })
        })
}

/// Link the seed books to their authors and categories.
///
/// Returns `false` when links already existed and nothing was written. Seed
/// books or referenced rows that have since been deleted are skipped.
pub async fn seed(store: &dyn Store) -> AppResult<bool> {
    let mut uow = store.begin().await?;

    if uow.books().has_links().await? {
        tracing::debug!("Book links already present, skipping seed");
        return Ok(false);
    }

    for (book_id, author_ids, category_ids) in BOOK_LINKS {
        let Some(mut book) = uow.books().get_by_id(*book_id).await? else {
            tracing::warn!("Seed book {} no longer exists, skipping its links", book_id);
            continue;
        };
        book.authors = uow.authors().get_many(author_ids).await?;
        book.categories = uow.categories().get_many(category_ids).await?;
        uow.books().update(book).await?;
    }

    let affected = uow.save_changes().await?;
    tracing::info!(affected, "Seeded book links");
    Ok(true)
}
