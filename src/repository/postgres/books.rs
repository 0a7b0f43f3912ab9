//! Books table and its two association tables

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::FromRow;

use super::PgUnitOfWork;
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, Category, Publisher},
    repository::{unique_sorted, BookRepository, Repository},
};

macro_rules! select_books {
    ($filter:literal) => {
        concat!(
            "SELECT b.id, b.title, b.publication_year, b.number_of_copies, b.publisher_id, ",
            "p.name AS publisher_name ",
            "FROM books b LEFT JOIN publishers p ON p.id = b.publisher_id ",
            $filter,
            " ORDER BY b.id"
        )
    };
}

#[derive(Debug, FromRow)]
struct BookRow {
    id: i32,
    title: String,
    publication_year: i32,
    number_of_copies: i32,
    publisher_id: i32,
    publisher_name: Option<String>,
}

impl BookRow {
    fn into_book(self, authors: Vec<Author>, categories: Vec<Category>) -> Book {
        Book {
            id: self.id,
            title: self.title,
            publication_year: self.publication_year,
            number_of_copies: self.number_of_copies,
            publisher_id: self.publisher_id,
            publisher: self.publisher_name.map(|name| Publisher {
                id: self.publisher_id,
                name,
            }),
            authors,
            categories,
        }
    }
}

#[derive(FromRow)]
struct AuthorLink {
    book_id: i32,
    #[sqlx(flatten)]
    author: Author,
}

#[derive(FromRow)]
struct CategoryLink {
    book_id: i32,
    #[sqlx(flatten)]
    category: Category,
}

impl PgUnitOfWork {
    /// Attach authors and categories to a page of book rows with two queries
    async fn load_associations(&mut self, rows: Vec<BookRow>) -> AppResult<Vec<Book>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let book_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let author_links = sqlx::query_as::<_, AuthorLink>(
            r#"
            SELECT ba.book_id, a.id, a.first_name, a.last_name, a.biography, a.date_of_birth
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = ANY($1)
            ORDER BY a.id
            "#,
        )
        .bind(&book_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        let category_links = sqlx::query_as::<_, CategoryLink>(
            r#"
            SELECT bc.book_id, c.id, c.name
            FROM book_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.book_id = ANY($1)
            ORDER BY c.id
            "#,
        )
        .bind(&book_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        let mut authors: HashMap<i32, Vec<Author>> = HashMap::new();
        for link in author_links {
            authors.entry(link.book_id).or_default().push(link.author);
        }
        let mut categories: HashMap<i32, Vec<Category>> = HashMap::new();
        for link in category_links {
            categories.entry(link.book_id).or_default().push(link.category);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_book(
                    authors.remove(&id).unwrap_or_default(),
                    categories.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }

    /// Replace both link sets of a book
    async fn write_links(&mut self, book_id: i32, author_ids: &[i32], category_ids: &[i32]) -> AppResult<()> {
        let removed_authors = sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *self.tx)
            .await?;
        let removed_categories = sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *self.tx)
            .await?;
        self.affected += removed_authors.rows_affected() + removed_categories.rows_affected();

        let author_ids = unique_sorted(author_ids);
        if !author_ids.is_empty() {
            let result = sqlx::query(
                "INSERT INTO book_authors (book_id, author_id) SELECT $1, UNNEST($2::int4[])",
            )
            .bind(book_id)
            .bind(&author_ids)
            .execute(&mut *self.tx)
            .await?;
            self.affected += result.rows_affected();
        }

        let category_ids = unique_sorted(category_ids);
        if !category_ids.is_empty() {
            let result = sqlx::query(
                "INSERT INTO book_categories (book_id, category_id) SELECT $1, UNNEST($2::int4[])",
            )
            .bind(book_id)
            .bind(&category_ids)
            .execute(&mut *self.tx)
            .await?;
            self.affected += result.rows_affected();
        }

        Ok(())
    }

    async fn fetch_publisher(&mut self, id: i32) -> AppResult<Option<Publisher>> {
        let row = sqlx::query_as::<_, Publisher>("SELECT id, name FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl Repository<Book> for PgUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(select_books!(""))
            .fetch_all(&mut *self.tx)
            .await?;
        self.load_associations(rows).await
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(select_books!("WHERE b.id = $1"))
            .bind(id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(self.load_associations(rows).await?.into_iter().next())
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Book>> {
        let ids = unique_sorted(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, BookRow>(select_books!("WHERE b.id = ANY($1)"))
            .bind(&ids)
            .fetch_all(&mut *self.tx)
            .await?;
        self.load_associations(rows).await
    }

    async fn add(&mut self, mut book: Book) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, publication_year, number_of_copies, publisher_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(book.publication_year)
        .bind(book.number_of_copies)
        .bind(book.publisher_id)
        .fetch_one(&mut *self.tx)
        .await?;
        self.affected += 1;

        book.id = id;
        self.write_links(id, &book.author_ids(), &book.category_ids()).await?;
        book.publisher = self.fetch_publisher(book.publisher_id).await?;
        Ok(book)
    }

    async fn update(&mut self, mut book: Book) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, publication_year = $2, number_of_copies = $3, publisher_id = $4
            WHERE id = $5
            "#,
        )
        .bind(&book.title)
        .bind(book.publication_year)
        .bind(book.number_of_copies)
        .bind(book.publisher_id)
        .bind(book.id)
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", book.id)));
        }
        self.affected += result.rows_affected();

        self.write_links(book.id, &book.author_ids(), &book.category_ids()).await?;
        book.publisher = self.fetch_publisher(book.publisher_id).await?;
        Ok(book)
    }

    async fn delete(&mut self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        self.affected += result.rows_affected();
        Ok(())
    }
}

#[async_trait]
impl BookRepository for PgUnitOfWork {
    async fn get_by_author(&mut self, author_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(select_books!(
            "WHERE b.id IN (SELECT book_id FROM book_authors WHERE author_id = $1)"
        ))
        .bind(author_id)
        .fetch_all(&mut *self.tx)
        .await?;
        self.load_associations(rows).await
    }

    async fn get_by_category(&mut self, category_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(select_books!(
            "WHERE b.id IN (SELECT book_id FROM book_categories WHERE category_id = $1)"
        ))
        .bind(category_id)
        .fetch_all(&mut *self.tx)
        .await?;
        self.load_associations(rows).await
    }

    async fn get_by_publisher(&mut self, publisher_id: i32) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(select_books!("WHERE b.publisher_id = $1"))
            .bind(publisher_id)
            .fetch_all(&mut *self.tx)
            .await?;
        self.load_associations(rows).await
    }

    async fn has_links(&mut self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM book_authors)
                OR EXISTS (SELECT 1 FROM book_categories)
            "#,
        )
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }
}
