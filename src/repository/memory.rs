//! In-memory store.
//!
//! Holds every table in process memory behind an async mutex. A unit of work
//! keeps the lock for its whole lifetime and edits a private copy of the
//! tables, which replaces the shared state only on `save_changes`. It mirrors
//! the PostgreSQL schema's foreign keys: publishers are restricted, link rows
//! cascade. Used by the tests and by `database.url = "memory:"`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{seed, unique_sorted, BookRepository, Repository, ResetMode, Store, StoreStatus, UnitOfWork};
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, Category, Publisher},
};

/// Scalar columns of the books table
#[derive(Debug, Clone)]
struct BookRow {
    title: String,
    publication_year: i32,
    number_of_copies: i32,
    publisher_id: i32,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    publishers: BTreeMap<i32, Publisher>,
    categories: BTreeMap<i32, Category>,
    authors: BTreeMap<i32, Author>,
    books: BTreeMap<i32, BookRow>,
    /// (book_id, author_id)
    book_authors: BTreeSet<(i32, i32)>,
    /// (book_id, category_id)
    book_categories: BTreeSet<(i32, i32)>,
    last_publisher_id: i32,
    last_category_id: i32,
    last_author_id: i32,
    last_book_id: i32,
}

impl Tables {
    /// Tables holding the base seed rows, as after running the migrations
    fn seeded() -> Self {
        let mut tables = Self::default();
        for publisher in seed::publishers() {
            tables.last_publisher_id = tables.last_publisher_id.max(publisher.id);
            tables.publishers.insert(publisher.id, publisher);
        }
        for category in seed::categories() {
            tables.last_category_id = tables.last_category_id.max(category.id);
            tables.categories.insert(category.id, category);
        }
        for author in seed::authors() {
            tables.last_author_id = tables.last_author_id.max(author.id);
            tables.authors.insert(author.id, author);
        }
        for (id, title, publication_year, number_of_copies, publisher_id) in seed::BOOKS {
            tables.last_book_id = tables.last_book_id.max(*id);
            tables.books.insert(
                *id,
                BookRow {
                    title: title.to_string(),
                    publication_year: *publication_year,
                    number_of_copies: *number_of_copies,
                    publisher_id: *publisher_id,
                },
            );
        }
        tables
    }

    fn load_book(&self, id: i32, row: &BookRow) -> Book {
        let authors = self
            .book_authors
            .range((id, i32::MIN)..=(id, i32::MAX))
            .filter_map(|(_, author_id)| self.authors.get(author_id).cloned())
            .collect();
        let categories = self
            .book_categories
            .range((id, i32::MIN)..=(id, i32::MAX))
            .filter_map(|(_, category_id)| self.categories.get(category_id).cloned())
            .collect();

        Book {
            id,
            title: row.title.clone(),
            publication_year: row.publication_year,
            number_of_copies: row.number_of_copies,
            publisher_id: row.publisher_id,
            publisher: self.publishers.get(&row.publisher_id).cloned(),
            authors,
            categories,
        }
    }

    fn load_books_where(&self, keep: impl Fn(i32, &BookRow) -> bool) -> Vec<Book> {
        self.books
            .iter()
            .filter(|(id, row)| keep(**id, row))
            .map(|(id, row)| self.load_book(*id, row))
            .collect()
    }

    /// Write a book's scalar row and replace its links, enforcing foreign keys
    fn store_book(&mut self, book: &Book) -> AppResult<()> {
        if !self.publishers.contains_key(&book.publisher_id) {
            return Err(foreign_key_violation("books", "publisher", book.publisher_id));
        }
        let author_ids = unique_sorted(&book.author_ids());
        let category_ids = unique_sorted(&book.category_ids());
        if let Some(missing) = author_ids.iter().find(|id| !self.authors.contains_key(id)) {
            return Err(foreign_key_violation("book_authors", "author", *missing));
        }
        if let Some(missing) = category_ids.iter().find(|id| !self.categories.contains_key(id)) {
            return Err(foreign_key_violation("book_categories", "category", *missing));
        }

        self.books.insert(
            book.id,
            BookRow {
                title: book.title.clone(),
                publication_year: book.publication_year,
                number_of_copies: book.number_of_copies,
                publisher_id: book.publisher_id,
            },
        );
        self.book_authors.retain(|(book_id, _)| *book_id != book.id);
        self.book_categories.retain(|(book_id, _)| *book_id != book.id);
        self.book_authors.extend(author_ids.into_iter().map(|a| (book.id, a)));
        self.book_categories.extend(category_ids.into_iter().map(|c| (book.id, c)));
        Ok(())
    }
}

fn foreign_key_violation(table: &str, referenced: &str, id: i32) -> AppError {
    AppError::Internal(format!(
        "insert or update on table {} violates foreign key constraint: {} {} does not exist",
        table, referenced, id
    ))
}

fn pick<E: Clone>(table: &BTreeMap<i32, E>, ids: &[i32]) -> Vec<E> {
    unique_sorted(ids)
        .into_iter()
        .filter_map(|id| table.get(&id).cloned())
        .collect()
}

/// Store keeping every table in process memory
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create a store preloaded with the base seed rows (no book links yet)
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::seeded())),
        }
    }

    /// Create a store with no rows at all
    pub fn empty() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            affected: 0,
        }))
    }

    async fn migrate(&self) -> AppResult<()> {
        Ok(())
    }

    async fn reset(&self, mode: ResetMode) -> AppResult<()> {
        tracing::warn!(?mode, "Resetting in-memory store");
        *self.tables.lock().await = Tables::seeded();
        Ok(())
    }

    async fn status(&self) -> AppResult<StoreStatus> {
        Ok(StoreStatus {
            can_connect: true,
            ..StoreStatus::default()
        })
    }
}

/// Unit of work over a private copy of the tables
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    affected: u64,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn books(&mut self) -> &mut dyn BookRepository {
        self
    }

    fn authors(&mut self) -> &mut dyn Repository<Author> {
        self
    }

    fn categories(&mut self) -> &mut dyn Repository<Category> {
        self
    }

    fn publishers(&mut self) -> &mut dyn Repository<Publisher> {
        self
    }

    async fn save_changes(self: Box<Self>) -> AppResult<u64> {
        let MemoryUnitOfWork {
            mut guard,
            working,
            affected,
        } = *self;
        *guard = working;
        Ok(affected)
    }
}

#[async_trait]
impl Repository<Book> for MemoryUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Book>> {
        Ok(self.working.load_books_where(|_, _| true))
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Book>> {
        Ok(self
            .working
            .books
            .get(&id)
            .map(|row| self.working.load_book(id, row)))
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Book>> {
        let ids: BTreeSet<i32> = ids.iter().copied().collect();
        Ok(self.working.load_books_where(|id, _| ids.contains(&id)))
    }

    async fn add(&mut self, mut book: Book) -> AppResult<Book> {
        book.id = self.working.last_book_id + 1;
        self.working.store_book(&book)?;
        self.working.last_book_id = book.id;
        self.affected += 1 + (book.authors.len() + book.categories.len()) as u64;
        book.publisher = self.working.publishers.get(&book.publisher_id).cloned();
        Ok(book)
    }

    async fn update(&mut self, mut book: Book) -> AppResult<Book> {
        if !self.working.books.contains_key(&book.id) {
            return Err(AppError::NotFound(format!("Book {} not found", book.id)));
        }
        self.working.store_book(&book)?;
        self.affected += 1 + (book.authors.len() + book.categories.len()) as u64;
        book.publisher = self.working.publishers.get(&book.publisher_id).cloned();
        Ok(book)
    }

    async fn delete(&mut self, id: i32) -> AppResult<()> {
        if self.working.books.remove(&id).is_some() {
            self.working.book_authors.retain(|(book_id, _)| *book_id != id);
            self.working.book_categories.retain(|(book_id, _)| *book_id != id);
            self.affected += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MemoryUnitOfWork {
    async fn get_by_author(&mut self, author_id: i32) -> AppResult<Vec<Book>> {
        let links = &self.working.book_authors;
        Ok(self
            .working
            .load_books_where(|id, _| links.contains(&(id, author_id))))
    }

    async fn get_by_category(&mut self, category_id: i32) -> AppResult<Vec<Book>> {
        let links = &self.working.book_categories;
        Ok(self
            .working
            .load_books_where(|id, _| links.contains(&(id, category_id))))
    }

    async fn get_by_publisher(&mut self, publisher_id: i32) -> AppResult<Vec<Book>> {
        Ok(self
            .working
            .load_books_where(|_, row| row.publisher_id == publisher_id))
    }

    async fn has_links(&mut self) -> AppResult<bool> {
        Ok(!self.working.book_authors.is_empty() || !self.working.book_categories.is_empty())
    }
}

#[async_trait]
impl Repository<Author> for MemoryUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Author>> {
        Ok(self.working.authors.values().cloned().collect())
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Author>> {
        Ok(self.working.authors.get(&id).cloned())
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Author>> {
        Ok(pick(&self.working.authors, ids))
    }

    async fn add(&mut self, mut author: Author) -> AppResult<Author> {
        self.working.last_author_id += 1;
        author.id = self.working.last_author_id;
        self.working.authors.insert(author.id, author.clone());
        self.affected += 1;
        Ok(author)
    }

    async fn update(&mut self, author: Author) -> AppResult<Author> {
        match self.working.authors.get_mut(&author.id) {
            Some(row) => *row = author.clone(),
            None => return Err(AppError::NotFound(format!("Author {} not found", author.id))),
        }
        self.affected += 1;
        Ok(author)
    }

    async fn delete(&mut self, id: i32) -> AppResult<()> {
        if self.working.authors.remove(&id).is_some() {
            self.working.book_authors.retain(|(_, author_id)| *author_id != id);
            self.affected += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<Category> for MemoryUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Category>> {
        Ok(self.working.categories.values().cloned().collect())
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Category>> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Category>> {
        Ok(pick(&self.working.categories, ids))
    }

    async fn add(&mut self, mut category: Category) -> AppResult<Category> {
        self.working.last_category_id += 1;
        category.id = self.working.last_category_id;
        self.working.categories.insert(category.id, category.clone());
        self.affected += 1;
        Ok(category)
    }

    async fn update(&mut self, category: Category) -> AppResult<Category> {
        match self.working.categories.get_mut(&category.id) {
            Some(row) => *row = category.clone(),
            None => return Err(AppError::NotFound(format!("Category {} not found", category.id))),
        }
        self.affected += 1;
        Ok(category)
    }

    async fn delete(&mut self, id: i32) -> AppResult<()> {
        if self.working.categories.remove(&id).is_some() {
            self.working.book_categories.retain(|(_, category_id)| *category_id != id);
            self.affected += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<Publisher> for MemoryUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Publisher>> {
        Ok(self.working.publishers.values().cloned().collect())
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Publisher>> {
        Ok(self.working.publishers.get(&id).cloned())
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Publisher>> {
        Ok(pick(&self.working.publishers, ids))
    }

    async fn add(&mut self, mut publisher: Publisher) -> AppResult<Publisher> {
        self.working.last_publisher_id += 1;
        publisher.id = self.working.last_publisher_id;
        self.working.publishers.insert(publisher.id, publisher.clone());
        self.affected += 1;
        Ok(publisher)
    }

    async fn update(&mut self, publisher: Publisher) -> AppResult<Publisher> {
        match self.working.publishers.get_mut(&publisher.id) {
            Some(row) => *row = publisher.clone(),
            None => return Err(AppError::NotFound(format!("Publisher {} not found", publisher.id))),
        }
        self.affected += 1;
        Ok(publisher)
    }

    async fn delete(&mut self, id: i32) -> AppResult<()> {
        if !self.working.publishers.contains_key(&id) {
            return Ok(());
        }
        if self.working.books.values().any(|book| book.publisher_id == id) {
            return Err(AppError::Internal(format!(
                "delete on table publishers violates foreign key constraint: publisher {} is still referenced from books",
                id
            )));
        }
        self.working.publishers.remove(&id);
        self.affected += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn author(first: &str) -> Author {
        Author {
            id: 0,
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            biography: String::new(),
            date_of_birth: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_generated_ids_are_unique() {
        let store = MemoryStore::empty();
        let mut uow = store.begin().await.unwrap();
        let first = uow.authors().add(author("A")).await.unwrap();
        let second = uow.authors().add(author("B")).await.unwrap();
        assert_eq!(uow.save_changes().await.unwrap(), 2);

        assert!(first.id > 0);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let store = MemoryStore::empty();
        {
            let mut uow = store.begin().await.unwrap();
            uow.publishers()
                .add(Publisher { id: 0, name: "Acme".into() })
                .await
                .unwrap();
        }

        let mut uow = store.begin().await.unwrap();
        assert!(uow.publishers().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown_and_duplicates() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let authors = uow.authors().get_many(&[3, 1, 99, 3]).await.unwrap();
        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_publisher_delete_is_restricted() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        assert!(uow.publishers().delete(1).await.is_err());
        assert!(uow.publishers().get_by_id(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_book_requires_existing_publisher() {
        let store = MemoryStore::empty();
        let mut uow = store.begin().await.unwrap();
        let book = Book {
            id: 0,
            title: "Orphan".into(),
            publication_year: 2000,
            number_of_copies: 1,
            publisher_id: 42,
            publisher: None,
            authors: vec![],
            categories: vec![],
        };
        assert!(uow.books().add(book).await.is_err());
    }

    #[tokio::test]
    async fn test_author_delete_cascades_links() {
        let store = MemoryStore::new();
        seed::seed(&store).await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.authors().delete(3).await.unwrap();
        uow.save_changes().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let book = uow.books().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(book.author_ids(), vec![1]);
        assert!(uow.books().get_by_author(3).await.unwrap().is_empty());
    }
}
