//! Books service

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{CreateBook, UpdateBook},
        validate_id, Book, BookDto,
    },
    repository::Store,
};

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn Store>,
}

fn to_dtos(books: Vec<Book>) -> Vec<BookDto> {
    books.into_iter().map(BookDto::from).collect()
}

impl BooksService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// List all books with publisher, authors and categories
    pub async fn list(&self) -> AppResult<Vec<BookDto>> {
        let mut uow = self.store.begin().await?;
        Ok(to_dtos(uow.books().get_all().await?))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<BookDto>> {
        let mut uow = self.store.begin().await?;
        Ok(uow.books().get_by_id(id).await?.map(BookDto::from))
    }

    /// Create a book. Author and category ids that do not resolve are dropped.
    pub async fn create(&self, data: CreateBook) -> AppResult<BookDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let authors = uow.authors().get_many(&data.author_ids).await?;
        let categories = uow.categories().get_many(&data.category_ids).await?;
        let book = uow.books().add(Book::new(data, authors, categories)).await?;
        uow.save_changes().await?;

        tracing::info!(
            book_id = book.id,
            title = %book.title,
            occurred_on = %Utc::now(),
            "Book created"
        );
        Ok(book.into())
    }

    /// Overwrite a book and rebuild both association sets
    pub async fn update(&self, data: UpdateBook) -> AppResult<BookDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let mut book = uow
            .books()
            .get_by_id(data.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", data.id)))?;
        let authors = uow.authors().get_many(&data.author_ids).await?;
        let categories = uow.categories().get_many(&data.category_ids).await?;
        book.apply(data, authors, categories);
        let book = uow.books().update(book).await?;
        uow.save_changes().await?;

        Ok(book.into())
    }

    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        validate_id(id, "Book")?;

        let mut uow = self.store.begin().await?;
        if uow.books().get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        uow.books().delete(id).await?;
        uow.save_changes().await?;

        Ok(true)
    }

    /// Books written by an author
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookDto>> {
        let mut uow = self.store.begin().await?;
        if uow.authors().get_by_id(author_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Author with ID {} not found", author_id)));
        }
        Ok(to_dtos(uow.books().get_by_author(author_id).await?))
    }

    /// Books filed under a category
    pub async fn list_by_category(&self, category_id: i32) -> AppResult<Vec<BookDto>> {
        let mut uow = self.store.begin().await?;
        if uow.categories().get_by_id(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Category with ID {} not found", category_id)));
        }
        Ok(to_dtos(uow.books().get_by_category(category_id).await?))
    }

    /// Books issued by a publisher
    pub async fn list_by_publisher(&self, publisher_id: i32) -> AppResult<Vec<BookDto>> {
        let mut uow = self.store.begin().await?;
        if uow.publishers().get_by_id(publisher_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Publisher with ID {} not found", publisher_id)));
        }
        Ok(to_dtos(uow.books().get_by_publisher(publisher_id).await?))
    }
}
