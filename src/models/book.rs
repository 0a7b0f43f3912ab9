//! Book model: the aggregate root owning its author and category links

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{Author, AuthorDto, Category, CategoryDto, Publisher};

/// Book with its publisher and associations loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub publication_year: i32,
    pub number_of_copies: i32,
    pub publisher_id: i32,
    /// Loaded alongside the book; `None` when the row could not be joined
    pub publisher: Option<Publisher>,
    pub authors: Vec<Author>,
    pub categories: Vec<Category>,
}

/// Book as returned by the API, with the publisher flattened to its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i32,
    pub title: String,
    pub publication_year: i32,
    pub number_of_copies: i32,
    pub publisher_id: i32,
    pub publisher_name: String,
    pub authors: Vec<AuthorDto>,
    pub categories: Vec<CategoryDto>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(
        custom(function = "super::not_blank", message = "Title is required"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: String,
    #[validate(custom(function = "super::publication_year_in_range"))]
    pub publication_year: i32,
    #[validate(range(min = 0, message = "Number of copies must be non-negative"))]
    pub number_of_copies: i32,
    #[validate(range(min = 1, message = "Publisher ID must be greater than 0"))]
    pub publisher_id: i32,
    /// Unknown ids are skipped
    #[serde(default)]
    #[validate(custom(function = "super::all_positive"))]
    pub author_ids: Vec<i32>,
    /// Unknown ids are skipped
    #[serde(default)]
    #[validate(custom(function = "super::all_positive"))]
    pub category_ids: Vec<i32>,
}

/// Update book request; replaces every field and both association sets
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(range(min = 1, message = "Book ID must be greater than 0"))]
    pub id: i32,
    #[validate(
        custom(function = "super::not_blank", message = "Title is required"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: String,
    #[validate(custom(function = "super::publication_year_in_range"))]
    pub publication_year: i32,
    #[validate(range(min = 0, message = "Number of copies must be non-negative"))]
    pub number_of_copies: i32,
    #[validate(range(min = 1, message = "Publisher ID must be greater than 0"))]
    pub publisher_id: i32,
    #[serde(default)]
    #[validate(custom(function = "super::all_positive"))]
    pub author_ids: Vec<i32>,
    #[serde(default)]
    #[validate(custom(function = "super::all_positive"))]
    pub category_ids: Vec<i32>,
}

impl Book {
    /// Build an unsaved book from a create request and its resolved associations
    pub fn new(data: CreateBook, authors: Vec<Author>, categories: Vec<Category>) -> Self {
        Self {
            id: 0,
            title: data.title,
            publication_year: data.publication_year,
            number_of_copies: data.number_of_copies,
            publisher_id: data.publisher_id,
            publisher: None,
            authors,
            categories,
        }
    }

    /// Overwrite scalar fields and replace both association sets
    pub fn apply(&mut self, data: UpdateBook, authors: Vec<Author>, categories: Vec<Category>) {
        if self.publisher_id != data.publisher_id {
            self.publisher = None;
        }
        self.title = data.title;
        self.publication_year = data.publication_year;
        self.number_of_copies = data.number_of_copies;
        self.publisher_id = data.publisher_id;
        self.authors = authors;
        self.categories = categories;
    }

    pub fn author_ids(&self) -> Vec<i32> {
        self.authors.iter().map(|a| a.id).collect()
    }

    pub fn category_ids(&self) -> Vec<i32> {
        self.categories.iter().map(|c| c.id).collect()
    }
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            publication_year: book.publication_year,
            number_of_copies: book.number_of_copies,
            publisher_id: book.publisher_id,
            publisher_name: book.publisher.map(|p| p.name).unwrap_or_default(),
            authors: book.authors.into_iter().map(AuthorDto::from).collect(),
            categories: book.categories.into_iter().map(CategoryDto::from).collect(),
        }
    }
}
