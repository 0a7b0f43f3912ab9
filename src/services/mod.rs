//! Business logic services
//!
//! Each call opens its own unit of work from the shared [`Store`], so a
//! service method is one transaction.

pub mod admin;
pub mod authors;
pub mod books;
pub mod categories;
pub mod publishers;

use std::sync::Arc;

use crate::repository::Store;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub authors: authors::AuthorsService,
    pub categories: categories::CategoriesService,
    pub publishers: publishers::PublishersService,
    pub admin: admin::AdminService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            books: books::BooksService::new(store.clone()),
            authors: authors::AuthorsService::new(store.clone()),
            categories: categories::CategoriesService::new(store.clone()),
            publishers: publishers::PublishersService::new(store.clone()),
            admin: admin::AdminService::new(store),
        }
    }
}
