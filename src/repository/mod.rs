//! Repository layer for database operations
//!
//! Every request opens one [`UnitOfWork`] from the configured [`Store`]. The
//! four repositories it hands out all stage their writes on the same
//! transaction, and nothing becomes durable until [`UnitOfWork::save_changes`].
//! Dropping a unit of work without saving rolls everything back.

pub mod memory;
pub mod postgres;
pub mod seed;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::{Author, Book, Category, Publisher},
};

/// CRUD gateway shared by every entity type
#[async_trait]
pub trait Repository<E: Send + 'static>: Send {
    /// Every row, ordered by id
    async fn get_all(&mut self) -> AppResult<Vec<E>>;

    /// Point lookup; `None` is not an error
    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<E>>;

    /// Batch lookup ordered by id; unknown ids are skipped and duplicates collapse
    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<E>>;

    /// Stage a new row; the returned entity carries the generated id
    async fn add(&mut self, entity: E) -> AppResult<E>;

    /// Stage a full overwrite of an existing row
    async fn update(&mut self, entity: E) -> AppResult<E>;

    /// Stage a removal; absent ids are a no-op
    async fn delete(&mut self, id: i32) -> AppResult<()>;
}

/// Book-specific lookups on top of the generic gateway
#[async_trait]
pub trait BookRepository: Repository<Book> {
    async fn get_by_author(&mut self, author_id: i32) -> AppResult<Vec<Book>>;

    async fn get_by_category(&mut self, category_id: i32) -> AppResult<Vec<Book>>;

    async fn get_by_publisher(&mut self, publisher_id: i32) -> AppResult<Vec<Book>>;

    /// Whether any book-author or book-category link exists
    async fn has_links(&mut self) -> AppResult<bool>;
}

/// Request-scoped transaction aggregating the four repositories
#[async_trait]
pub trait UnitOfWork: Send {
    fn books(&mut self) -> &mut dyn BookRepository;

    fn authors(&mut self) -> &mut dyn Repository<Author>;

    fn categories(&mut self) -> &mut dyn Repository<Category>;

    fn publishers(&mut self) -> &mut dyn Repository<Publisher>;

    /// Commit everything staged so far; returns the number of affected rows
    async fn save_changes(self: Box<Self>) -> AppResult<u64>;
}

/// How much of the database a reset throws away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Drop the application tables and the migration history
    Tables,
    /// Drop and recreate the whole schema
    Schema,
}

/// Connectivity and migration state reported by the status probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub can_connect: bool,
    pub applied_migrations: Vec<String>,
    pub pending_migrations: Vec<String>,
}

/// Backend able to open units of work and run maintenance
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Bring the schema up to date
    async fn migrate(&self) -> AppResult<()>;

    /// Drop the schema (see [`ResetMode`]) and run the migrations again
    async fn reset(&self, mode: ResetMode) -> AppResult<()>;

    async fn status(&self) -> AppResult<StoreStatus>;
}

/// Open the store selected by the database url
pub async fn connect(config: &DatabaseConfig) -> AppResult<Arc<dyn Store>> {
    if config.uses_memory_store() {
        tracing::warn!("Using the in-memory store; data is lost on shutdown");
        return Ok(Arc::new(memory::MemoryStore::new()));
    }

    let store = postgres::PgStore::connect(config).await?;
    tracing::info!("Connected to database");
    Ok(Arc::new(store))
}

/// Deduplicate ids while keeping them sorted, matching `ORDER BY id`
pub(crate) fn unique_sorted(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
