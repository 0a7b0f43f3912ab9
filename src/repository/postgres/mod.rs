//! PostgreSQL store backed by an sqlx connection pool
//!
//! A [`PgUnitOfWork`] wraps one pool transaction. The per-entity repository
//! implementations live next to this module, one file per table, and all run
//! their statements on that transaction.

mod authors;
mod books;
mod categories;
mod publishers;

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, Pool, Postgres, Transaction};

use super::{BookRepository, Repository, ResetMode, Store, StoreStatus, UnitOfWork};
use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::{Author, Category, Publisher},
};

/// Migrations embedded at compile time from `./migrations`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    /// Create the connection pool described by the configuration
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    async fn applied_migrations(&self) -> AppResult<Vec<(i64, String)>> {
        let has_history: bool =
            sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        if !has_history {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT version, description FROM _sqlx_migrations WHERE success ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn migration_name(version: i64, description: &str) -> String {
    format!("{}_{}", version, description.replace(' ', "_"))
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx, affected: 0 }))
    }

    async fn migrate(&self) -> AppResult<()> {
        MIGRATOR.run(&self.pool).await.map_err(sqlx::Error::from)?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    async fn reset(&self, mode: ResetMode) -> AppResult<()> {
        tracing::warn!(?mode, "Dropping database objects");
        match mode {
            ResetMode::Tables => {
                sqlx::query(
                    r#"
                    DROP TABLE IF EXISTS
                        book_categories, book_authors, books, authors, categories, publishers,
                        _sqlx_migrations
                    CASCADE
                    "#,
                )
                .execute(&self.pool)
                .await?;
            }
            ResetMode::Schema => {
                sqlx::query("DROP SCHEMA IF EXISTS public CASCADE")
                    .execute(&self.pool)
                    .await?;
                sqlx::query("CREATE SCHEMA public")
                    .execute(&self.pool)
                    .await?;
            }
        }
        self.migrate().await
    }

    async fn status(&self) -> AppResult<StoreStatus> {
        if let Err(e) = sqlx::query("SELECT 1").execute(&self.pool).await {
            tracing::warn!("Database connectivity check failed: {}", e);
            return Ok(StoreStatus::default());
        }

        let applied = self.applied_migrations().await?;
        let applied_versions: HashSet<i64> = applied.iter().map(|(v, _)| *v).collect();
        let pending_migrations = MIGRATOR
            .iter()
            .filter(|m| !applied_versions.contains(&m.version))
            .map(|m| migration_name(m.version, &m.description))
            .collect();

        Ok(StoreStatus {
            can_connect: true,
            applied_migrations: applied
                .iter()
                .map(|(version, description)| migration_name(*version, description))
                .collect(),
            pending_migrations,
        })
    }
}

/// Unit of work over one pool transaction; dropping it rolls back
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
    affected: u64,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
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
        let PgUnitOfWork { tx, affected } = *self;
        tx.commit().await?;
        Ok(affected)
    }
}
