//! Publishers table

use async_trait::async_trait;

use super::PgUnitOfWork;
use crate::{
    error::{AppError, AppResult},
    models::Publisher,
    repository::{unique_sorted, Repository},
};

#[async_trait]
impl Repository<Publisher> for PgUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Publisher>> {
        let rows = sqlx::query_as::<_, Publisher>("SELECT id, name FROM publishers ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Publisher>> {
        let row = sqlx::query_as::<_, Publisher>("SELECT id, name FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Publisher>> {
        let ids = unique_sorted(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Publisher>(
            "SELECT id, name FROM publishers WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn add(&mut self, publisher: Publisher) -> AppResult<Publisher> {
        let row = sqlx::query_as::<_, Publisher>(
            "INSERT INTO publishers (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&publisher.name)
        .fetch_one(&mut *self.tx)
        .await?;
        self.affected += 1;
        Ok(row)
    }

    async fn update(&mut self, publisher: Publisher) -> AppResult<Publisher> {
        let row = sqlx::query_as::<_, Publisher>(
            "UPDATE publishers SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&publisher.name)
        .bind(publisher.id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Publisher {} not found", publisher.id)))?;
        self.affected += 1;
        Ok(row)
    }

    async fn delete(&mut self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        self.affected += result.rows_affected();
        Ok(())
    }
}
