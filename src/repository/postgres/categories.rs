//! Categories table

use async_trait::async_trait;

use super::PgUnitOfWork;
use crate::{
    error::{AppError, AppResult},
    models::Category,
    repository::{unique_sorted, Repository},
};

#[async_trait]
impl Repository<Category> for PgUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Category>> {
        let ids = unique_sorted(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn add(&mut self, category: Category) -> AppResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&category.name)
        .fetch_one(&mut *self.tx)
        .await?;
        self.affected += 1;
        Ok(row)
    }

    async fn update(&mut self, category: Category) -> AppResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(&category.name)
        .bind(category.id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category.id)))?;
        self.affected += 1;
        Ok(row)
    }

    /// Link rows go with the category (ON DELETE CASCADE); books stay
    async fn delete(&mut self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        self.affected += result.rows_affected();
        Ok(())
    }
}
