//! Authors table

use async_trait::async_trait;

use super::PgUnitOfWork;
use crate::{
    error::{AppError, AppResult},
    models::Author,
    repository::{unique_sorted, Repository},
};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, biography, date_of_birth";

#[async_trait]
impl Repository<Author> for PgUnitOfWork {
    async fn get_all(&mut self) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors ORDER BY id",
            AUTHOR_COLUMNS
        ))
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&mut self, id: i32) -> AppResult<Option<Author>> {
        let row = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = $1",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn get_many(&mut self, ids: &[i32]) -> AppResult<Vec<Author>> {
        let ids = unique_sorted(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = ANY($1) ORDER BY id",
            AUTHOR_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows)
    }

    async fn add(&mut self, author: Author) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(&format!(
            r#"
            INSERT INTO authors (first_name, last_name, biography, date_of_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(&author.biography)
        .bind(author.date_of_birth)
        .fetch_one(&mut *self.tx)
        .await?;
        self.affected += 1;
        Ok(row)
    }

    async fn update(&mut self, author: Author) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(&format!(
            r#"
            UPDATE authors
            SET first_name = $1, last_name = $2, biography = $3, date_of_birth = $4
            WHERE id = $5
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        ))
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(&author.biography)
        .bind(author.date_of_birth)
        .bind(author.id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", author.id)))?;
        self.affected += 1;
        Ok(row)
    }

    /// Link rows go with the author (ON DELETE CASCADE); books stay
    async fn delete(&mut self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        self.affected += result.rows_affected();
        Ok(())
    }
}
