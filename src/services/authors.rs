//! Authors service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{CreateAuthor, UpdateAuthor},
        validate_id, Author, AuthorDto,
    },
    repository::Store,
};

#[derive(Clone)]
pub struct AuthorsService {
    store: Arc<dyn Store>,
}

impl AuthorsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// List all authors, ordered by id
    pub async fn list(&self) -> AppResult<Vec<AuthorDto>> {
        let mut uow = self.store.begin().await?;
        let authors = uow.authors().get_all().await?;
        Ok(authors.into_iter().map(AuthorDto::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<AuthorDto>> {
        let mut uow = self.store.begin().await?;
        Ok(uow.authors().get_by_id(id).await?.map(AuthorDto::from))
    }

    pub async fn create(&self, data: CreateAuthor) -> AppResult<AuthorDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let author = uow.authors().add(Author::from(data)).await?;
        uow.save_changes().await?;

        tracing::debug!(author_id = author.id, "Author created");
        Ok(author.into())
    }

    /// Overwrite every field of an existing author
    pub async fn update(&self, data: UpdateAuthor) -> AppResult<AuthorDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let mut author = uow
            .authors()
            .get_by_id(data.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with ID {} not found", data.id)))?;
        author.apply(data);
        let author = uow.authors().update(author).await?;
        uow.save_changes().await?;

        Ok(author.into())
    }

    /// Returns `false` when there was nothing to delete. Books keep existing
    /// and simply lose this author.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        validate_id(id, "Author")?;

        let mut uow = self.store.begin().await?;
        if uow.authors().get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        uow.authors().delete(id).await?;
        uow.save_changes().await?;

        Ok(true)
    }
}
