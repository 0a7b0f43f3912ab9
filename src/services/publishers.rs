//! Publishers service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        publisher::{CreatePublisher, UpdatePublisher},
        validate_id, Publisher, PublisherDto,
    },
    repository::Store,
};

#[derive(Clone)]
pub struct PublishersService {
    store: Arc<dyn Store>,
}

impl PublishersService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<PublisherDto>> {
        let mut uow = self.store.begin().await?;
        let publishers = uow.publishers().get_all().await?;
        Ok(publishers.into_iter().map(PublisherDto::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<PublisherDto>> {
        let mut uow = self.store.begin().await?;
        Ok(uow.publishers().get_by_id(id).await?.map(PublisherDto::from))
    }

    pub async fn create(&self, data: CreatePublisher) -> AppResult<PublisherDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let publisher = uow.publishers().add(Publisher::from(data)).await?;
        uow.save_changes().await?;

        tracing::debug!(publisher_id = publisher.id, "Publisher created");
        Ok(publisher.into())
    }

    pub async fn update(&self, data: UpdatePublisher) -> AppResult<PublisherDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let mut publisher = uow
            .publishers()
            .get_by_id(data.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publisher with ID {} not found", data.id)))?;
        publisher.apply(data);
        let publisher = uow.publishers().update(publisher).await?;
        uow.save_changes().await?;

        Ok(publisher.into())
    }

    /// Fails while a book still references the publisher
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        validate_id(id, "Publisher")?;

        let mut uow = self.store.begin().await?;
        if uow.publishers().get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        uow.publishers().delete(id).await?;
        uow.save_changes().await?;

        Ok(true)
    }
}
