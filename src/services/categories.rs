//! Categories service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        category::{CreateCategory, UpdateCategory},
        validate_id, Category, CategoryDto,
    },
    repository::Store,
};

#[derive(Clone)]
pub struct CategoriesService {
    store: Arc<dyn Store>,
}

impl CategoriesService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<CategoryDto>> {
        let mut uow = self.store.begin().await?;
        let categories = uow.categories().get_all().await?;
        Ok(categories.into_iter().map(CategoryDto::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<CategoryDto>> {
        let mut uow = self.store.begin().await?;
        Ok(uow.categories().get_by_id(id).await?.map(CategoryDto::from))
    }

    pub async fn create(&self, data: CreateCategory) -> AppResult<CategoryDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let category = uow.categories().add(Category::from(data)).await?;
        uow.save_changes().await?;

        tracing::debug!(category_id = category.id, "Category created");
        Ok(category.into())
    }

    pub async fn update(&self, data: UpdateCategory) -> AppResult<CategoryDto> {
        data.validate()?;

        let mut uow = self.store.begin().await?;
        let mut category = uow
            .categories()
            .get_by_id(data.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with ID {} not found", data.id)))?;
        category.apply(data);
        let category = uow.categories().update(category).await?;
        uow.save_changes().await?;

        Ok(category.into())
    }

    /// Books lose the category; they are not deleted
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        validate_id(id, "Category")?;

        let mut uow = self.store.begin().await?;
        if uow.categories().get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        uow.categories().delete(id).await?;
        uow.save_changes().await?;

        Ok(true)
    }
}
