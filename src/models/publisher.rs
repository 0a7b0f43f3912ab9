//! Publisher model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Publisher record
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
}

/// Publisher as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublisherDto {
    pub id: i32,
    pub name: String,
}

/// Create publisher request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublisher {
    #[validate(
        custom(function = "super::not_blank", message = "Name is required"),
        length(max = 200, message = "Name cannot exceed 200 characters")
    )]
    pub name: String,
}

/// Update publisher request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePublisher {
    #[validate(range(min = 1, message = "Publisher ID must be greater than 0"))]
    pub id: i32,
    #[validate(
        custom(function = "super::not_blank", message = "Name is required"),
        length(max = 200, message = "Name cannot exceed 200 characters")
    )]
    pub name: String,
}

impl From<Publisher> for PublisherDto {
    fn from(publisher: Publisher) -> Self {
        Self {
            id: publisher.id,
            name: publisher.name,
        }
    }
}

impl From<CreatePublisher> for Publisher {
    fn from(data: CreatePublisher) -> Self {
        Self { id: 0, name: data.name }
    }
}

impl Publisher {
    /// Overwrite every scalar field from an update request
    pub fn apply(&mut self, data: UpdatePublisher) {
        self.name = data.name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_publisher_validation() {
        assert!(CreatePublisher { name: "Acme".into() }.validate().is_ok());
        assert!(CreatePublisher { name: "".into() }.validate().is_err());
        assert!(CreatePublisher { name: "x".repeat(200) }.validate().is_ok());
        assert!(CreatePublisher { name: "x".repeat(201) }.validate().is_err());
    }

    #[test]
    fn test_update_publisher_requires_positive_id() {
        let data = UpdatePublisher { id: 0, name: "Acme".into() };
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("id"));
    }
}
