//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub biography: String,
    pub date_of_birth: NaiveDate,
}

/// Author as returned by the API, also nested inside books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub biography: String,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: NaiveDate,
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthor {
    #[validate(
        custom(function = "super::not_blank", message = "First name is required"),
        length(max = 100, message = "First name cannot exceed 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "super::not_blank", message = "Last name is required"),
        length(max = 100, message = "Last name cannot exceed 100 characters")
    )]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Biography cannot exceed 1000 characters"))]
    pub biography: String,
    #[validate(custom(function = "super::date_in_past"))]
    pub date_of_birth: NaiveDate,
}

/// Update author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthor {
    #[validate(range(min = 1, message = "Author ID must be greater than 0"))]
    pub id: i32,
    #[validate(
        custom(function = "super::not_blank", message = "First name is required"),
        length(max = 100, message = "First name cannot exceed 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "super::not_blank", message = "Last name is required"),
        length(max = 100, message = "Last name cannot exceed 100 characters")
    )]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Biography cannot exceed 1000 characters"))]
    pub biography: String,
    #[validate(custom(function = "super::date_in_past"))]
    pub date_of_birth: NaiveDate,
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            biography: author.biography,
            date_of_birth: author.date_of_birth,
        }
    }
}

impl From<CreateAuthor> for Author {
    fn from(data: CreateAuthor) -> Self {
        Self {
            id: 0,
            first_name: data.first_name,
            last_name: data.last_name,
            biography: data.biography,
            date_of_birth: data.date_of_birth,
        }
    }
}

impl Author {
    /// Overwrite every scalar field from an update request
    pub fn apply(&mut self, data: UpdateAuthor) {
        self.first_name = data.first_name;
        self.last_name = data.last_name;
        self.biography = data.biography;
        self.date_of_birth = data.date_of_birth;
    }
}
