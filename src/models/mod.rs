//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod category;
pub mod publisher;

use chrono::{Datelike, NaiveDate, Utc};
use validator::{ValidationError, ValidationErrors};

// Re-export commonly used types
pub use author::{Author, AuthorDto};
pub use book::{Book, BookDto};
pub use category::{Category, CategoryDto};
pub use publisher::{Publisher, PublisherDto};

fn error_with_message(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Rejects empty and whitespace-only strings
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Publication year must lie between year 1 and the current year
pub(crate) fn publication_year_in_range(year: i32) -> Result<(), ValidationError> {
    let current = Utc::now().year();
    if year < 1 {
        return Err(error_with_message(
            "range",
            "Publication year must be greater than 0".to_string(),
        ));
    }
    if year > current {
        return Err(error_with_message(
            "range",
            "Publication year cannot be in the future".to_string(),
        ));
    }
    Ok(())
}

/// Date strictly before today (UTC)
pub(crate) fn date_in_past(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date >= Utc::now().date_naive() {
        return Err(error_with_message(
            "past",
            "Date of birth cannot be in the future".to_string(),
        ));
    }
    Ok(())
}

/// Every referenced id must be a positive surrogate key
pub(crate) fn all_positive(ids: &[i32]) -> Result<(), ValidationError> {
    if ids.iter().any(|id| *id < 1) {
        return Err(error_with_message(
            "range",
            "Referenced IDs must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Id check shared by every delete (and by the path id of updates)
pub fn validate_id(id: i32, entity: &str) -> Result<(), ValidationErrors> {
    if id < 1 {
        let mut errors = ValidationErrors::new();
        errors.add(
            "id",
            error_with_message("range", format!("{} ID must be greater than 0", entity)),
        );
        return Err(errors);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Dune").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn test_publication_year_bounds() {
        let current = Utc::now().year();
        assert!(publication_year_in_range(current).is_ok());
        assert!(publication_year_in_range(1).is_ok());
        assert!(publication_year_in_range(0).is_err());
        assert!(publication_year_in_range(current + 1).is_err());
    }

    #[test]
    fn test_date_in_past() {
        let today = Utc::now().date_naive();
        assert!(date_in_past(&today).is_err());
        assert!(date_in_past(&today.pred_opt().unwrap()).is_ok());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "Book").is_ok());
        let errors = validate_id(0, "Book").unwrap_err();
        let fields = crate::error::field_messages(&errors);
        assert_eq!(fields["id"], vec!["Book ID must be greater than 0".to_string()]);
    }
}
