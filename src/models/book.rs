//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Full book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: i32,
    pub published_year: i32,
    pub total_copies: i32,
    pub available_copies: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book with author name and genre names resolved, for list and detail views
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: i32,
    pub author_name: String,
    pub published_year: i32,
    pub total_copies: i32,
    pub available_copies: i32,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validates an ISBN-13: exactly 13 digits starting with 978 or 979.
pub fn validate_isbn(value: &str) -> Result<(), ValidationError> {
    if value.len() != 13 || !value.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("isbn_format");
        err.message = Some("ISBN must be exactly 13 digits".into());
        return Err(err);
    }
    if !value.starts_with("978") && !value.starts_with("979") {
        let mut err = ValidationError::new("isbn_prefix");
        err.message = Some("ISBN must start with 978 or 979".into());
        return Err(err);
    }
    Ok(())
}

fn validate_copy_counts(book: &CreateBook) -> Result<(), ValidationError> {
    if book.available_copies > book.total_copies {
        let mut err = ValidationError::new("available_exceeds_total");
        err.message = Some("Available copies cannot exceed total copies".into());
        return Err(err);
    }
    Ok(())
}

fn validate_copy_counts_update(book: &UpdateBook) -> Result<(), ValidationError> {
    if let (Some(available), Some(total)) = (book.available_copies, book.total_copies) {
        if available > total {
            let mut err = ValidationError::new("available_exceeds_total");
            err.message = Some("Available copies cannot exceed total copies".into());
            return Err(err);
        }
    }
    Ok(())
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = validate_copy_counts))]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(custom(function = validate_isbn))]
    pub isbn: String,
    pub author_id: i32,
    #[validate(range(min = 0, message = "Published year cannot be negative"))]
    pub published_year: i32,
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    #[serde(default = "default_copies")]
    pub total_copies: i32,
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    #[serde(default = "default_copies")]
    pub available_copies: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

fn default_copies() -> i32 {
    1
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = validate_copy_counts_update))]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(custom(function = validate_isbn))]
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    #[validate(range(min = 0, message = "Published year cannot be negative"))]
    pub published_year: Option<i32>,
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    pub total_copies: Option<i32>,
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    pub available_copies: Option<i32>,
    pub description: Option<String>,
    pub genre_ids: Option<Vec<i32>>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Substring match on book title or author last name
    pub search: Option<String>,
    /// Exact ISBN match
    pub isbn: Option<String>,
    pub author_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub published_year: Option<i32>,
    /// Filter on stock: true = in stock only, false = out of stock only
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
