//! Author model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Minimum age of an author at record creation, in years
const MIN_AUTHOR_AGE_YEARS: i64 = 12;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validates that a birthday is not in the future and that the author is
/// old enough to plausibly have written anything.
pub fn validate_birthday(value: &NaiveDate) -> Result<(), ValidationError> {
    let today = Utc::now().date_naive();
    if *value > today {
        let mut err = ValidationError::new("birthday_in_future");
        err.message = Some("Birthday cannot be in the future".into());
        return Err(err);
    }
    // Same year arithmetic as the age rule on the admin side: whole days / 365
    let age_years = (today - *value).num_days() / 365;
    if age_years < MIN_AUTHOR_AGE_YEARS {
        let mut err = ValidationError::new("author_too_young");
        err.message = Some("Author must be at least 12 years old".into());
        return Err(err);
    }
    Ok(())
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 30, message = "First name must be 1-30 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1-30 characters"))]
    pub last_name: String,
    #[validate(custom(function = validate_birthday))]
    pub birthday: Option<NaiveDate>,
    #[validate(length(max = 50, message = "Country must be at most 50 characters"))]
    pub country: Option<String>,
}

/// Update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 30, message = "First name must be 1-30 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30, message = "Last name must be 1-30 characters"))]
    pub last_name: Option<String>,
    #[validate(custom(function = validate_birthday))]
    pub birthday: Option<NaiveDate>,
    #[validate(length(max = 50, message = "Country must be at most 50 characters"))]
    pub country: Option<String>,
}

/// Author query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AuthorQuery {
    /// Substring match over first and last name
    pub name: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
