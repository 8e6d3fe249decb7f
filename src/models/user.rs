//! User model and related types
//!
//! Accounts are provisioned by the identity provider; this service only
//! keeps the profile columns it needs for loan ownership and reminders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// User profile from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile payload pushed by the identity provider
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub first_name: Option<String>,
    #[validate(length(max = 50))]
    pub last_name: Option<String>,
    /// Absent means "leave the current state alone" (new profiles start active)
    pub is_active: Option<bool>,
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Substring match over email and names
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
