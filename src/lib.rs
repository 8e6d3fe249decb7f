//! Biblion Library Lending Backend
//!
//! A REST JSON API for managing a library catalog and its loan ledger:
//! books with availability counters, checkouts, renewals, returns and
//! due-date reminders. Identity comes from an external provider; this
//! service consumes role claims and enforces lending policy.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
