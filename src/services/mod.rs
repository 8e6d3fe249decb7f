//! Business logic services

pub mod catalog;
pub mod email;
pub mod loans;
pub mod policy;
pub mod reminders;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all request-scoped services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.loans.terms()),
            users: users::UsersService::new(repository),
            email: email::EmailService::new(&config.email)?,
        })
    }
}
