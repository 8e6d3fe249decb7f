//! User directory service

use crate::{
    error::AppResult,
    models::user::{UpsertUser, User, UserQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Sync a profile pushed by the identity provider
    pub async fn upsert_profile(&self, id: i32, payload: &UpsertUser) -> AppResult<User> {
        self.repository.users.upsert_profile(id, payload).await
    }

    /// Deactivate a profile while keeping its loan history
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        self.repository.users.deactivate(id).await
    }
}
