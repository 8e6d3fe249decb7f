//! Users repository for database operations
//!
//! Accounts come from the identity provider; this side only reads them
//! and keeps profiles in sync for loan ownership and reminder emails.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        page_bounds,
        user::{UpsertUser, User, UserQuery},
    },
    repository::constraint_name,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// List users with optional search over email and names
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let (page, page_size) = page_bounds(query.page, query.page_size);
        let offset = (page - 1) * page_size;

        let mut conditions = vec!["1=1".to_string()];
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            binds.push(format!("%{}%", search.to_lowercase()));
            conditions.push(format!(
                "(LOWER(email) LIKE ${n} OR LOWER(first_name) LIKE ${n} OR LOWER(last_name) LIKE ${n})",
                n = binds.len()
            ));
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM users WHERE {}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for bind in &binds {
            count = count.bind(bind);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM users WHERE {} ORDER BY email LIMIT {} OFFSET {}",
            where_clause, page_size, offset
        );
        let mut rows = sqlx::query_as::<_, User>(&select_query);
        for bind in &binds {
            rows = rows.bind(bind);
        }
        let users = rows.fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    /// Insert or refresh a profile from the identity provider's claims.
    pub async fn upsert_profile(&self, id: i32, payload: &UpsertUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, is_active)
            VALUES ($1, $2, $3, $4, COALESCE($5, TRUE))
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                first_name = COALESCE(EXCLUDED.first_name, users.first_name),
                last_name = COALESCE(EXCLUDED.last_name, users.last_name),
                is_active = COALESCE($5, users.is_active),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.email)
        .bind(payload.first_name.as_deref())
        .bind(payload.last_name.as_deref())
        .bind(payload.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("users_email_key") => {
                AppError::Validation("A user with this email already exists".to_string())
            }
            _ => e.into(),
        })
    }

    /// Flag a profile inactive; loan history stays intact.
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }
}
