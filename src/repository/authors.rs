//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorQuery, CreateAuthor, UpdateAuthor},
        page_bounds,
    },
    repository::constraint_name,
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// List authors with optional name filter
    pub async fn list(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        let (page, page_size) = page_bounds(query.page, query.page_size);
        let offset = (page - 1) * page_size;

        let mut conditions = vec!["1=1".to_string()];
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref name) = query.name {
            binds.push(format!("%{}%", name.to_lowercase()));
            conditions.push(format!(
                "(LOWER(first_name) LIKE ${n} OR LOWER(last_name) LIKE ${n})",
                n = binds.len()
            ));
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM authors WHERE {}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for bind in &binds {
            count = count.bind(bind);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM authors WHERE {} ORDER BY last_name, first_name LIMIT {} OFFSET {}",
            where_clause, page_size, offset
        );
        let mut rows = sqlx::query_as::<_, Author>(&select_query);
        for bind in &binds {
            rows = rows.bind(bind);
        }
        let authors = rows.fetch_all(&self.pool).await?;

        Ok((authors, total))
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, birthday, country)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.birthday)
        .bind(&author.country)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("authors_identity_key") => {
                AppError::Validation("An author with this name and birthday already exists".to_string())
            }
            _ => e.into(),
        })
    }

    /// Update an existing author
    pub async fn update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                birthday = COALESCE($4, birthday),
                country = COALESCE($5, country),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&author.first_name)
        .bind(&author.last_name)
        .bind(author.birthday)
        .bind(&author.country)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("authors_identity_key") => {
                AppError::Validation("An author with this name and birthday already exists".to_string())
            }
            _ => AppError::from(e),
        })?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Delete an author. Fails when books still reference it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_name(&e).as_deref() {
                Some("books_author_id_fkey") => {
                    AppError::Conflict("Author still has books and cannot be deleted".to_string())
                }
                _ => AppError::from(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }
}
