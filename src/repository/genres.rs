//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        genre::{CreateGenre, Genre, GenreQuery, UpdateGenre},
        page_bounds,
    },
    repository::constraint_name,
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get genre by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    /// List genres with optional name filter
    pub async fn list(&self, query: &GenreQuery) -> AppResult<(Vec<Genre>, i64)> {
        let (page, page_size) = page_bounds(query.page, query.page_size);
        let offset = (page - 1) * page_size;

        let mut conditions = vec!["1=1".to_string()];
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref name) = query.name {
            binds.push(format!("%{}%", name.to_lowercase()));
            conditions.push(format!("LOWER(name) LIKE ${}", binds.len()));
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM genres WHERE {}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for bind in &binds {
            count = count.bind(bind);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM genres WHERE {} ORDER BY name LIMIT {} OFFSET {}",
            where_clause, page_size, offset
        );
        let mut rows = sqlx::query_as::<_, Genre>(&select_query);
        for bind in &binds {
            rows = rows.bind(bind);
        }
        let genres = rows.fetch_all(&self.pool).await?;

        Ok((genres, total))
    }

    /// Create a new genre
    pub async fn create(&self, genre: &CreateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            r#"
            INSERT INTO genres (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&genre.name)
        .bind(&genre.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("genres_name_key") => {
                AppError::Validation("A genre with this name already exists".to_string())
            }
            _ => e.into(),
        })
    }

    /// Update an existing genre
    pub async fn update(&self, id: i32, genre: &UpdateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            r#"
            UPDATE genres
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&genre.name)
        .bind(&genre.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("genres_name_key") => {
                AppError::Validation("A genre with this name already exists".to_string())
            }
            _ => AppError::from(e),
        })?
        .ok_or_else(|| AppError::NotFound(format!("Genre with id {} not found", id)))
    }

    /// Delete a genre; its book links go with it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre with id {} not found", id)));
        }
        Ok(())
    }
}
