//! Books repository: catalog CRUD and the availability counters
//!
//! `decrease_availability` and `increase_availability` are the only two
//! writers of `available_copies`; every other update path re-validates
//! the full row before persisting.

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
        page_bounds,
    },
    repository::constraint_name,
};

const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.author_id,
           a.first_name || ' ' || a.last_name AS author_name,
           b.published_year, b.total_copies, b.available_copies,
           b.description, b.created_at, b.updated_at,
           COALESCE((
               SELECT ARRAY_AGG(g.name ORDER BY g.name)
               FROM book_genres bg
               JOIN genres g ON g.id = bg.genre_id
               WHERE bg.book_id = b.id
           ), '{}'::text[]) AS genres
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ID with author and genres resolved
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        let query = format!("{} WHERE b.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, BookDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books with filters
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let (page, page_size) = page_bounds(query.page, query.page_size);
        let offset = (page - 1) * page_size;

        let mut conditions = vec!["1=1".to_string()];
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            binds.push(format!("%{}%", search.to_lowercase()));
            conditions.push(format!(
                "(LOWER(b.title) LIKE ${n} OR LOWER(a.last_name) LIKE ${n})",
                n = binds.len()
            ));
        }

        if let Some(ref isbn) = query.isbn {
            binds.push(isbn.clone());
            conditions.push(format!("b.isbn = ${}", binds.len()));
        }

        if let Some(author_id) = query.author_id {
            conditions.push(format!("b.author_id = {}", author_id));
        }

        if let Some(genre_id) = query.genre_id {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM book_genres bg WHERE bg.book_id = b.id AND bg.genre_id = {})",
                genre_id
            ));
        }

        if let Some(year) = query.published_year {
            conditions.push(format!("b.published_year = {}", year));
        }

        match query.available {
            Some(true) => conditions.push("b.available_copies > 0".to_string()),
            Some(false) => conditions.push("b.available_copies = 0".to_string()),
            None => {}
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!(
            "SELECT COUNT(*) FROM books b JOIN authors a ON a.id = b.author_id WHERE {}",
            where_clause
        );
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for bind in &binds {
            count = count.bind(bind);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "{} WHERE {} ORDER BY b.title LIMIT {} OFFSET {}",
            DETAILS_SELECT, where_clause, page_size, offset
        );
        let mut rows = sqlx::query_as::<_, BookDetails>(&select_query);
        for bind in &binds {
            rows = rows.bind(bind);
        }
        let books = rows.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a new book with its genre links
    pub async fn create(&self, book: &CreateBook) -> AppResult<BookDetails> {
        let mut tx = self.pool.begin().await?;

        let book_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, isbn, author_id, published_year,
                               total_copies, available_copies, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.published_year)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(&book.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(Self::map_book_constraint)?;

        Self::replace_genres(&mut tx, book_id, &book.genre_ids).await?;

        tx.commit().await?;
        self.get_details(book_id).await
    }

    /// Update a book, re-validating the copy-count invariant against the
    /// resulting row before persisting.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<BookDetails> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let total_copies = book.total_copies.unwrap_or(current.total_copies);
        let available_copies = book.available_copies.unwrap_or(current.available_copies);
        if available_copies < 0 || available_copies > total_copies {
            return Err(AppError::Validation(
                "Available copies must stay between 0 and total copies".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                isbn = COALESCE($3, isbn),
                author_id = COALESCE($4, author_id),
                published_year = COALESCE($5, published_year),
                total_copies = $6,
                available_copies = $7,
                description = COALESCE($8, description),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.published_year)
        .bind(total_copies)
        .bind(available_copies)
        .bind(&book.description)
        .execute(&mut *tx)
        .await
        .map_err(Self::map_book_constraint)?;

        if let Some(ref genre_ids) = book.genre_ids {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::replace_genres(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        self.get_details(id).await
    }

    /// Delete a book. Fails when loans still reference it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_name(&e).as_deref() {
                Some("loans_book_id_fkey") => {
                    AppError::Conflict("Book still has loans and cannot be deleted".to_string())
                }
                _ => AppError::from(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Decrement `available_copies` inside the caller's transaction.
    /// Returns false (no-op) when no copy is available.
    pub async fn decrease_availability(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1, updated_at = NOW()
            WHERE id = $1 AND available_copies > 0
            "#,
        )
        .bind(book_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment `available_copies` inside the caller's transaction.
    /// Returns false (no-op) when the count is already at `total_copies`.
    pub async fn increase_availability(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies + 1, updated_at = NOW()
            WHERE id = $1 AND available_copies < total_copies
            "#,
        )
        .bind(book_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_genres(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int4[])",
        )
        .bind(book_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("book_genres_genre_id_fkey") => {
                AppError::NotFound("One of the referenced genres does not exist".to_string())
            }
            _ => AppError::from(e),
        })?;
        Ok(())
    }

    fn map_book_constraint(e: sqlx::Error) -> AppError {
        match constraint_name(&e).as_deref() {
            Some("books_isbn_key") => {
                AppError::Validation("A book with this ISBN already exists".to_string())
            }
            Some("books_author_id_fkey") => {
                AppError::NotFound("Referenced author does not exist".to_string())
            }
            _ => AppError::from(e),
        }
    }
}
