//! Loans repository: the ledger of checkouts and returns
//!
//! Every mutation that touches a loan together with its book's
//! availability runs in a single transaction, with the book row locked
//! first. Two concurrent checkouts of the last copy cannot both succeed.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{due_window, Loan, LoanDetails, LoanQuery, LoanTerms, RenewalRefusal},
        page_bounds,
    },
    repository::{books::BooksRepository, constraint_name},
};

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.email AS user_email,
           TRIM(COALESCE(u.first_name, '') || ' ' || COALESCE(u.last_name, '')) AS user_name,
           l.book_id, b.title AS book_title,
           l.loan_date, l.due_date, l.return_date, l.renewals_count
    FROM loans l
    JOIN users u ON u.id = l.user_id
    JOIN books b ON b.id = l.book_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan by ID with user and book context
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        let query = format!("{} WHERE l.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, LoanDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List loans. `visible_to` restricts the result to one user's loans;
    /// the scope is part of the query, not filtered after the fact.
    pub async fn list(
        &self,
        query: &LoanQuery,
        visible_to: Option<i32>,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (page, page_size) = page_bounds(query.page, query.page_size);
        let offset = (page - 1) * page_size;

        let mut conditions = vec!["1=1".to_string()];

        if let Some(user_id) = visible_to {
            conditions.push(format!("l.user_id = {}", user_id));
        } else if let Some(user_id) = query.user_id {
            conditions.push(format!("l.user_id = {}", user_id));
        }

        if let Some(book_id) = query.book_id {
            conditions.push(format!("l.book_id = {}", book_id));
        }

        match query.active {
            Some(true) => conditions.push("l.return_date IS NULL".to_string()),
            Some(false) => conditions.push("l.return_date IS NOT NULL".to_string()),
            None => {}
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!(
            "SELECT COUNT(*) FROM loans l WHERE {}",
            where_clause
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .fetch_one(&self.pool)
            .await?;

        let select_query = format!(
            "{} WHERE {} ORDER BY l.id LIMIT {} OFFSET {}",
            DETAILS_SELECT, where_clause, page_size, offset
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&select_query)
            .fetch_all(&self.pool)
            .await?;

        Ok((loans, total))
    }

    /// Check out a book: availability check, duplicate check, decrement
    /// and insert as one atomic unit.
    pub async fn create(&self, user_id: i32, book_id: i32, terms: &LoanTerms) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        // Lock the book row so concurrent checkouts serialize here
        let available: i32 = sqlx::query_scalar(
            "SELECT available_copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if available == 0 {
            return Err(AppError::OutOfStock(
                "No available copies of this book".to_string(),
            ));
        }

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = $1 AND book_id = $2 AND return_date IS NULL)",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::DuplicateActiveLoan(
                "This user already holds an active loan for this book".to_string(),
            ));
        }

        if !BooksRepository::decrease_availability(&mut tx, book_id).await? {
            return Err(AppError::OutOfStock(
                "No available copies of this book".to_string(),
            ));
        }

        let loan_date = Utc::now().date_naive();
        let due_date = terms.due_date_from(loan_date);

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, loan_date, due_date, renewals_count)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match constraint_name(&e).as_deref() {
            Some("loans_active_user_book_key") => AppError::DuplicateActiveLoan(
                "This user already holds an active loan for this book".to_string(),
            ),
            Some("loans_user_id_fkey") => {
                AppError::NotFound(format!("User with id {} not found", user_id))
            }
            _ => AppError::from(e),
        })?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Extend an active loan by one lending period, up to the renewal cap.
    pub async fn renew(&self, id: i32, terms: &LoanTerms) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        let new_due_date = loan.renewal(terms).map_err(|refusal| match refusal {
            RenewalRefusal::AlreadyReturned => {
                AppError::LoanAlreadyReturned("Cannot renew a returned loan".to_string())
            }
            RenewalRefusal::LimitReached => AppError::RenewalLimitExceeded(format!(
                "Loan has already been renewed {} times",
                loan.renewals_count
            )),
        })?;

        let renewed = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET due_date = $2, renewals_count = renewals_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(renewed)
    }

    /// Mark a loan returned and give the copy back to the catalog.
    /// Returning an already-returned loan changes nothing.
    pub async fn mark_returned(&self, id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if !loan.is_active() {
            return Ok(loan);
        }

        let returned = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET return_date = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now().date_naive())
        .fetch_one(&mut *tx)
        .await?;

        // A counter already at total_copies means the row was edited by
        // hand since checkout; the return itself still stands.
        if !BooksRepository::increase_availability(&mut tx, loan.book_id).await? {
            tracing::warn!(
                "Loan {} returned but book {} is already at total_copies",
                loan.id,
                loan.book_id
            );
        }

        tx.commit().await?;
        Ok(returned)
    }

    /// Administrative deletion. An active loan hands its copy back first.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.is_active()
            && !BooksRepository::increase_availability(&mut tx, loan.book_id).await?
        {
            tracing::warn!(
                "Loan {} deleted but book {} is already at total_copies",
                loan.id,
                loan.book_id
            );
        }

        sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Active loans due between today and `today + days`, inclusive.
    /// Overdue loans are past reminding and excluded.
    pub async fn due_soon(&self, days: i64) -> AppResult<Vec<LoanDetails>> {
        let (from, until) = due_window(Utc::now().date_naive(), days);
        let query = format!(
            "{} WHERE l.return_date IS NULL \
             AND l.due_date BETWEEN $1 AND $2 \
             ORDER BY l.due_date, l.id",
            DETAILS_SELECT
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&query)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }
}
