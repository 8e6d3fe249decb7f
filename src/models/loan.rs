//! Loan model and the active/returned lifecycle rules

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Lending terms, loaded from configuration
#[derive(Debug, Clone, Copy)]
pub struct LoanTerms {
    /// Days from checkout (and per renewal) until the loan is due
    pub period_days: i64,
    /// How many times a single loan may be renewed
    pub max_renewals: i16,
    /// Window, in days from today, used by the due-soon reminder query
    pub due_soon_days: i64,
}

impl LoanTerms {
    /// Due date for a loan checked out on `loan_date`.
    pub fn due_date_from(&self, loan_date: NaiveDate) -> NaiveDate {
        loan_date + Duration::days(self.period_days)
    }
}

/// Why a renewal request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalRefusal {
    AlreadyReturned,
    LimitReached,
}

/// Inclusive date window `[today, today + days]` scanned for due-soon
/// reminders. `Loan::due_within` and the ledger's due-soon query both
/// take their bounds from here.
pub fn due_window(today: NaiveDate, days: i64) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(days))
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub renewals_count: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// An active loan has not been returned yet.
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    /// Resolves a renewal request against this loan's state, returning the
    /// extended due date without touching the record.
    pub fn renewal(&self, terms: &LoanTerms) -> Result<NaiveDate, RenewalRefusal> {
        if !self.is_active() {
            return Err(RenewalRefusal::AlreadyReturned);
        }
        if self.renewals_count >= terms.max_renewals {
            return Err(RenewalRefusal::LimitReached);
        }
        Ok(self.due_date + Duration::days(terms.period_days))
    }

    /// True when the loan is active and due between `today` and
    /// `today + days` inclusive. Overdue loans are not "due soon".
    pub fn due_within(&self, today: NaiveDate, days: i64) -> bool {
        let (from, until) = due_window(today, days);
        self.is_active() && self.due_date >= from && self.due_date <= until
    }
}

/// Loan with user and book context resolved, for display and reminders
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub user_name: String,
    pub book_id: i32,
    pub book_title: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub renewals_count: i16,
}

impl LoanDetails {
    /// Name used when addressing the borrower in notifications, falling
    /// back to the email when no name is on file.
    pub fn salutation(&self) -> &str {
        if self.user_name.is_empty() {
            &self.user_email
        } else {
            &self.user_name
        }
    }
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub user_id: i32,
    pub book_id: i32,
}

/// Loan query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub user_id: Option<i32>,
    pub book_id: Option<i32>,
    /// Filter on lifecycle state: true = unreturned only, false = returned only
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
