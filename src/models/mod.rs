//! Data models for Biblion

pub mod author;
pub mod book;
pub mod genre;
pub mod loan;
pub mod principal;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use genre::Genre;
pub use loan::{Loan, LoanDetails, LoanTerms};
pub use principal::{Principal, Role};
pub use user::User;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper bound a client may request via `page_size`
pub const MAX_PAGE_SIZE: i64 = 50;

/// Clamp raw pagination parameters: page >= 1, 1 <= page_size <= MAX_PAGE_SIZE.
pub fn page_bounds(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}
