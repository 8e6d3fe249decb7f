//! Role-based policy for catalog and ledger operations
//!
//! Every authorization decision goes through one of the functions here;
//! handlers and services never test roles inline. Readers see only their
//! own loans, and a loan outside a reader's scope is reported as absent
//! rather than forbidden, so existence does not leak across owners.

use crate::{
    error::{AppError, AppResult},
    models::{loan::Loan, principal::Principal},
};

/// Operations on books, authors and genres
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    Read,
    Write,
}

/// Operations on the loan ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    Create,
    Renew,
    MarkReturned,
    Delete,
}

/// Gate for catalog operations: anyone authenticated may read,
/// only librarians may write.
pub fn authorize_catalog(principal: &Principal, action: CatalogAction) -> AppResult<()> {
    match action {
        CatalogAction::Read => Ok(()),
        CatalogAction::Write => {
            if principal.is_librarian() {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only librarians may modify the catalog".to_string(),
                ))
            }
        }
    }
}

/// Gate for ledger mutations. Checkouts, returns and deletions are desk
/// work and belong to librarians; renewals belong to readers.
pub fn authorize_ledger(principal: &Principal, action: LedgerAction) -> AppResult<()> {
    match action {
        LedgerAction::Create => {
            if principal.is_librarian() {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only librarians may create loans".to_string(),
                ))
            }
        }
        LedgerAction::Renew => {
            if principal.is_reader() {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only readers may renew their loans".to_string(),
                ))
            }
        }
        LedgerAction::MarkReturned => {
            if principal.is_librarian() {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only librarians may mark loans returned".to_string(),
                ))
            }
        }
        LedgerAction::Delete => {
            if principal.is_librarian() {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only librarians may delete loans".to_string(),
                ))
            }
        }
    }
}

/// Gate for reading user profiles: staff only.
pub fn authorize_user_directory(principal: &Principal) -> AppResult<()> {
    if principal.is_librarian() || principal.is_moderator() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only staff may browse user profiles".to_string(),
        ))
    }
}

/// Gate for writing user profiles: moderators administer the directory.
pub fn authorize_user_admin(principal: &Principal) -> AppResult<()> {
    if principal.is_moderator() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only moderators may manage user profiles".to_string(),
        ))
    }
}

/// Visibility scope for loan list queries: librarians see everything,
/// everyone else only their own loans. Applied inside the SQL query.
pub fn ledger_scope(principal: &Principal) -> Option<i32> {
    if principal.is_librarian() {
        None
    } else {
        Some(principal.user_id)
    }
}

/// A loan a principal cannot see does not exist for them.
pub fn ensure_loan_visible(principal: &Principal, loan: &Loan) -> AppResult<()> {
    if principal.is_librarian() || loan.user_id == principal.user_id {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "Loan with id {} not found",
            loan.id
        )))
    }
}
