//! Loan management service
//!
//! Every operation is gated through the policy module before the
//! repository is touched; list and detail reads are scoped to what the
//! acting principal may see.

use crate::{
    error::AppResult,
    models::{
        loan::{CreateLoan, LoanDetails, LoanQuery, LoanTerms},
        principal::Principal,
    },
    repository::Repository,
    services::policy::{self, LedgerAction},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    terms: LoanTerms,
}

impl LoansService {
    pub fn new(repository: Repository, terms: LoanTerms) -> Self {
        Self { repository, terms }
    }

    /// List loans visible to the principal
    pub async fn list(
        &self,
        principal: &Principal,
        query: &LoanQuery,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let scope = policy::ledger_scope(principal);
        self.repository.loans.list(query, scope).await
    }

    /// Get one loan, if the principal may see it
    pub async fn get(&self, principal: &Principal, id: i32) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.get_by_id(id).await?;
        policy::ensure_loan_visible(principal, &loan)?;
        self.repository.loans.get_details(id).await
    }

    /// Check a book out to a user
    pub async fn create(&self, principal: &Principal, loan: CreateLoan) -> AppResult<LoanDetails> {
        policy::authorize_ledger(principal, LedgerAction::Create)?;

        // Verify user exists
        self.repository.users.get_by_id(loan.user_id).await?;

        let created = self
            .repository
            .loans
            .create(loan.user_id, loan.book_id, &self.terms)
            .await?;
        self.repository.loans.get_details(created.id).await
    }

    /// Renew a loan the principal owns
    pub async fn renew(&self, principal: &Principal, id: i32) -> AppResult<LoanDetails> {
        policy::authorize_ledger(principal, LedgerAction::Renew)?;

        let loan = self.repository.loans.get_by_id(id).await?;
        policy::ensure_loan_visible(principal, &loan)?;

        let renewed = self.repository.loans.renew(id, &self.terms).await?;
        self.repository.loans.get_details(renewed.id).await
    }

    /// Mark a loan returned; returning twice changes nothing
    pub async fn mark_returned(&self, principal: &Principal, id: i32) -> AppResult<LoanDetails> {
        policy::authorize_ledger(principal, LedgerAction::MarkReturned)?;

        let returned = self.repository.loans.mark_returned(id).await?;
        self.repository.loans.get_details(returned.id).await
    }

    /// Administratively delete a loan record
    pub async fn delete(&self, principal: &Principal, id: i32) -> AppResult<()> {
        policy::authorize_ledger(principal, LedgerAction::Delete)?;
        self.repository.loans.delete(id).await
    }
}
