//! Loan management endpoints
//!
//! Role rules live in the loans service; these handlers only decode the
//! request, hand it over and shape the response.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        loan::{CreateLoan, LoanDetails, LoanQuery},
        page_bounds,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List loans visible to the caller
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans visible to the caller", body = PaginatedResponse<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (items, total) = state.services.loans.list(&principal, &query).await?;
    let (page, page_size) = page_bounds(query.page, query.page_size);

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        page_size,
    }))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found or not visible")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get(&principal, id).await?;
    Ok(Json(loan))
}

/// Create a new loan (check a book out to a user)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 403, description = "Not a librarian"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "No copies available, or user already holds this book")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(loan): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let created = state.services.loans.create(&principal, loan).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Renew a loan, extending its due date by one lending period
#[utoipa::path(
    patch,
    path = "/loans/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan renewed", body = LoanDetails),
        (status = 403, description = "Not a reader"),
        (status = 404, description = "Loan not found or not visible"),
        (status = 409, description = "Loan already returned"),
        (status = 422, description = "Renewal limit reached")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let renewed = state.services.loans.renew(&principal, id).await?;
    Ok(Json(renewed))
}

/// Mark a loan returned
#[utoipa::path(
    patch,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan returned (idempotent)", body = LoanDetails),
        (status = 403, description = "Not a librarian"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let returned = state.services.loans.mark_returned(&principal, id).await?;
    Ok(Json(returned))
}

/// Delete a loan record (administrative)
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 403, description = "Not a librarian"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.loans.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
