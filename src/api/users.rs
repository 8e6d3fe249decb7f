//! User directory endpoints (accounts come from the identity provider)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        page_bounds,
        user::{UpsertUser, User, UserQuery},
    },
    services::policy,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List user profiles (staff only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<User>),
        (status = 403, description = "Not staff")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    policy::authorize_user_directory(&principal)?;

    let (items, total) = state.services.users.list(&query).await?;
    let (page, page_size) = page_bounds(query.page, query.page_size);

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        page_size,
    }))
}

/// Get user profile by ID (staff only)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = User),
        (status = 403, description = "Not staff"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    policy::authorize_user_directory(&principal)?;

    let user = state.services.users.get(id).await?;
    Ok(Json(user))
}

/// Create or update a user profile (moderator only)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpsertUser,
    responses(
        (status = 200, description = "Profile stored", body = User),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not a moderator")
    )
)]
pub async fn upsert_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpsertUser>,
) -> AppResult<Json<User>> {
    policy::authorize_user_admin(&principal)?;
    payload.validate()?;

    let user = state.services.users.upsert_profile(id, &payload).await?;
    Ok(Json(user))
}

/// Deactivate a user profile (moderator only)
///
/// Profiles are never deleted outright; the account is flagged inactive and
/// its loan history stays queryable.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Profile deactivated"),
        (status = 403, description = "Not a moderator"),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    policy::authorize_user_admin(&principal)?;

    state.services.users.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
