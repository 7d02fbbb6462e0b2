//! Borrow and return endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::borrow::{BorrowDetails, BorrowFilter, BorrowRecord, CreateBorrow},
};

use super::AuthenticatedUser;

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecord),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Cannot borrow on behalf of another user"),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "Book already borrowed by another user")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(mut request): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    // Only admins may record a borrow for someone else
    match request.user_id {
        Some(user_id) if user_id != claims.user_id => claims.require_admin()?,
        _ => request.user_id = Some(claims.user_id),
    }

    if request.borrow_id.is_none() {
        request.borrow_id = Some(Uuid::new_v4());
    }

    let record = state.services.borrows.borrow(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 404, description = "Borrow record not found"),
        (status = 409, description = "Book is not currently borrowed")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrow_id): Path<Uuid>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.borrows.details(borrow_id).await?;
    if record.record.user_id != claims.user_id {
        claims.require_admin()?;
    }

    let record = state.services.borrows.return_book(borrow_id).await?;
    Ok(Json(record))
}

/// List all borrow records
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrow records", body = Vec<BorrowRecord>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    claims.require_admin()?;

    let records = state.services.borrows.all_records().await?;
    Ok(Json(records))
}

/// Search borrow records by optional criteria
#[utoipa::path(
    get,
    path = "/borrows/filter",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(BorrowFilter),
    responses(
        (status = 200, description = "Borrow records matching the criteria", body = Vec<BorrowRecord>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn filter_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<BorrowFilter>,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    claims.require_admin()?;

    let records = state.services.borrows.find_records(&filter).await?;
    Ok(Json(records))
}

/// Get a borrow record with its book
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Borrow details", body = BorrowDetails),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn get_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrow_id): Path<Uuid>,
) -> AppResult<Json<BorrowDetails>> {
    let details = state.services.borrows.details(borrow_id).await?;
    if details.record.user_id != claims.user_id {
        claims.require_admin()?;
    }

    Ok(Json(details))
}
