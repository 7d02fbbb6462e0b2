//! Book review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review},
};

use super::AuthenticatedUser;

/// Review submission body; the author is taken from the token.
#[derive(Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    /// Star rating, 1 to 5
    pub rating: i16,
    /// Free-form review text
    pub description: Option<String>,
}

/// List reviews for a book
#[utoipa::path(
    get,
    path = "/books/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Reviews for the book", body = Vec<Review>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_reviews(
    State(state): State<crate::AppState>,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state.services.catalog.reviews_of_book(book_id).await?;
    Ok(Json(reviews))
}

/// Submit or replace the caller's review of a book
#[utoipa::path(
    post,
    path = "/books/{id}/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body = SubmitReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = Review),
        (status = 400, description = "Rating out of range"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn submit_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = CreateReview {
        user_id: claims.user_id,
        rating: request.rating,
        description: request.description,
    };

    let review = state.services.catalog.add_review(book_id, review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
