//! Review model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Review model from database. At most one review exists per
/// (book_id, user_id) pair; a second submission overwrites the first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub review_id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub description: String,
}

/// Submit review request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReview {
    pub user_id: Uuid,
    pub rating: i16,
    pub description: Option<String>,
}
