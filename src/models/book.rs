//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Book model from database.
///
/// `rating` is derived from the reviews table and recomputed on every book
/// or review mutation; it is deliberately absent from [`CreateBook`] and
/// [`UpdateBook`] so clients can never set it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub isbn: String,
    pub genre: String,
    pub published_date: NaiveDate,
    pub edition: i16,
    pub description: String,
    pub price: Decimal,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub isbn: String,
    pub genre: String,
    pub published_date: NaiveDate,
    pub edition: i16,
    pub description: Option<String>,
    pub price: Decimal,
}

/// Partial book update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub edition: Option<i16>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

/// Optional filters for book reads; absent fields do not constrain.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookFilter {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub min_rating: Option<i16>,
    pub max_rating: Option<i16>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}
