//! Borrow record model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::book::Book;

/// Lending cycle status of a borrow record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Borrowed => "borrowed",
            BorrowStatus::Returned => "returned",
            BorrowStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrowed" => Ok(BorrowStatus::Borrowed),
            "returned" => Ok(BorrowStatus::Returned),
            "overdue" => Ok(BorrowStatus::Overdue),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}

// SQLx conversion for BorrowStatus (stored as lowercase text)
impl sqlx::Type<Postgres> for BorrowStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BorrowStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BorrowStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Borrow record from database: one lending cycle of a book to a user.
///
/// At most one record exists per (book_id, user_id) pair; re-borrowing
/// overwrites the record instead of inserting a second one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub borrow_id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrow_date: NaiveDate,
    /// Scheduled return date (borrow date + the 7-day loan period)
    pub return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub status: BorrowStatus,
    /// Frozen once the record leaves `Borrowed`; 0.50 per day late
    pub fine_amount: Decimal,
}

/// Borrow request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrow {
    pub borrow_id: Option<Uuid>,
    pub book_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Borrow record together with the book it concerns
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowDetails {
    pub record: BorrowRecord,
    pub book: Book,
}

/// Optional filters for borrow-record reads; absent fields do not constrain.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BorrowFilter {
    pub min_borrow_date: Option<NaiveDate>,
    pub max_borrow_date: Option<NaiveDate>,
    pub min_return_date: Option<NaiveDate>,
    pub max_return_date: Option<NaiveDate>,
    pub status: Option<BorrowStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_text_round_trip() {
        for status in [BorrowStatus::Borrowed, BorrowStatus::Returned, BorrowStatus::Overdue] {
            assert_eq!(BorrowStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(BorrowStatus::from_str("renewed").is_err());
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(BorrowStatus::from_str("Returned").unwrap(), BorrowStatus::Returned);
    }
}
