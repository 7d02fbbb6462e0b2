//! Borrow lifecycle repository: the state machine behind borrow/return,
//! fine computation and the availability projections.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{BorrowDetails, BorrowFilter, BorrowRecord, BorrowStatus},
    },
    repository::clause::ClauseBuilder,
};

/// Fixed loan period between borrow date and scheduled return date.
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// Fine accrued per day late: 0.50 currency units.
fn daily_fine() -> Decimal {
    Decimal::new(5, 1)
}

/// Fine owed for returning on `actual` against a `scheduled` date.
/// Early or on-time returns owe nothing.
pub(crate) fn fine_for(scheduled: NaiveDate, actual: NaiveDate) -> Decimal {
    let days_late = (actual - scheduled).num_days();
    if days_late > 0 {
        daily_fine() * Decimal::from(days_late)
    } else {
        Decimal::ZERO
    }
}

/// Terminal status of a returned record: `Overdue` iff a fine accrued.
pub(crate) fn status_for_fine(fine: Decimal) -> BorrowStatus {
    if fine > Decimal::ZERO {
        BorrowStatus::Overdue
    } else {
        BorrowStatus::Returned
    }
}

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow record by borrow ID
    pub async fn get_by_id(&self, borrow_id: Uuid) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrowed_books WHERE borrow_id = $1")
            .bind(borrow_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No borrowed book found with borrow id {}", borrow_id))
            })
    }

    /// Get all borrow records
    pub async fn get_all(&self) -> AppResult<Vec<BorrowRecord>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrowed_books ORDER BY borrow_date",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Filtered read over borrow records. Date bounds are independent; an
    /// entirely empty filter returns every record.
    pub async fn find(&self, filter: &BorrowFilter) -> AppResult<Vec<BorrowRecord>> {
        let mut criteria = ClauseBuilder::new();
        criteria
            .push("borrow_date >=", filter.min_borrow_date)
            .push("borrow_date <=", filter.max_borrow_date)
            .push("return_date >=", filter.min_return_date)
            .push("return_date <=", filter.max_return_date)
            .push("status =", filter.status.map(|s| s.as_str().to_string()));

        let sql = format!(
            "SELECT * FROM borrowed_books{} ORDER BY borrow_date",
            criteria.where_clause()
        );

        let records = criteria
            .bind_to_as(sqlx::query_as::<_, BorrowRecord>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Single borrow record together with the book it concerns
    pub async fn details(&self, borrow_id: Uuid) -> AppResult<BorrowDetails> {
        let record = self.get_by_id(borrow_id).await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(record.book_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(BorrowDetails { record, book })
    }

    /// Borrow a book for a user.
    ///
    /// Runs as one transaction: the book row is locked first, which
    /// serializes concurrent borrows of the same book, then the borrow is
    /// rejected while any other user holds it. A repeat borrow by the same
    /// user reuses the existing `(book_id, user_id)` row via an atomic
    /// upsert, starting a fresh 7-day cycle under the new borrow id.
    pub async fn borrow(
        &self,
        borrow_id: Uuid,
        book_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT 1 FROM books WHERE book_id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let held_by_other: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrowed_books
                WHERE book_id = $1 AND user_id <> $2 AND status = 'borrowed'
            )
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if held_by_other {
            return Err(AppError::Conflict(
                "Book is currently borrowed by another user".to_string(),
            ));
        }

        let today = Utc::now().date_naive();
        let due_date = today + Duration::days(LOAN_PERIOD_DAYS);

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrowed_books (
                borrow_id, book_id, user_id, borrow_date, return_date,
                actual_return_date, status, fine_amount
            ) VALUES ($1, $2, $3, $4, $5, NULL, 'borrowed', 0)
            ON CONFLICT (book_id, user_id) DO UPDATE SET
                borrow_id = EXCLUDED.borrow_id,
                borrow_date = EXCLUDED.borrow_date,
                return_date = EXCLUDED.return_date,
                actual_return_date = NULL,
                status = 'borrowed',
                fine_amount = 0
            RETURNING *
            "#,
        )
        .bind(borrow_id)
        .bind(book_id)
        .bind(user_id)
        .bind(today)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Return a borrowed book.
    ///
    /// The record is locked, rejected unless still `Borrowed`, and then
    /// written exactly once with its terminal status, actual return date and
    /// fine. The fine is frozen from that point on.
    pub async fn return_book(&self, borrow_id: Uuid) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrowed_books WHERE borrow_id = $1 FOR UPDATE",
        )
        .bind(borrow_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No borrowed book found with borrow id {}", borrow_id))
        })?;

        if record.status != BorrowStatus::Borrowed {
            return Err(AppError::Conflict(format!(
                "Borrow record {} is already {}",
                borrow_id, record.status
            )));
        }

        let actual_return_date = Utc::now().date_naive();
        let fine = fine_for(record.return_date, actual_return_date);
        let status = status_for_fine(fine);

        let updated = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrowed_books
            SET status = $1, actual_return_date = $2, fine_amount = $3
            WHERE borrow_id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(actual_return_date)
        .bind(fine)
        .bind(borrow_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Books with no active borrow: never borrowed, or every record already
    /// returned/overdue. Derived entirely from `borrowed_books`.
    pub async fn available_books(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.* FROM books b
            WHERE NOT EXISTS (
                SELECT 1 FROM borrowed_books bb
                WHERE bb.book_id = b.book_id AND bb.status = 'borrowed'
            )
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Books somebody currently holds in `Borrowed` status.
    pub async fn borrowed_books(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.* FROM books b
            WHERE EXISTS (
                SELECT 1 FROM borrowed_books bb
                WHERE bb.book_id = b.book_id AND bb.status = 'borrowed'
            )
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn three_days_late_costs_one_fifty() {
        let fine = fine_for(date(2024, 3, 10), date(2024, 3, 13));
        assert_eq!(fine, Decimal::new(15, 1));
    }

    #[test]
    fn on_time_return_owes_nothing() {
        assert_eq!(fine_for(date(2024, 3, 10), date(2024, 3, 10)), Decimal::ZERO);
    }

    #[test]
    fn early_return_owes_nothing() {
        assert_eq!(fine_for(date(2024, 3, 10), date(2024, 3, 8)), Decimal::ZERO);
    }

    #[test]
    fn one_day_late_costs_fifty_cents() {
        assert_eq!(
            fine_for(date(2024, 2, 28), date(2024, 2, 29)),
            Decimal::new(5, 1)
        );
    }

    #[test]
    fn status_follows_fine() {
        assert_eq!(status_for_fine(Decimal::ZERO), BorrowStatus::Returned);
        assert_eq!(status_for_fine(Decimal::new(5, 1)), BorrowStatus::Overdue);
    }
}
