//! Reviews repository and the derived-rating aggregation it feeds.

use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::review::Review,
};

/// Integer-truncated mean of review ratings; 0 when there are none.
pub(crate) fn mean_rating(ratings: &[i16]) -> i16 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i32 = ratings.iter().map(|r| i32::from(*r)).sum();
    (sum / ratings.len() as i32) as i16
}

/// Lock the book row and compute the truncated mean of its review ratings.
///
/// The `FOR UPDATE` lock serializes concurrent recomputations for the same
/// book, so two reviews submitted at once cannot lose each other's update.
pub(crate) async fn fetch_mean_rating(
    tx: &mut Transaction<'_, Postgres>,
    book_id: Uuid,
) -> AppResult<i16> {
    sqlx::query("SELECT 1 FROM books WHERE book_id = $1 FOR UPDATE")
        .bind(book_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

    let ratings: Vec<i16> = sqlx::query_scalar("SELECT rating FROM reviews WHERE book_id = $1")
        .bind(book_id)
        .fetch_all(&mut **tx)
        .await?;

    Ok(mean_rating(&ratings))
}

/// Recompute and persist a book's displayed rating from its reviews.
pub(crate) async fn recompute_book_rating(
    tx: &mut Transaction<'_, Postgres>,
    book_id: Uuid,
) -> AppResult<i16> {
    let rating = fetch_mean_rating(tx, book_id).await?;

    sqlx::query("UPDATE books SET rating = $1, updated_at = now() WHERE book_id = $2")
        .bind(rating)
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    Ok(rating)
}

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get all reviews of a single book
    pub async fn get_for_book(&self, book_id: Uuid) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE book_id = $1 ORDER BY review_id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Insert a review, or overwrite the caller's previous review of the
    /// same book, then recompute the book's rating in the same transaction.
    pub async fn upsert(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i16,
        description: &str,
    ) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;

        // lock the book first: NotFound beats a foreign-key failure, and the
        // lock already serializes the recomputation below
        sqlx::query("SELECT 1 FROM books WHERE book_id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (review_id, book_id, user_id, rating, description)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (book_id, user_id) DO UPDATE SET
                rating = EXCLUDED.rating,
                description = EXCLUDED.description
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(user_id)
        .bind(rating)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        recompute_book_rating(&mut tx, book_id).await?;

        tx.commit().await?;

        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::mean_rating;

    #[test]
    fn mean_is_truncated_not_rounded() {
        assert_eq!(mean_rating(&[3, 4, 5]), 4);
        assert_eq!(mean_rating(&[1, 2]), 1);
        assert_eq!(mean_rating(&[4, 5]), 4);
    }

    #[test]
    fn no_reviews_means_zero() {
        assert_eq!(mean_rating(&[]), 0);
    }

    #[test]
    fn single_review_is_its_own_mean() {
        assert_eq!(mean_rating(&[5]), 5);
    }
}
