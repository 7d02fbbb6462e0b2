//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, CreateBook, UpdateBook},
    repository::{clause::ClauseBuilder, reviews},
    validation::{is_valid_edition, is_valid_price, is_valid_rating},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get all books
    pub async fn get_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Filtered read. Fields that are absent or out of range do not
    /// constrain; an entirely empty filter returns every book.
    pub async fn find(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut criteria = ClauseBuilder::new();
        criteria
            .push("genre =", filter.genre.clone())
            .push("author =", filter.author.clone())
            .push_if("rating >=", filter.min_rating, is_valid_rating)
            .push_if("rating <=", filter.max_rating, is_valid_rating)
            .push_if("price >=", filter.min_price, is_valid_price)
            .push_if("price <=", filter.max_price, is_valid_price);

        let sql = format!("SELECT * FROM books{} ORDER BY title", criteria.where_clause());

        let books = criteria
            .bind_to_as(sqlx::query_as::<_, Book>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Create a new book. The stored rating comes from the aggregator, never
    /// from the payload.
    pub async fn create(&self, book: &CreateBook, description: &str) -> AppResult<Book> {
        let now = Utc::now();
        let book_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO books (
                book_id, title, author, publisher, isbn, genre, published_date,
                edition, description, price, rating, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11, $11)
            "#,
        )
        .bind(book_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.isbn)
        .bind(&book.genre)
        .bind(book.published_date)
        .bind(book.edition)
        .bind(description)
        .bind(book.price)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        reviews::recompute_book_rating(&mut tx, book_id).await?;

        let created = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    /// Partial update. The recomputed rating assignment always participates,
    /// so a book update never degenerates to an empty SET clause.
    pub async fn update(&self, id: Uuid, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        // locks the book row and fails with NotFound if it is missing
        let rating = reviews::fetch_mean_rating(&mut tx, id).await?;

        let mut assignments = ClauseBuilder::new();
        assignments
            .push("title =", update.title.clone())
            .push("author =", update.author.clone())
            .push("publisher =", update.publisher.clone())
            .push("isbn =", update.isbn.clone())
            .push("genre =", update.genre.clone())
            .push("published_date =", update.published_date)
            .push_if("edition =", update.edition, is_valid_edition)
            .push("description =", update.description.clone())
            .push_if("price =", update.price, is_valid_price)
            .push("rating =", Some(rating))
            .push("updated_at =", Some(Utc::now()));

        let set_clause = assignments.set_clause()?;
        let sql = format!(
            "UPDATE books{} WHERE book_id = ${}",
            set_clause,
            assignments.next_index()
        );

        assignments
            .bind_to(sqlx::query(&sql))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a book
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }
}
