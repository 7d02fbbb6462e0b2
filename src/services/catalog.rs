//! Catalog service: books, reviews and the derived rating between them

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter, CreateBook, UpdateBook},
        review::{CreateReview, Review},
    },
    repository::Repository,
    validation::{is_valid_edition, is_valid_price, is_valid_rating},
};

const DEFAULT_DESCRIPTION: &str = "No description available";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.get_all().await
    }

    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn find_books(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        self.repository.books.find(filter).await
    }

    /// Add a book to the catalog. The payload carries no rating field; the
    /// stored rating is always recomputed from reviews.
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        let required = [
            ("title", &book.title),
            ("author", &book.author),
            ("publisher", &book.publisher),
            ("isbn", &book.isbn),
            ("genre", &book.genre),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("Field {} cannot be empty", field)));
            }
        }

        if !is_valid_edition(&book.edition) {
            return Err(AppError::Validation(
                "Edition must be greater than 0".to_string(),
            ));
        }

        if !is_valid_price(&book.price) {
            return Err(AppError::Validation("Price cannot be negative".to_string()));
        }

        let description = book
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string();

        self.repository.books.create(&book, &description).await
    }

    /// Partially update a book; the rating is recomputed as part of the
    /// update regardless of which fields are populated.
    pub async fn modify_book(&self, id: Uuid, update: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &update).await
    }

    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// List all reviews of a book
    pub async fn reviews_of_book(&self, book_id: Uuid) -> AppResult<Vec<Review>> {
        // surface NotFound for an unknown book rather than an empty list
        self.repository.books.get_by_id(book_id).await?;
        self.repository.reviews.get_for_book(book_id).await
    }

    /// Submit a review. A second review by the same user for the same book
    /// overwrites the first; the book rating is recomputed either way.
    pub async fn add_review(&self, book_id: Uuid, review: CreateReview) -> AppResult<Review> {
        if !is_valid_rating(&review.rating) {
            return Err(AppError::Validation(
                "Rating needs to be between 1 and 5".to_string(),
            ));
        }

        // fail-fast before any write
        self.repository.users.get_by_id(review.user_id).await?;

        let description = review.description.clone().unwrap_or_default();

        self.repository
            .reviews
            .upsert(book_id, review.user_id, review.rating, &description)
            .await
    }
}
