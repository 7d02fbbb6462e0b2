//! Borrow workflow service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{BorrowDetails, BorrowFilter, BorrowRecord, CreateBorrow},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for a user
    pub async fn borrow(&self, payload: CreateBorrow) -> AppResult<BorrowRecord> {
        let (Some(borrow_id), Some(book_id), Some(user_id)) =
            (payload.borrow_id, payload.book_id, payload.user_id)
        else {
            return Err(AppError::Validation(
                "Fields cannot be empty - borrow id, book id, user id".to_string(),
            ));
        };

        // fail-fast before any write
        self.repository.users.get_by_id(user_id).await?;

        self.repository.borrows.borrow(borrow_id, book_id, user_id).await
    }

    /// Return a borrowed book
    pub async fn return_book(&self, borrow_id: Uuid) -> AppResult<BorrowRecord> {
        self.repository.borrows.return_book(borrow_id).await
    }

    /// Full details of a single borrow (record plus book)
    pub async fn details(&self, borrow_id: Uuid) -> AppResult<BorrowDetails> {
        self.repository.borrows.details(borrow_id).await
    }

    /// All borrow records
    pub async fn all_records(&self) -> AppResult<Vec<BorrowRecord>> {
        self.repository.borrows.get_all().await
    }

    /// Borrow records matching an optional filter
    pub async fn find_records(&self, filter: &BorrowFilter) -> AppResult<Vec<BorrowRecord>> {
        self.repository.borrows.find(filter).await
    }

    /// Books currently available to borrow
    pub async fn available_books(&self) -> AppResult<Vec<Book>> {
        self.repository.borrows.available_books().await
    }

    /// Books currently out on loan
    pub async fn borrowed_books(&self) -> AppResult<Vec<Book>> {
        self.repository.borrows.borrowed_books().await
    }
}
