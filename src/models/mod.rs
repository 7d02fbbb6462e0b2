//! Data models for Biblios

pub mod book;
pub mod borrow;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookFilter, CreateBook, UpdateBook};
pub use borrow::{BorrowDetails, BorrowFilter, BorrowRecord, BorrowStatus, CreateBorrow};
pub use review::{CreateReview, Review};
pub use user::{CreateUser, Role, UpdateUser, User, UserClaims, UserFilter, UserInfo, UserStatus};
