pub mod book_repo;
pub mod error;
pub mod review_repo;
pub mod user_repo;
