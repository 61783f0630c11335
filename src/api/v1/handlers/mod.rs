pub mod books;
pub mod health;
pub mod reviews;
pub mod users;
