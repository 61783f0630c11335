pub mod auth;
pub mod cache;
pub mod mailer;
pub mod password;
pub mod url_token;
