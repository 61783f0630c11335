/*
 * Responsibility
 * - v1 module tree and the routes() re-export
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
