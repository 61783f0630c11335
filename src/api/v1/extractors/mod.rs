mod auth_ctx;
mod params;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use params::{JsonBody, PathParam, QueryParams};
