/*!
 * Authentication context extractor
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */
mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::AuthCtx;
