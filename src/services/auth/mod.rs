pub mod authority;
pub mod claims;
pub mod error;
pub mod factory;
pub mod jwt;
pub mod permission;
pub mod revocation;

pub use authority::{AuthConfig, TokenAuthority};
pub use claims::{TokenClaims, TokenKind, UserClaim};
pub use error::AuthError;
pub use factory::build_token_authority;
pub use permission::PermissionSet;
