/*
 * Responsibility
 * - Bearer token verification (header extraction -> key lookup -> signature/claims)
 * - One validator instance per audience; all share the issuer's key client
 * - Authorization decisions stay in handlers (none needed today)
 */
pub mod access_jwt;
pub mod bearer;
pub mod factory;
pub mod jwks;

use thiserror::Error;

pub use access_jwt::{AccessTokenClaims, TokenValidator};
pub use bearer::extract_bearer;
pub use factory::{Validators, build_validators};
pub use jwks::JwksClient;

/// Why a request failed authentication.
///
/// Only ever logged. Clients always see the same 401 (see `AppError::from`).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("malformed Authorization header")]
    MalformedHeader,
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),
    #[error("token verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("signing key set unavailable: {0}")]
    KeySetUnavailable(String),
}
