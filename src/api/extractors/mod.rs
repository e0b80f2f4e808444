/*
 * Responsibility
 * - Request extractors handlers depend on (auth context, forwarded bearer token)
 */
pub mod auth_ctx;
pub mod bearer;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use bearer::BearerToken;
