use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::extract_bearer;

/// The caller's raw bearer token, for forwarding to the directory.
///
/// Rejects with 401 when the header is missing or malformed, before the
/// handler (and therefore any outbound call) runs.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers).map_err(|e| {
            tracing::debug!(error = %e, "no bearer token to forward");
            AppError::from(e)
        })?;
        Ok(BearerToken(token.to_string()))
    }
}
