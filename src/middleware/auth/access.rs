//! Access token validation -> `AuthCtx` into request extensions.
//!
//! Each protected router is wrapped with the validator for its audience.
//! Everything that goes wrong here (missing header, bad signature, wrong
//! audience, unreachable key set) ends as the same 401; the reason is
//! logged only.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthError, TokenValidator, extract_bearer};

/// Guard every route of `router` with `validator`.
///
/// Applied with `route_layer`, so unknown paths still answer 404 rather than 401.
///
/// ```ignore
/// let forecast = Router::new().route("/api/weatherforecast", get(handler));
/// let forecast = middleware::auth::access::apply(forecast, state.auth.forecast.clone());
/// ```
pub fn apply<S>(router: Router<S>, validator: Arc<TokenValidator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(validator, access_middleware))
}

async fn access_middleware(
    State(validator): State<Arc<TokenValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(req.headers()).inspect_err(|err| {
        tracing::debug!(validator = validator.name(), error = %err, "rejected request without usable bearer token");
    })?;

    let claims = match validator.validate(token).await {
        Ok(claims) => claims,
        Err(err @ AuthError::KeySetUnavailable(_)) => {
            tracing::error!(validator = validator.name(), error = %err, "cannot verify token: key set unavailable");
            return Err(AppError::Unauthorized);
        }
        Err(err) => {
            tracing::warn!(validator = validator.name(), error = %err, "access token verification failed");
            return Err(AppError::Unauthorized);
        }
    };

    let auth_ctx = AuthCtx::from_claims(&claims, validator.name());

    // middleware -> extractor hand-off
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
