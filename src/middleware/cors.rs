//! CORS policy for the single-page frontend.
//!
//! Only the configured app origin(s) may call the API from a browser, unless
//! `APP_ORIGIN=*` opens it to any origin. An empty allowlist simply emits no
//! CORS headers. Credentials are never allowed.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::{AllowedOrigins, Config};

pub fn apply(router: Router, config: &Config) -> Router {
    let allow_origin = match &config.cors_origins {
        AllowedOrigins::Any => AllowOrigin::any(),
        AllowedOrigins::List(origins) => AllowOrigin::list(origins.iter().filter_map(|s| {
            match HeaderValue::from_str(s) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %s, "ignoring unusable CORS origin");
                    None
                }
            }
        })),
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10));

    router.layer(cors)
}
