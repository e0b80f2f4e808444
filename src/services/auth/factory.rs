/// Factory: build the per-audience validators from `AuthConfig`.
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::services::auth::{JwksClient, TokenValidator};

/// One validator per protected surface. All of them trust the same issuer and
/// share one key cache.
#[derive(Clone, Debug)]
pub struct Validators {
    pub external: Arc<TokenValidator>,
    pub forecast: Arc<TokenValidator>,
    pub directory: Arc<TokenValidator>,
}

pub fn build_validators(config: &AuthConfig, http_client: reqwest::Client) -> Validators {
    let jwks = Arc::new(JwksClient::new(
        config.jwks_url.clone(),
        http_client,
        config.jwks_cache_ttl,
        config.jwks_min_refresh_interval,
    ));

    let build = |name, audience: &str| {
        Arc::new(TokenValidator::new(
            name,
            jwks.clone(),
            &config.issuer,
            audience,
            config.leeway_seconds,
        ))
    };

    Validators {
        external: build("external", &config.external_audience),
        forecast: build("forecast", &config.forecast_audience),
        directory: build("directory", &config.directory_audience),
    }
}
