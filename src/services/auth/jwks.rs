//! Signing key client for the trusted issuer.
//!
//! Fetches the issuer's `/.well-known/jwks.json`, keeps the usable RS256 keys
//! keyed by `kid`, and refreshes them when the TTL lapses or when the
//! validator reports a key it cannot find or cannot verify with.
//!
//! Refresh attempts, successful or not, are throttled by
//! `min_refresh_interval` and serialized behind a mutex. Concurrent requests
//! carrying the same rotated `kid` trigger one fetch, and neither unknown
//! `kid`s nor a failing issuer turn into a fetch per request.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;
use url::Url;

use super::AuthError;

/// JSON Web Key as published by the issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<Jwk>,
}

impl Jwk {
    /// RS256 verification key, or `None` when this entry cannot verify our tokens.
    fn to_decoding_key(&self) -> Option<DecodingKey> {
        if self.kty != "RSA" {
            return None;
        }
        if self.key_use.as_deref().is_some_and(|u| u != "sig") {
            return None;
        }
        if self.alg.as_deref().is_some_and(|a| a != "RS256") {
            return None;
        }
        let (n, e) = (self.n.as_deref()?, self.e.as_deref()?);
        DecodingKey::from_rsa_components(n, e)
            .map_err(|err| {
                tracing::warn!(
                    target: "auth.jwks",
                    kid = ?self.kid,
                    error = %err,
                    "ignoring RSA key with invalid components"
                );
            })
            .ok()
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// A key resolved for a `kid`.
///
/// `fresh` is set when the key set was fetched while resolving it, in which
/// case a signature failure is final and no further refresh is attempted.
#[derive(Clone)]
pub struct ResolvedKey {
    pub key: DecodingKey,
    pub fresh: bool,
}

pub struct JwksClient {
    jwks_url: Url,
    http_client: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
    /// Time of the last fetch attempt; also serializes refreshes.
    last_attempt: Mutex<Option<Instant>>,
    cache_ttl: Duration,
    min_refresh_interval: Duration,
}

impl std::fmt::Debug for JwksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksClient")
            .field("jwks_url", &self.jwks_url.as_str())
            .field("cache_ttl", &self.cache_ttl)
            .field("min_refresh_interval", &self.min_refresh_interval)
            .finish()
    }
}

impl JwksClient {
    pub fn new(
        jwks_url: Url,
        http_client: reqwest::Client,
        cache_ttl: Duration,
        min_refresh_interval: Duration,
    ) -> Self {
        Self {
            jwks_url,
            http_client,
            cache: RwLock::new(None),
            last_attempt: Mutex::new(None),
            cache_ttl,
            min_refresh_interval,
        }
    }

    /// Resolve the verification key for `kid`.
    ///
    /// A cached, unexpired key is returned as-is. An expired/empty cache, or a
    /// `kid` missing from the cache, causes one refresh before giving up.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<ResolvedKey, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        tracing::debug!(target: "auth.jwks", "key cache hit");
                        return Ok(ResolvedKey {
                            key: key.clone(),
                            fresh: false,
                        });
                    }
                    tracing::debug!(target: "auth.jwks", "kid not in key cache");
                }
            }
        }

        let refreshed = self.refresh().await?;

        match self.cached_key(kid).await {
            Some(key) => Ok(ResolvedKey {
                key,
                fresh: refreshed,
            }),
            None => {
                tracing::warn!(target: "auth.jwks", refreshed, "kid not found in key set");
                Err(AuthError::InvalidToken("unknown signing key"))
            }
        }
    }

    /// Key for `kid` from the current cache, ignoring TTL.
    pub async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        let cache = self.cache.read().await;
        cache.as_ref().and_then(|c| c.keys.get(kid).cloned())
    }

    /// Re-fetch the key set unless a fetch was attempted within the throttle
    /// window.
    ///
    /// Returns whether a fetch actually happened. A throttled call with no key
    /// set cached at all reports the key set as unavailable.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<bool, AuthError> {
        let mut last_attempt = self.last_attempt.lock().await;

        if let Some(at) = *last_attempt {
            let since = at.elapsed();
            if since < self.min_refresh_interval {
                if self.cache.read().await.is_none() {
                    tracing::debug!(target: "auth.jwks", ?since, "key set fetch failed recently, not retrying yet");
                    return Err(AuthError::KeySetUnavailable(
                        "key set fetch throttled after failure".to_string(),
                    ));
                }
                tracing::debug!(target: "auth.jwks", ?since, "key set fetched recently, skipping refresh");
                return Ok(false);
            }
        }

        *last_attempt = Some(Instant::now());
        let keys = self.fetch().await?;
        tracing::info!(target: "auth.jwks", key_count = keys.len(), "signing key cache refreshed");

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        Ok(true)
    }

    async fn fetch(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
        tracing::debug!(target: "auth.jwks", url = %self.jwks_url, "fetching signing keys");

        let response = self
            .http_client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "auth.jwks", error = %e, "failed to fetch signing keys");
                AuthError::KeySetUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(target: "auth.jwks", %status, "key set endpoint returned error");
            return Err(AuthError::KeySetUnavailable(format!("status {status}")));
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "auth.jwks", error = %e, "failed to parse key set");
            AuthError::KeySetUnavailable(e.to_string())
        })?;

        Ok(jwks
            .keys
            .iter()
            .filter_map(|jwk| {
                let kid = jwk.kid.clone()?;
                let key = jwk.to_decoding_key()?;
                Some((kid, key))
            })
            .collect())
    }
}
