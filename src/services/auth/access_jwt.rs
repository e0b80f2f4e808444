use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{AuthError, JwksClient};

/// Tokens larger than this are rejected before any parsing.
pub const MAX_TOKEN_BYTES: usize = 8 * 1024;

/// Access token claims as issued by the identity provider.
///
/// `aud` may be a single string or an array; `jsonwebtoken` checks it
/// against the configured audience, so it is kept as a raw value here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub aud: serde_json::Value,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl AccessTokenClaims {
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn audiences(&self) -> Vec<String> {
        match &self.aud {
            serde_json::Value::String(s) => vec![s.clone()],
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// RS256 access-token validator bound to one issuer and one audience.
///
/// Several validators may share the same `JwksClient`; they differ only by
/// the audience they accept.
pub struct TokenValidator {
    name: &'static str,
    audience: String,
    jwks: Arc<JwksClient>,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("name", &self.name)
            .field("audience", &self.audience)
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenValidator {
    pub fn new(
        name: &'static str,
        jwks: Arc<JwksClient>,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        Self {
            name,
            audience: audience.to_string(),
            jwks,
            validation,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Verify signature, issuer, audience, `exp` and `nbf`.
    ///
    /// The key is chosen by the token's `kid`. If the signature does not
    /// verify against a cached key, the key set is refreshed once and the
    /// token is verified one more time before it is rejected.
    #[instrument(skip_all, fields(validator = self.name))]
    pub async fn validate(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        if token.len() > MAX_TOKEN_BYTES {
            return Err(AuthError::InvalidToken("token too large"));
        }

        let header = jsonwebtoken::decode_header(token)
            .map_err(|_| AuthError::InvalidToken("malformed token header"))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidToken("unsupported algorithm"));
        }
        let kid = header
            .kid
            .ok_or(AuthError::InvalidToken("missing kid"))?;

        let resolved = self.jwks.get_key(&kid).await?;

        match self.decode(token, &resolved.key) {
            Err(err) if matches!(err.kind(), ErrorKind::InvalidSignature) && !resolved.fresh => {
                tracing::debug!(target: "auth.jwt", kid = %kid, "signature mismatch on cached key, refreshing");
                if !self.jwks.refresh().await? {
                    return Err(err.into());
                }
                let key = self
                    .jwks
                    .cached_key(&kid)
                    .await
                    .ok_or(AuthError::InvalidToken("unknown signing key"))?;
                Ok(self.decode(token, &key)?)
            }
            other => Ok(other?),
        }
    }

    fn decode(
        &self,
        token: &str,
        key: &DecodingKey,
    ) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<AccessTokenClaims>(token, key, &self.validation)
            .map(|data| data.claims)
    }
}
