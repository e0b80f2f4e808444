/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - The access middleware verifies the token and stores this in request extensions
 *
 * Notes
 * - JWT verification itself belongs to services::auth
 */
use crate::services::auth::AccessTokenClaims;

/// Context attached to every request admitted by a validator.
///
/// - `subject` is the token's `sub` (absent for some machine tokens)
/// - `scopes` / `permissions` are coarse-grained grants as issued
/// - `validator` names the validator (audience) that admitted the request
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: Option<String>,
    pub scopes: Vec<String>,
    pub permissions: Vec<String>,
    pub audiences: Vec<String>,
    pub validator: &'static str,
}

impl AuthCtx {
    pub fn from_claims(claims: &AccessTokenClaims, validator: &'static str) -> Self {
        Self {
            subject: claims.sub.clone(),
            scopes: claims.scopes(),
            permissions: claims.permissions.clone().unwrap_or_default(),
            audiences: claims.audiences(),
            validator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn built_from_claims() {
        let claims: AccessTokenClaims = serde_json::from_value(json!({
            "iss": "https://tenant.example.com/",
            "sub": "auth0|abc",
            "aud": "https://api.example.com",
            "exp": 4102444800u64,
            "scope": "read:groups read:users",
            "permissions": ["read:groups"]
        }))
        .unwrap();

        let ctx = AuthCtx::from_claims(&claims, "directory");
        assert_eq!(ctx.subject.as_deref(), Some("auth0|abc"));
        assert_eq!(ctx.scopes, ["read:groups", "read:users"]);
        assert_eq!(ctx.permissions, ["read:groups"]);
        assert_eq!(ctx.audiences, ["https://api.example.com"]);
        assert_eq!(ctx.validator, "directory");
    }
}
