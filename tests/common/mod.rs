//! Shared harness: the full router wired against a wiremock server that plays
//! both the issuer's JWKS endpoint and the remote user directory.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Utc;
use group_directory_api::{app::build_router, config::Config, state::AppState};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PRIMARY_PEM: &str = include_str!("../../testdata/rsa_primary.pem");
pub const ROTATED_PEM: &str = include_str!("../../testdata/rsa_rotated.pem");
pub const PRIMARY_JWK: &str = include_str!("../../testdata/jwk_primary.json");
pub const ROTATED_JWK: &str = include_str!("../../testdata/jwk_rotated.json");
pub const PRIMARY_KID: &str = "test-key-primary";
pub const ROTATED_KID: &str = "test-key-rotated";

pub const ISSUER: &str = "https://tenant.example.com/";
pub const AUDIENCE: &str = "https://api.example.com";
pub const FORECAST_AUDIENCE: &str = "http://localhost:3000/external-api/weatherforecast";
pub const APP_ORIGIN: &str = "http://localhost:3000";

pub const JWKS_PATH: &str = "/.well-known/jwks.json";
pub const USERS_PATH: &str = "/api/v2/users";

pub struct TestApp {
    pub router: Router,
    pub server: MockServer,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let server = MockServer::start().await;
        mount_jwks(&server, &[PRIMARY_JWK]).await;

        let vars: HashMap<String, String> = [
            ("AUTH_DOMAIN", "tenant.example.com".to_string()),
            ("AUTH_ISSUER", ISSUER.to_string()),
            ("AUTH_AUDIENCE", AUDIENCE.to_string()),
            ("FORECAST_AUDIENCE", FORECAST_AUDIENCE.to_string()),
            ("AUTH_JWKS_URL", format!("{}{}", server.uri(), JWKS_PATH)),
            ("DIRECTORY_USERS_URL", format!("{}{}", server.uri(), USERS_PATH)),
            ("AUTH_LEEWAY_SECONDS", "0".to_string()),
            ("JWKS_MIN_REFRESH_SECONDS", "0".to_string()),
            ("APP_ORIGIN", APP_ORIGIN.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let config = Config::from_vars(&vars).expect("test config");
        let router = build_router(AppState::from_config(&config), &config);

        Self { router, server }
    }

    pub async fn get(&self, uri: &str, authorization: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> TestResponse {
        self.get(uri, Some(&format!("Bearer {token}"))).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Serve `users` from the directory endpoint.
    pub async fn directory_returns(&self, users: Value) {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(users))
            .mount(&self.server)
            .await;
    }

    pub async fn directory_fails(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(USERS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Requests the directory endpoint has seen so far.
    pub async fn directory_requests(&self) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == USERS_PATH)
            .collect()
    }
}

pub async fn mount_jwks(server: &MockServer, jwks: &[&str]) {
    let keys: Vec<Value> = jwks
        .iter()
        .map(|j| serde_json::from_str(j).unwrap())
        .collect();
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })))
        .mount(server)
        .await;
}

pub fn claims(audience: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": ISSUER,
        "sub": "auth0|tester",
        "aud": [audience, "https://tenant.example.com/userinfo"],
        "iat": now,
        "exp": now + 3600,
        "scope": "openid profile read:users",
    })
}

pub fn sign(pem: &str, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(kid.to_string());
    encode(
        &header,
        claims,
        &EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
    )
    .unwrap()
}

pub fn valid_token() -> String {
    sign(PRIMARY_PEM, PRIMARY_KID, &claims(AUDIENCE))
}
