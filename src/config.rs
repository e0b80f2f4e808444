/*
 * Responsibility
 * - Load settings from the environment (.env included) exactly once at startup
 * - Validate them (missing issuer domain / audience aborts startup)
 * - Derive issuer, JWKS and directory URLs from the tenant domain when not overridden
 */
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Audience placeholder shipped by provider quickstart downloads.
const AUDIENCE_PLACEHOLDER: &str = "YOUR_API_IDENTIFIER";

const DEFAULT_API_PORT: u16 = 3001;
const DEFAULT_APP_PORT: u16 = 3000;
const DEFAULT_FORECAST_AUDIENCE: &str = "http://localhost:3000/external-api/weatherforecast";
const DEFAULT_LEEWAY_SECONDS: u64 = 5;
const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 600;
const DEFAULT_JWKS_MIN_REFRESH_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Browser origins allowed to call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `APP_ORIGIN=*`
    Any,
    List(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("configuration still holds the quickstart placeholder: {0}")]
    Placeholder(&'static str),
}

/// Token validation settings shared by every validator instance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub jwks_url: Url,
    pub external_audience: String,
    pub forecast_audience: String,
    pub directory_audience: String,
    pub leeway_seconds: u64,
    pub jwks_cache_ttl: Duration,
    pub jwks_min_refresh_interval: Duration,
}

/// Remote user directory settings.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub users_url: Url,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_origins: AllowedOrigins,
    pub static_dir: Option<PathBuf>,
    pub auth: AuthConfig,
    pub directory: DirectoryConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let port = match get("API_PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Invalid("API_PORT"))?,
            None => DEFAULT_API_PORT,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(get("APP_ENV"));

        let domain = get("AUTH_DOMAIN").ok_or(ConfigError::Missing("AUTH_DOMAIN"))?;
        let domain = domain
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();

        let external_audience = get("AUTH_AUDIENCE")
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?
            .to_string();
        if external_audience == AUDIENCE_PLACEHOLDER {
            return Err(ConfigError::Placeholder("AUTH_AUDIENCE"));
        }

        let issuer = match get("AUTH_ISSUER") {
            Some(v) => parse_url(v, "AUTH_ISSUER")?.to_string(),
            None => parse_url(&format!("https://{domain}/"), "AUTH_DOMAIN")?.to_string(),
        };

        let jwks_url = match get("AUTH_JWKS_URL") {
            Some(v) => parse_url(v, "AUTH_JWKS_URL")?,
            None => {
                // `join` replaces the last path segment unless the base ends in '/'.
                let mut base = parse_url(&issuer, "AUTH_ISSUER")?;
                if !base.path().ends_with('/') {
                    let path = format!("{}/", base.path());
                    base.set_path(&path);
                }
                base.join(".well-known/jwks.json")
                    .map_err(|_| ConfigError::Invalid("AUTH_ISSUER"))?
            }
        };

        let forecast_audience = get("FORECAST_AUDIENCE")
            .unwrap_or(DEFAULT_FORECAST_AUDIENCE)
            .to_string();
        let directory_audience = get("DIRECTORY_AUDIENCE")
            .map(str::to_string)
            .unwrap_or_else(|| external_audience.clone());

        let leeway_seconds = parse_or("AUTH_LEEWAY_SECONDS", get, DEFAULT_LEEWAY_SECONDS)?;
        let jwks_cache_ttl = Duration::from_secs(parse_or(
            "JWKS_CACHE_TTL_SECONDS",
            get,
            DEFAULT_JWKS_CACHE_TTL_SECONDS,
        )?);
        let jwks_min_refresh_interval = Duration::from_secs(parse_or(
            "JWKS_MIN_REFRESH_SECONDS",
            get,
            DEFAULT_JWKS_MIN_REFRESH_SECONDS,
        )?);

        let users_url = match get("DIRECTORY_USERS_URL") {
            Some(v) => parse_url(v, "DIRECTORY_USERS_URL")?,
            None => parse_url(&format!("https://{domain}/api/v2/users"), "AUTH_DOMAIN")?,
        };
        let page_size = match get("DIRECTORY_PAGE_SIZE") {
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(ConfigError::Invalid("DIRECTORY_PAGE_SIZE")),
            },
            None => None,
        };

        let app_port = match get("APP_PORT") {
            Some(_) => parse_or("APP_PORT", get, DEFAULT_APP_PORT)?,
            None => parse_or("PORT", get, DEFAULT_APP_PORT)?,
        };
        let cors_origins = match get("APP_ORIGIN") {
            Some(v) => parse_origins(v)?,
            None => AllowedOrigins::List(vec![format!("http://localhost:{app_port}")]),
        };

        let static_dir = get("STATIC_DIR").map(PathBuf::from);

        Ok(Self {
            addr,
            app_env,
            cors_origins,
            static_dir,
            auth: AuthConfig {
                issuer,
                jwks_url,
                external_audience,
                forecast_audience,
                directory_audience,
                leeway_seconds,
                jwks_cache_ttl,
                jwks_min_refresh_interval,
            },
            directory: DirectoryConfig {
                users_url,
                page_size,
            },
        })
    }
}

fn parse_url(value: &str, key: &'static str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|_| ConfigError::Invalid(key))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::Invalid(key)),
    }
}

fn parse_origins(value: &str) -> Result<AllowedOrigins, ConfigError> {
    let origins: Vec<String> = value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if origins.iter().any(|o| o == "*") {
        // a wildcard mixed with explicit origins is almost certainly a typo
        return match origins.len() {
            1 => Ok(AllowedOrigins::Any),
            _ => Err(ConfigError::Invalid("APP_ORIGIN")),
        };
    }
    if origins
        .iter()
        .any(|o| axum::http::HeaderValue::from_str(o).is_err())
    {
        return Err(ConfigError::Invalid("APP_ORIGIN"));
    }
    Ok(AllowedOrigins::List(origins))
}

fn parse_or<'a, T, F>(key: &'static str, get: F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<&'a str>,
{
    match get(key) {
        Some(v) => v.parse::<T>().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
