//! Bearer-token gated demo API with a read-only group directory proxy.
//!
//! - `services::auth` validates RS256 access tokens against the issuer's JWKS
//! - `services::directory` proxies group/user lookups to the remote directory
//! - `api` + `middleware` expose both over axum

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
