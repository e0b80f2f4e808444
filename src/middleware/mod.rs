/*
 * Responsibility
 * - Middleware public interface (re-exports)
 * - auth::access (per-route token validation), cors, http, security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
