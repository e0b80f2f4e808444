/*
 * Responsibility
 * - Read-only lookups against the remote user directory (identity provider management API)
 * - The caller's bearer token is forwarded as the directory credential, never stored
 * - Membership normalization happens once, when records are ingested (see `user`)
 */
pub mod client;
pub mod groups;
pub mod http;
pub mod proxy;
pub mod user;

pub use client::{DirectoryError, DirectoryResult, UserDirectory};
pub use http::HttpUserDirectory;
pub use proxy::DirectoryProxy;
pub use user::DirectoryUser;
