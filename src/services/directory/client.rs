//! Directory client interface used by the proxy.
use async_trait::async_trait;
use thiserror::Error;

use super::DirectoryUser;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory failures. The detail is for logs only; handlers answer with a
/// fixed message.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory transport error: {0}")]
    Transport(String),
    #[error("directory returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("directory payload error: {0}")]
    Payload(String),
}

/// Source of directory users.
///
/// Implementations fetch the complete collection on every call; nothing is
/// cached between requests.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Fetch every user, authenticating with the caller's bearer token.
    async fn list_users(&self, bearer_token: &str) -> DirectoryResult<Vec<DirectoryUser>>;
}
