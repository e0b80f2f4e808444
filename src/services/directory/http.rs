//! `UserDirectory` backed by the identity provider's management HTTP API.
use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use super::{DirectoryError, DirectoryResult, DirectoryUser, UserDirectory};

/// Upper bound on pages walked in one lookup.
const MAX_PAGES: u32 = 1000;

/// Upstream error bodies are truncated to this many characters before logging.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Clone, Debug)]
pub struct HttpUserDirectory {
    users_url: Url,
    page_size: Option<u32>,
    http_client: reqwest::Client,
}

impl HttpUserDirectory {
    /// `page_size` enables `page`/`per_page` pagination; `None` issues a
    /// single plain request.
    pub fn new(users_url: Url, page_size: Option<u32>, http_client: reqwest::Client) -> Self {
        Self {
            users_url,
            page_size,
            http_client,
        }
    }

    async fn fetch_page(
        &self,
        bearer_token: &str,
        page: Option<(u32, u32)>,
    ) -> DirectoryResult<Vec<DirectoryUser>> {
        let mut request = self
            .http_client
            .get(self.users_url.clone())
            .bearer_auth(bearer_token);
        if let Some((page, per_page)) = page {
            request = request.query(&[("page", page), ("per_page", per_page)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response
            .json::<Vec<DirectoryUser>>()
            .await
            .map_err(|e| DirectoryError::Payload(e.to_string()))
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip_all, fields(url = %self.users_url))]
    async fn list_users(&self, bearer_token: &str) -> DirectoryResult<Vec<DirectoryUser>> {
        let Some(per_page) = self.page_size else {
            return self.fetch_page(bearer_token, None).await;
        };

        let mut users = Vec::new();
        for page in 0..MAX_PAGES {
            let batch = self.fetch_page(bearer_token, Some((page, per_page))).await?;
            let last = batch.len() < per_page as usize;
            users.extend(batch);
            if last {
                tracing::debug!(pages = page + 1, users = users.len(), "directory listing complete");
                return Ok(users);
            }
        }

        tracing::warn!(max_pages = MAX_PAGES, "directory listing truncated at page limit");
        Ok(users)
    }
}
