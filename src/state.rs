/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - per-audience token validators, directory proxy
 * - Cheap to Clone (everything inside is Arc)
 */
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{Validators, build_validators};
use crate::services::directory::{DirectoryProxy, HttpUserDirectory, UserDirectory};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Validators,
    pub directory: DirectoryProxy,
}

impl AppState {
    pub fn new(auth: Validators, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            auth,
            directory: DirectoryProxy::new(directory),
        }
    }

    /// Wire the production collaborators from configuration.
    ///
    /// One HTTP client is shared by the key fetcher and the directory client.
    pub fn from_config(config: &Config) -> Self {
        let http_client = reqwest::Client::new();
        let auth = build_validators(&config.auth, http_client.clone());
        let directory = HttpUserDirectory::new(
            config.directory.users_url.clone(),
            config.directory.page_size,
            http_client,
        );
        Self::new(auth, Arc::new(directory))
    }
}
