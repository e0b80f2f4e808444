use std::sync::Arc;

use tracing::instrument;

use super::groups::{distinct_groups, users_in_group};
use super::{DirectoryResult, DirectoryUser, UserDirectory};

/// Fetch-then-aggregate lookups behind the `/groups` routes.
///
/// Each call performs its own full fetch; concurrent identical queries are
/// not coalesced.
#[derive(Clone)]
pub struct DirectoryProxy {
    directory: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for DirectoryProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryProxy")
            .field("backend", &self.directory.backend_name())
            .finish()
    }
}

impl DirectoryProxy {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    #[instrument(skip_all, fields(backend = self.directory.backend_name()))]
    pub async fn list_groups(&self, bearer_token: &str) -> DirectoryResult<Vec<String>> {
        let users = self.directory.list_users(bearer_token).await?;
        let groups = distinct_groups(&users);
        tracing::debug!(users = users.len(), groups = groups.len(), "aggregated groups");
        Ok(groups)
    }

    #[instrument(skip(self, bearer_token), fields(backend = self.directory.backend_name()))]
    pub async fn list_group_users(
        &self,
        bearer_token: &str,
        group_id: &str,
    ) -> DirectoryResult<Vec<DirectoryUser>> {
        let users = self.directory.list_users(bearer_token).await?;
        let members = users_in_group(users, group_id);
        tracing::debug!(members = members.len(), "filtered group members");
        Ok(members)
    }
}
