use crate::error::{ActivityError, ActivityErrorExt};
use crate::model::Activity;
use crate::repository::ActivityRepository;
use std::sync::Arc;
use tracing::debug;

/// Activity feature state.
#[remit_derive::remit_slice]
pub struct ActivityService {
    repository: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    #[must_use]
    pub fn with_repository(repository: Arc<dyn ActivityRepository>) -> Self {
        Self::new(ActivityServiceInner { repository })
    }

    /// Transaction history of an account, newest first.
    ///
    /// # Errors
    /// Returns [`ActivityError::Storage`] when the history cannot be read.
    pub async fn history(&self, account_id: i64) -> Result<Vec<Activity>, ActivityError> {
        let activities = self
            .repository
            .find_by_account_id(account_id)
            .await
            .context(format!("history of account {account_id}"))?;
        debug!(account_id, count = activities.len(), "Loaded activity history");
        Ok(activities)
    }
}
