use crate::error::ActivityError;
use crate::model::Activity;
use async_trait::async_trait;
use std::fmt::Debug;

/// Read side of the activity ledger.
///
/// Activities are written together with the balance change that produced them, so the write
/// path lives on the account repository.
#[async_trait]
pub trait ActivityRepository: Debug + Send + Sync {
    /// Every activity of the account, newest first. Ties on `created_at` are broken by the
    /// higher id first.
    async fn find_by_account_id(&self, account_id: i64) -> Result<Vec<Activity>, ActivityError>;
}
