use super::rows::ActivityRow;
use crate::Database;
use crate::error::DatabaseErrorExt;
use async_trait::async_trait;
use remit_activity::{Activity, ActivityError, ActivityRepository};

const FIND_BY_ACCOUNT: &str = "SELECT seq, account_id, activity_type, amount, fee, balance_after,
        reference_account_id, reference_account_number, description, transaction_id, created_at
    FROM activity WHERE account_id = $account_id ORDER BY created_at DESC, seq DESC;";

/// Activities stored in the `activity` table. Rows are written by `fn::commit_ledger`.
#[derive(Debug, Clone)]
pub struct SurrealActivityRepository {
    db: Database,
}

impl SurrealActivityRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepository for SurrealActivityRepository {
    async fn find_by_account_id(&self, account_id: i64) -> Result<Vec<Activity>, ActivityError> {
        let rows = self
            .db
            .query(FIND_BY_ACCOUNT)
            .bind(("account_id", account_id))
            .await
            .context("Loading activities")?
            .take::<Vec<ActivityRow>>(0)
            .context("Parsing activities")?;

        Ok(rows.into_iter().map(Activity::try_from).collect::<Result<Vec<_>, _>>()?)
    }
}
