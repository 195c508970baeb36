use crate::error::AccountError;
use crate::model::{Account, NewAccount};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use remit_activity::NewActivity;
use remit_kernel::pagination::{Page, PageRequest};
use std::fmt::Debug;

/// Storage port for accounts.
#[async_trait]
pub trait AccountRepository: Debug + Send + Sync {
    /// Looks up a live account. Deleted accounts are never returned.
    async fn find_by_number(&self, account_number: &str) -> Result<Option<Account>, AccountError>;

    /// Whether the number was ever registered, deleted accounts included.
    async fn exists_by_number(&self, account_number: &str) -> Result<bool, AccountError>;

    /// Stores a new account with a freshly assigned id.
    ///
    /// Returns [`AccountError::Duplicate`] when the number was taken concurrently.
    async fn insert(&self, account: &NewAccount, now: DateTime<Utc>) -> Result<Account, AccountError>;

    /// Live accounts ordered by id.
    async fn find_page(&self, request: PageRequest) -> Result<Page<Account>, AccountError>;

    /// Persists `accounts` and appends `activities` in a single transaction.
    ///
    /// Each account is written only if its stored version still equals `account.version`;
    /// otherwise nothing is written and [`AccountError::Conflict`] is returned. On success the
    /// accounts are returned in the given order with their new versions.
    async fn commit(
        &self,
        accounts: &[Account],
        activities: &[NewActivity],
    ) -> Result<Vec<Account>, AccountError>;
}
