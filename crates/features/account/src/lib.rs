//! Accounts feature slice.
//!
//! Registration, soft deletion, deposits, withdrawals and fee-charging transfers. Every
//! balance change is committed together with its activity records under an optimistic lock,
//! and use cases that lose the race are retried by [`RetryPolicy`].

mod clock;
mod error;
mod limit;
mod model;
mod policy;
mod repository;
mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AccountError, AccountErrorExt};
pub use limit::DailyLimitTracker;
pub use model::{
    ACCOUNT_NAME_MAX_LEN, ACCOUNT_NUMBER_MAX_LEN, ACCOUNT_NUMBER_MIN_LEN, Account, NewAccount,
    TransferResult,
};
pub use policy::{AccountPolicy, RetryPolicy};
pub use repository::AccountRepository;
pub use service::{AccountService, AccountServiceBuilder, AccountServiceInner};

use remit_activity::ActivityService;
use remit_kernel::domain::config::AccountConfig;
use remit_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Initialize the account feature.
///
/// # Errors
/// Returns [`AccountError::InvalidArgument`] if the configured limits or fee rate are invalid.
pub fn init(
    config: &AccountConfig,
    repository: Arc<dyn AccountRepository>,
    activities: ActivityService,
) -> Result<InitializedSlice, AccountError> {
    let policy = AccountPolicy::from_config(config)?;
    let retry = RetryPolicy::from_config(&config.retry);

    let slice = AccountService::builder(repository, activities).policy(policy).retry(retry).build();

    tracing::info!(
        daily_withdraw_limit = policy.daily_withdraw_limit(),
        daily_transfer_limit = policy.daily_transfer_limit(),
        max_attempts = retry.max_attempts(),
        "Account slice initialized"
    );
    Ok(slice.into_initialized())
}
