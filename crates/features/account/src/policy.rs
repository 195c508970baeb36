use crate::error::AccountError;
use remit_kernel::domain::config::{AccountConfig, RetryConfig};
use remit_kernel::error::ErrorCode;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const BASIS_POINTS: i64 = 10_000;

/// Limits and fees applied to money movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountPolicy {
    daily_withdraw_limit: i64,
    daily_transfer_limit: i64,
    fee_basis_points: i64,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self { daily_withdraw_limit: 1_000_000, daily_transfer_limit: 3_000_000, fee_basis_points: 100 }
    }
}

impl AccountPolicy {
    /// # Errors
    /// Returns [`AccountError::InvalidArgument`] when a limit is not positive or the fee rate is
    /// outside `0..=1`.
    pub fn new(
        daily_withdraw_limit: i64,
        daily_transfer_limit: i64,
        transfer_fee_rate: f64,
    ) -> Result<Self, AccountError> {
        if daily_withdraw_limit <= 0 || daily_transfer_limit <= 0 {
            return Err(AccountError::invalid_argument("Daily limits must be greater than 0."));
        }
        if !(0.0..=1.0).contains(&transfer_fee_rate) {
            return Err(AccountError::invalid_argument(format!(
                "Transfer fee rate must be between 0 and 1: {transfer_fee_rate}"
            )));
        }

        // Rate is within 0..=1, so the product fits in i64.
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let fee_basis_points = (transfer_fee_rate * BASIS_POINTS as f64).round() as i64;

        Ok(Self { daily_withdraw_limit, daily_transfer_limit, fee_basis_points })
    }

    /// # Errors
    /// See [`AccountPolicy::new`].
    pub fn from_config(config: &AccountConfig) -> Result<Self, AccountError> {
        Self::new(config.limits.daily_withdraw, config.limits.daily_transfer, config.fees.transfer_rate)
    }

    #[must_use]
    pub const fn daily_withdraw_limit(&self) -> i64 {
        self.daily_withdraw_limit
    }

    #[must_use]
    pub const fn daily_transfer_limit(&self) -> i64 {
        self.daily_transfer_limit
    }

    /// Transfer fee for `amount`, rounded down.
    #[must_use]
    pub fn transfer_fee(&self, amount: i64) -> i64 {
        let fee = i128::from(amount) * i128::from(self.fee_basis_points) / i128::from(BASIS_POINTS);
        i64::try_from(fee).unwrap_or(i64::MAX)
    }
}

/// Re-runs a use case when it loses an optimistic-lock race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, initial_backoff: Duration::from_millis(50) }
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), initial_backoff }
    }

    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.initial_backoff_ms))
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op` until it succeeds, fails with a non-conflict error, or attempts run out.
    /// The delay doubles after every conflict.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, AccountError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AccountError>>,
    {
        let mut delay = self.initial_backoff;
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_conflict() && attempt < self.max_attempts => {
                    warn!(operation, attempt, ?delay, "Optimistic lock conflict, retrying...");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
