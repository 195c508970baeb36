use crate::error::AccountError;
use chrono::NaiveDate;

/// Running total of one kind of outflow for the current day.
///
/// The limit itself comes from [`crate::AccountPolicy`] and is never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyLimitTracker {
    accumulated: i64,
    last_transaction_date: Option<NaiveDate>,
}

impl DailyLimitTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { accumulated: 0, last_transaction_date: None }
    }

    /// Rebuilds a tracker from stored state.
    #[must_use]
    pub const fn restore(accumulated: i64, last_transaction_date: Option<NaiveDate>) -> Self {
        Self { accumulated, last_transaction_date }
    }

    /// Stored total, regardless of the day it belongs to.
    #[must_use]
    pub const fn accumulated(&self) -> i64 {
        self.accumulated
    }

    #[must_use]
    pub const fn last_transaction_date(&self) -> Option<NaiveDate> {
        self.last_transaction_date
    }

    /// Usage counted against `today`. A total from an earlier day counts as zero.
    #[must_use]
    pub fn accumulated_on(&self, today: NaiveDate) -> i64 {
        if self.last_transaction_date == Some(today) { self.accumulated } else { 0 }
    }

    /// Adds `amount` to today's total. The tracker is left untouched on failure.
    ///
    /// # Errors
    /// [`AccountError::InvalidArgument`] for a non-positive amount, otherwise the error built by
    /// `exceeded` when the new total would pass `limit`.
    pub fn track(
        &mut self,
        amount: i64,
        limit: i64,
        today: NaiveDate,
        exceeded: impl FnOnce(i64) -> AccountError,
    ) -> Result<(), AccountError> {
        if amount <= 0 {
            return Err(AccountError::invalid_argument("Amount must be greater than 0."));
        }

        let total = self.accumulated_on(today).checked_add(amount).filter(|total| *total <= limit);
        let Some(total) = total else {
            return Err(exceeded(limit));
        };

        self.accumulated = total;
        self.last_transaction_date = Some(today);
        Ok(())
    }
}
