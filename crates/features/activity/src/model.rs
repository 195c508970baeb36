use crate::error::ActivityError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest description stored with an activity.
pub const MAX_DESCRIPTION_LEN: usize = 200;
/// Longest transaction id stored with an activity.
pub const MAX_TRANSACTION_ID_LEN: usize = 50;

/// What happened to the balance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub enum ActivityType {
    Deposit,
    Withdraw,
    TransferOut,
    TransferIn,
}

/// The other side of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReference {
    account_id: i64,
    account_number: String,
}

impl TransactionReference {
    /// # Errors
    /// Returns [`ActivityError::InvalidReference`] when the account number is blank.
    pub fn new(account_id: i64, account_number: impl Into<String>) -> Result<Self, ActivityError> {
        let account_number = account_number.into();
        if account_number.trim().is_empty() {
            return Err(ActivityError::InvalidReference {
                message: "reference account number is required".into(),
            });
        }
        Ok(Self { account_id, account_number })
    }

    #[must_use]
    pub const fn account_id(&self) -> i64 {
        self.account_id
    }

    #[must_use]
    pub fn account_number(&self) -> &str {
        &self.account_number
    }
}

/// A recorded balance change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: i64,
    pub account_id: i64,
    pub activity_type: ActivityType,
    pub amount: i64,
    pub fee: i64,
    pub balance_after: i64,
    pub reference: Option<TransactionReference>,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An activity that has not been stored yet. Storage assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub account_id: i64,
    pub activity_type: ActivityType,
    pub amount: i64,
    pub fee: i64,
    pub balance_after: i64,
    pub reference: Option<TransactionReference>,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewActivity {
    const fn plain(
        account_id: i64,
        activity_type: ActivityType,
        amount: i64,
        balance_after: i64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            activity_type,
            amount,
            fee: 0,
            balance_after,
            reference: None,
            description: None,
            transaction_id: None,
            created_at: at,
        }
    }

    #[must_use]
    pub const fn deposit(account_id: i64, amount: i64, balance_after: i64, at: DateTime<Utc>) -> Self {
        Self::plain(account_id, ActivityType::Deposit, amount, balance_after, at)
    }

    #[must_use]
    pub const fn withdraw(account_id: i64, amount: i64, balance_after: i64, at: DateTime<Utc>) -> Self {
        Self::plain(account_id, ActivityType::Withdraw, amount, balance_after, at)
    }

    /// Sender leg: carries the fee and points at the recipient.
    #[must_use]
    pub fn transfer_out(
        account_id: i64,
        recipient: TransactionReference,
        amount: i64,
        fee: i64,
        balance_after: i64,
        transaction_id: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            fee,
            reference: Some(recipient),
            transaction_id: Some(transaction_id.into()),
            ..Self::plain(account_id, ActivityType::TransferOut, amount, balance_after, at)
        }
    }

    /// Recipient leg: no fee, points at the sender.
    #[must_use]
    pub fn transfer_in(
        account_id: i64,
        sender: TransactionReference,
        amount: i64,
        balance_after: i64,
        transaction_id: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            reference: Some(sender),
            transaction_id: Some(transaction_id.into()),
            ..Self::plain(account_id, ActivityType::TransferIn, amount, balance_after, at)
        }
    }

    /// # Errors
    /// Returns [`ActivityError::Invalid`] when the description is longer than
    /// [`MAX_DESCRIPTION_LEN`] characters.
    pub fn with_description(mut self, description: impl Into<String>) -> Result<Self, ActivityError> {
        let description = description.into();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ActivityError::Invalid {
                message: format!("description exceeds {MAX_DESCRIPTION_LEN} characters").into(),
            });
        }
        self.description = Some(description);
        Ok(self)
    }

    /// Checks storage bounds before the activity is persisted.
    ///
    /// # Errors
    /// Returns [`ActivityError::Invalid`] for a non-positive amount, a negative fee, or an
    /// oversized transaction id.
    pub fn ensure_valid(&self) -> Result<(), ActivityError> {
        if self.amount <= 0 || self.fee < 0 {
            return Err(ActivityError::Invalid {
                message: format!("amount {} and fee {} must be positive", self.amount, self.fee)
                    .into(),
            });
        }
        if self.transaction_id.as_ref().is_some_and(|id| id.len() > MAX_TRANSACTION_ID_LEN) {
            return Err(ActivityError::Invalid {
                message: format!("transaction id exceeds {MAX_TRANSACTION_ID_LEN} characters").into(),
            });
        }
        Ok(())
    }

    /// Attaches the storage assigned id.
    #[must_use]
    pub fn into_activity(self, id: i64) -> Activity {
        Activity {
            id,
            account_id: self.account_id,
            activity_type: self.activity_type,
            amount: self.amount,
            fee: self.fee,
            balance_after: self.balance_after,
            reference: self.reference,
            description: self.description,
            transaction_id: self.transaction_id,
            created_at: self.created_at,
        }
    }
}
