use remit_activity::ActivityError;
use std::borrow::Cow;

/// A specialized [`AccountError`] enum of this crate.
#[remit_derive::remit_error]
pub enum AccountError {
    #[api(code = "ACCOUNT_001", kind = NotFound)]
    #[error("Account not found: {account_number}")]
    NotFound { account_number: String },

    #[api(code = "ACCOUNT_002", kind = BadRequest)]
    #[error("Account number already exists: {account_number}")]
    Duplicate { account_number: String },

    #[api(code = "ACCOUNT_003", kind = BadRequest)]
    #[error("Invalid account name: {message}")]
    InvalidName { message: Cow<'static, str> },

    #[api(code = "ACCOUNT_004", kind = BadRequest)]
    #[error("Insufficient balance: {balance} available, {required} required")]
    InsufficientBalance { balance: i64, required: i64 },

    #[api(code = "ACCOUNT_005", kind = BadRequest)]
    #[error("Daily withdraw limit exceeded ({limit} KRW)")]
    WithdrawLimitExceeded { limit: i64 },

    #[api(code = "ACCOUNT_006", kind = BadRequest)]
    #[error("Daily transfer limit exceeded ({limit} KRW)")]
    TransferLimitExceeded { limit: i64 },

    #[api(code = "ACCOUNT_007", kind = BadRequest)]
    #[error("Cannot transfer to the same account: {account_number}")]
    SameAccount { account_number: String },

    /// Arguments the domain refuses outright (bad account number, non-positive amount).
    #[api(code = "INVALID_ARGUMENT", kind = BadRequest)]
    #[error("{message}")]
    InvalidArgument { message: Cow<'static, str> },

    /// Another writer updated the account first and retries ran out.
    #[api(code = "OPTIMISTIC_LOCK_CONFLICT", kind = Conflict)]
    #[error("Account was modified concurrently{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[api(transparent)]
    #[error("Activity error{}: {source}", format_context(.context))]
    Activity { source: ActivityError, context: Option<Cow<'static, str>> },

    /// The backing store failed.
    #[error("Account storage error{}: {message}", format_context(.context))]
    Storage { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal account error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AccountError {
    pub(crate) fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }
}
