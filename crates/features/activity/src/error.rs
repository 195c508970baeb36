use std::borrow::Cow;

/// A specialized [`ActivityError`] enum of this crate.
#[remit_derive::remit_error]
pub enum ActivityError {
    /// A transfer leg was recorded without a usable counter-party.
    #[api(code = "INVALID_ARGUMENT", kind = BadRequest)]
    #[error("Invalid transaction reference: {message}")]
    InvalidReference { message: Cow<'static, str> },

    /// Free-form fields exceeded their storage bounds.
    #[api(code = "INVALID_ARGUMENT", kind = BadRequest)]
    #[error("Invalid activity: {message}")]
    Invalid { message: Cow<'static, str> },

    /// The backing store failed.
    #[error("Activity storage error{}: {message}", format_context(.context))]
    Storage { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal activity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
