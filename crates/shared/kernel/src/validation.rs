//! Declarative checks for incoming payloads.
//!
//! ```rust
//! use remit_kernel::validation::{Validate, Violations};
//!
//! struct Deposit { account_number: String, amount: Option<i64> }
//!
//! impl Validate for Deposit {
//!     fn check(&self, v: &mut Violations) {
//!         v.not_blank(&self.account_number, "Account number is required.");
//!         v.min(self.amount, 1, "Amount must be greater than 0.");
//!     }
//! }
//!
//! let err = Deposit { account_number: " ".into(), amount: Some(0) }.validate().unwrap_err();
//! assert_eq!(err.to_string(), "Account number is required., Amount must be greater than 0.");
//! ```

use std::borrow::Cow;

/// Errors raised before a request reaches the domain.
#[remit_derive::remit_error]
pub enum RequestError {
    /// One or more field constraints failed; messages are joined with `", "`.
    #[api(code = "VALIDATION_ERROR", kind = BadRequest)]
    #[error("{message}")]
    Validation { message: Cow<'static, str> },

    /// A value was well-formed but unacceptable (e.g. an out of range page size).
    #[api(code = "INVALID_ARGUMENT", kind = BadRequest)]
    #[error("{message}")]
    InvalidArgument { message: Cow<'static, str> },
}

/// A payload that can check its own field constraints.
pub trait Validate {
    /// Records every violated constraint.
    fn check(&self, violations: &mut Violations);

    /// Runs [`Validate::check`] and folds the result.
    ///
    /// # Errors
    /// Returns [`RequestError::Validation`] listing every violation in declaration order.
    fn validate(&self) -> Result<(), RequestError> {
        let mut violations = Violations::default();
        self.check(&mut violations);
        violations.into_result()
    }
}

/// Collected constraint messages.
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<Cow<'static, str>>,
}

impl Violations {
    pub fn push(&mut self, message: impl Into<Cow<'static, str>>) {
        self.messages.push(message.into());
    }

    /// Fails when the value is empty or whitespace only.
    pub fn not_blank(&mut self, value: &str, message: &'static str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(message);
        }
        self
    }

    /// Fails when a non-blank value has a character count outside `min..=max`.
    /// Blank values are left to [`Violations::not_blank`].
    pub fn length(&mut self, value: &str, min: usize, max: usize, message: &'static str) -> &mut Self {
        let len = value.chars().count();
        if !value.trim().is_empty() && !(min..=max).contains(&len) {
            self.push(message);
        }
        self
    }

    /// Fails when the value is missing or below `min`.
    pub fn min(&mut self, value: Option<i64>, min: i64, message: &'static str) -> &mut Self {
        if value.is_none_or(|v| v < min) {
            self.push(message);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// # Errors
    /// Returns [`RequestError::Validation`] when at least one message was recorded.
    pub fn into_result(self) -> Result<(), RequestError> {
        if self.messages.is_empty() {
            return Ok(());
        }
        Err(RequestError::Validation { message: self.messages.join(", ").into() })
    }
}
