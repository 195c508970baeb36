use remit_account::AccountError;
use remit_activity::ActivityError;
use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[remit_derive::remit_error]
pub enum DatabaseError {
    /// Validation errors.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when connectivity or health checks fail.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when root sign-in fails.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Migration failures or invariant violations.
    #[error("Migration error{}: {message}", format_context(.context))]
    Migration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A stored row could not be mapped back to the domain.
    #[error("Corrupt row{}: {message}", format_context(.context))]
    Mapping { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<remit_migrations::MigrationError> for DatabaseError {
    fn from(err: remit_migrations::MigrationError) -> Self {
        Self::Migration { message: err.to_string().into(), context: None }
    }
}

impl From<DatabaseError> for AccountError {
    fn from(err: DatabaseError) -> Self {
        Self::Storage { message: err.to_string().into(), context: None }
    }
}

impl From<DatabaseError> for ActivityError {
    fn from(err: DatabaseError) -> Self {
        Self::Storage { message: err.to_string().into(), context: None }
    }
}
