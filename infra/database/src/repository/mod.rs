//! `SurrealDB` adapters for the feature slice repository ports.

mod account;
mod activity;
mod rows;

pub use account::SurrealAccountRepository;
pub use activity::SurrealActivityRepository;

/// Raised by `fn::register_account`.
const DUPLICATE_MARKER: &str = "DUPLICATE_ACCOUNT";
/// Raised by `fn::commit_ledger`.
const CONFLICT_MARKER: &str = "OPTIMISTIC_LOCK_CONFLICT";
/// Unique index guarding account numbers against concurrent registration.
const ACCOUNT_NUMBER_INDEX: &str = "account_number_idx";

/// Phrases the engine uses when a transaction lost a write race and may be replayed.
const RETRYABLE_PHRASES: [&str; 2] = ["Transaction conflict", "can be retried"];

/// Whether a statement failed with a `THROW`n marker or a violated index named `marker`.
fn raised(err: &surrealdb::Error, marker: &str) -> bool {
    err.to_string().contains(marker)
}

/// Whether the engine aborted the transaction because a concurrent writer committed first.
fn retryable(err: &surrealdb::Error) -> bool {
    is_retryable_message(&err.to_string())
}

fn is_retryable_message(message: &str) -> bool {
    RETRYABLE_PHRASES.iter().any(|phrase| message.contains(phrase))
}
