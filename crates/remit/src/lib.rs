//! Facade crate for Remit features and shared modules.
//! Re-exports domain/kernel primitives and wires the feature slices to their storage.
//! Keep this crate thin: it composes other crates and holds no business rules.
//!
//! ## Usage
//! - Add `remit` with the `server` feature in binaries that expose the HTTP API.
//! - Call [`init`] once the database is connected and register the returned slices.

pub use remit_domain as domain;
pub use remit_kernel as kernel;

use remit_account::AccountError;
use remit_database::{Database, SurrealAccountRepository, SurrealActivityRepository};
use remit_domain::config::ApiConfig;
use remit_domain::registry::InitializedSlice;
use std::sync::Arc;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use remit_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use remit_account as account;
    pub use remit_activity as activity;

    /// Slices wired by [`crate::init`], in start-up order.
    pub const ENABLED: &[&str] = &["activity", "account"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Builds every feature slice on top of `database`.
///
/// The activity slice comes first because the account slice reads history through it.
///
/// # Errors
/// Returns [`AccountError::InvalidArgument`] when the `[account]` section holds an unusable
/// limit or fee rate.
pub fn init(config: &ApiConfig, database: &Database) -> Result<Vec<InitializedSlice>, AccountError> {
    let (activities, activity_slice) = features::activity::init(Arc::new(
        SurrealActivityRepository::new(database.clone()),
    ));

    let account_slice = features::account::init(
        &config.account,
        Arc::new(SurrealAccountRepository::new(database.clone())),
        activities,
    )?;

    let slices = vec![activity_slice, account_slice];
    tracing::info!(count = slices.len(), "Feature slices ready");
    Ok(slices)
}
