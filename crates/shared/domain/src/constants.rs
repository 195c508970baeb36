//! Names shared between the HTTP surface, the `OpenAPI` document and storage.

/// `OpenAPI` tag for health and diagnostics endpoints.
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for account management endpoints.
pub const ACCOUNT_TAG: &str = "Accounts";
/// `OpenAPI` tag for deposit, withdraw and transfer endpoints.
pub const TRANSACTION_TAG: &str = "Transactions";
/// `OpenAPI` tag for activity history endpoints.
pub const ACTIVITY_TAG: &str = "Activities";

/// Environment variable prefix for configuration overrides (`REMIT__SECTION__KEY`).
pub const ENV_PREFIX: &str = "REMIT";
/// Default configuration file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "server";

/// Prefix of generated transfer transaction ids.
pub const TRANSACTION_ID_PREFIX: &str = "TX_";
