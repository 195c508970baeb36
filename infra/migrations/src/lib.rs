//! # Schema Migrations
//!
//! Versioned SurrealQL scripts compiled into the binary. Each script is identified by its file
//! stem (`0001-accounts`) and fingerprinted with SHA-256 so that an edited, already-applied
//! script is detected at startup instead of silently diverging.
//!
//! Scripts must not manage transactions themselves: the runner in `remit-database` wraps every
//! script in its own transaction together with the bookkeeping record.
//!
//! ```rust
//! let migrations = remit_migrations::builtin_migrations().unwrap();
//! assert_eq!(migrations[0].version(), "0001-accounts");
//! assert_eq!(migrations[0].checksum().len(), 64);
//! ```

use sha2::{Digest, Sha256};
use std::borrow::Cow;

/// Scripts in execution order.
const SCRIPTS: &[(&str, &str)] = &[
    ("0001-accounts", include_str!("../migrations/0001-accounts.surql")),
    ("0002-activities", include_str!("../migrations/0002-activities.surql")),
    ("0003-ledger-functions", include_str!("../migrations/0003-ledger-functions.surql")),
];

/// A specialized [`MigrationError`] enum of this crate.
#[remit_derive::remit_error]
pub enum MigrationError {
    /// The manifest itself is malformed.
    #[error("Invalid migration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// One embedded migration script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    version: &'static str,
    script: &'static str,
    checksum: String,
}

impl Migration {
    /// Validates the script and computes its checksum.
    ///
    /// # Errors
    /// Returns [`MigrationError::Invalid`] if the version is not `0000-name` shaped or the script
    /// controls transactions.
    pub fn new(version: &'static str, script: &'static str) -> Result<Self, MigrationError> {
        validate_version(version)?;
        validate_script(version, script)?;
        Ok(Self { version, script, checksum: checksum(script) })
    }

    #[must_use]
    pub const fn version(&self) -> &'static str {
        self.version
    }

    #[must_use]
    pub const fn script(&self) -> &'static str {
        self.script
    }

    /// Lower-case hex SHA-256 of the script text.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

/// All migrations shipped with this build, in execution order.
///
/// # Errors
/// Returns [`MigrationError::Invalid`] if a script is malformed or versions are out of order.
pub fn builtin_migrations() -> Result<Vec<Migration>, MigrationError> {
    let migrations = SCRIPTS
        .iter()
        .map(|&(version, script)| Migration::new(version, script))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(pair) = migrations.windows(2).find(|pair| pair[0].version >= pair[1].version) {
        return Err(MigrationError::Invalid {
            message: format!("{} must sort before {}", pair[0].version, pair[1].version).into(),
            context: Some("Checking migration order".into()),
        });
    }

    Ok(migrations)
}

fn checksum(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    hex::encode(hasher.finalize())
}

fn validate_version(version: &str) -> Result<(), MigrationError> {
    let prefix = version.split_once('-').map(|(prefix, _)| prefix);
    if prefix.is_none_or(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return Err(MigrationError::Invalid {
            message: format!("expected '0000-name', got '{version}'").into(),
            context: None,
        });
    }
    Ok(())
}

fn validate_script(version: &str, script: &str) -> Result<(), MigrationError> {
    let lowered = script.to_lowercase();
    if lowered.contains("begin transaction") || lowered.contains("commit transaction") {
        return Err(MigrationError::Invalid {
            message: "manual transaction control is not allowed".into(),
            context: Some(Cow::Owned(version.to_owned())),
        });
    }
    Ok(())
}
