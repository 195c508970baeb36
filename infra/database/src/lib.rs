//! # Database Infrastructure
//!
//! This crate provides a unified interface for initializing and managing [SurrealDB](https://surrealdb.com)
//! connections, applies the embedded schema migrations, and implements the storage ports of the
//! account and activity slices.
//!
//! ## Key Features
//! - **Engine Agnostic**: Supports `mem://`, `rocksdb://`, `ws://`, and `http://` via the `any` engine.
//! - **Resilient Connectivity**: Built-in retry logic for health checks during engine startup.
//! - **Builder Pattern**: Fluent API for configuring connections and authentication.
//! - **Migrations on Connect**: Pending scripts from `remit-migrations` run before the handle is returned.
//!
//! ## Example
//!
//! ```rust
//! use remit_database::{Database, DatabaseError, SurrealAccountRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("remit", "ledger")
//!         .init()
//!         .await?;
//!
//!     let _accounts = SurrealAccountRepository::new(db.clone());
//!     let _version = db.version().await?;
//!
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;
mod repository;

pub use error::{DatabaseError, DatabaseErrorExt};
use migrations::MigrationRunner;
use remit_kernel::domain::config::DatabaseConfig;
pub use repository::{SurrealAccountRepository, SurrealActivityRepository};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, trace, warn};

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// `SurrealDB` client wrapper that provides thread-safety and contextual error handling.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Active namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    /// Active database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// Collects connection settings for [`Database`].
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefills every setting from the `[database]` config section.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let builder = Self::new().url(&config.url).session(&config.namespace, &config.database);
        match &config.credentials {
            Some(c) => builder.auth(&c.username, &c.password),
            None => builder,
        }
    }

    /// Engine address, e.g. `mem://`, `rocksdb://data/remit` or `ws://db:8000`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Root credentials, used for remote engines.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Connects, waits for the engine to become healthy, signs in, selects the session and
    /// applies pending migrations.
    ///
    /// The health probe runs at most [`HEALTH_ATTEMPTS`] times, sleeping 500 ms after the first
    /// failure and doubling the delay each time.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] when url, namespace or database is missing.
    /// * [`DatabaseError::Connection`] when the engine cannot start or never reports healthy.
    /// * [`DatabaseError::Auth`] when the credentials are rejected.
    /// * [`DatabaseError::Migration`] when an applied script was edited or a script fails.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = required(self.url, "URL")?;
        let ns = required(self.ns, "Namespace")?;
        let db = required(self.db, "Database")?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Starting engine".into()),
        })?;

        wait_until_healthy(&instance, &url).await?;

        if let Some((username, password)) = self.auth {
            instance.signin(Root { username, password }).await.map_err(|e| DatabaseError::Auth {
                message: e.to_string().into(),
                context: Some(url.clone().into()),
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Selecting namespace and database")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB connection established");

        let report = MigrationRunner::new(instance.clone()).run().await?;
        for skipped in &report.skipped {
            trace!(version = skipped.version, "Migration already applied");
        }
        for applied in &report.applied {
            info!(version = applied.version, checksum = applied.checksum, "Migration applied");
        }
        info!(applied = report.applied.len(), skipped = report.skipped.len(), "Schema is up to date");

        Ok(Database { inner: Arc::new(DatabaseInner { instance, ns, db }) })
    }
}

/// Health probes made before giving up on the engine.
pub const HEALTH_ATTEMPTS: u32 = 3;

async fn wait_until_healthy(instance: &Surreal<Any>, url: &str) -> Result<(), DatabaseError> {
    let mut delay = Duration::from_millis(500);
    for attempt in 1..=HEALTH_ATTEMPTS {
        if instance.health().await.is_ok() {
            return Ok(());
        }
        if attempt < HEALTH_ATTEMPTS {
            warn!(attempt, ?delay, "Database not ready, retrying...");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
    Err(DatabaseError::Connection {
        message: format!("Unhealthy after {HEALTH_ATTEMPTS} attempts").into(),
        context: Some(url.to_owned().into()),
    })
}

fn required(value: Option<String>, name: &'static str) -> Result<String, DatabaseError> {
    value.ok_or_else(|| DatabaseError::Validation {
        message: format!("{name} is required").into(),
        context: None,
    })
}
