//! # Remit Server
//!
//! HTTP front of the Remit ledger: account management, deposits, withdrawals and transfers on
//! `Axum`, backed by `SurrealDB`.
//!
//! ## Example
//! ```no_run
//! use remit_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8080)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

#[cfg(not(feature = "server"))]
compile_error!("remit-server is built with the `server` feature");

pub mod api;
mod router;
mod state;

pub use router::{DOCS_PATH, OPENAPI_PATH};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt, ApiStateInner};

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use remit::domain::config::ApiConfig;
use remit_database::{Database, DatabaseBuilder};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Time in-flight requests get to finish after a shutdown signal.
const GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Collects configuration for a [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn check_tls_files(&self) -> Result<()> {
        let Some(ssl) = &self.cfg.server.ssl else {
            return Ok(());
        };
        for (label, path) in [("certificate", &ssl.cert), ("private key", &ssl.key)] {
            if !path.exists() {
                anyhow::bail!("TLS {label} not found at {}", path.display());
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
                warn!(key = %ssl.key.display(), "TLS private key is readable by group or others");
            }
        }
        Ok(())
    }

    /// Connects the database (applying migrations), wires the feature slices and assembles the
    /// handler state.
    ///
    /// # Errors
    /// Fails when a TLS file is missing, the database cannot be reached or migrated, or the
    /// `[account]` settings are unusable.
    pub async fn build(self) -> Result<Server> {
        self.check_tls_files()?;
        info!(address = %SocketAddr::new(self.cfg.server.address, self.cfg.server.port), "Initializing server");

        let db: Database = DatabaseBuilder::from_config(&self.cfg.database)
            .init()
            .await
            .context("Failed to establish database connection")?;

        let slices = remit::init(&self.cfg, &db).context("Feature bootstrap failed")?;

        let state = anyhow::Context::context(
            slices
                .into_iter()
                .fold(ApiState::builder().config(self.cfg).db(db), ApiStateBuilder::register_slice)
                .build(),
            "Failed to finalize API state registry",
        )?;

        Ok(Server { state })
    }
}

/// An initialized server, ready to [`run`](Server::run).
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves an already assembled state, for example one wired to custom repositories.
    pub const fn from_state(state: ApiState) -> Self {
        Self { state }
    }

    /// The complete application router, including docs and health routes.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Serves HTTP, or HTTPS when `[server.ssl]` is configured, until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Returns an error when binding fails or the TLS material cannot be loaded.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        let app = self.router();

        let handle = Handle::<SocketAddr>::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, draining connections");
            shutdown.graceful_shutdown(Some(GRACE_PERIOD));
        });

        if let Some(ssl) = &cfg.server.ssl {
            let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                .await
                .context("Failed to load TLS certificates")?;

            info!("Listening on https://{address}");
            axum_server::bind_rustls(address, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Listening on http://{address}");
            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
