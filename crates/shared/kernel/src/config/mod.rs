use config::{Config, Environment, File};
use remit_domain::constants::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Custom error type for config loading.
#[remit_derive::remit_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file layered with environment overrides.
///
/// 1. **Base File**: settings from `path` (e.g. `server.toml`; the extension is optional).
///    Defaults to `server` in the working directory. A missing file is not an error, so a
///    deployment may configure everything through the environment.
/// 2. **Environment Overrides**: variables prefixed with `REMIT__`. Nested keys use double
///    underscores, e.g. `REMIT__DATABASE__URL` maps to `database.url` and
///    `REMIT__ACCOUNT__LIMITS__DAILY_WITHDRAW` to `account.limits.daily_withdraw`.
///
/// # Errors
/// Returns [`ConfigError::Config`] when a source cannot be parsed or the merged values do not
/// match `T`.
///
/// # Example
/// ```rust
/// use remit_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    info!(path = %effective_path.display(), "Loading configuration");

    let config = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
