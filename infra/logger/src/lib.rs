//! # Logger
//!
//! Installs the process wide `tracing` subscriber for Remit binaries.
//!
//! Output goes to the console, to daily rolling files, or both. File output is written through a
//! non-blocking worker whose guard lives in the returned [`Logger`]; keep the handle alive until
//! shutdown or buffered lines are lost. `RUST_LOG` is honoured unless an explicit filter is set.
//!
//! ## Example
//!
//! ```rust
//! use remit_domain::config::LoggingConfig;
//! use remit_logger::Logger;
//!
//! let settings = LoggingConfig { level: "debug".to_owned(), ..LoggingConfig::default() };
//! let _logger = Logger::from_config("remit-server", &settings)?.init()?;
//! # Ok::<(), remit_logger::LoggerError>(())
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use remit_domain::config::LoggingConfig;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Rolling file destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    pub directory: PathBuf,
    pub rotation: Rotation,
    pub max_files: usize,
}

impl FileOutput {
    #[must_use]
    pub fn daily(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), rotation: Rotation::DAILY, max_files: DEFAULT_MAX_FILES }
    }
}

/// Collects logger settings; nothing global happens until [`LoggerBuilder::init`].
#[derive(Debug)]
#[must_use = "The builder does nothing until `init` is called."]
pub struct LoggerBuilder {
    name: String,
    console: bool,
    level: LevelFilter,
    filter: Option<String>,
    file: Option<FileOutput>,
    json: bool,
}

impl LoggerBuilder {
    /// Minimum level when neither `RUST_LOG` nor an explicit filter says otherwise.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Directive list such as `remit_account=debug,tower_http=info`. Takes precedence over
    /// `RUST_LOG`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Emits every enabled output as JSON lines.
    pub const fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn file(mut self, output: FileOutput) -> Self {
        self.file = Some(output);
        self
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] when no output is enabled, the name is blank,
    ///   `max_files` is zero or the filter does not parse.
    /// * [`LoggerError::Appender`] / [`LoggerError::Internal`] when the log directory is unusable.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.check()?;
        let filter = self.env_filter()?;

        let mut layers: Vec<BoxedLayer> = Vec::new();
        if self.console {
            let console = layer().with_ansi(!self.json);
            layers.push(if self.json { console.json().boxed() } else { console.compact().boxed() });
        }

        let guard = match &self.file {
            Some(output) => {
                let (file_layer, guard) = self.file_layer(output)?;
                layers.push(file_layer);
                Some(guard)
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .context("A global subscriber is already installed")?;

        tracing::debug!(name = %self.name, level = %self.level, "Logger initialized");
        Ok(Logger { guard })
    }

    fn check(&self) -> Result<(), LoggerError> {
        let problem = if self.name.trim().is_empty() {
            Some("logger name must not be blank")
        } else if !self.console && self.file.is_none() {
            Some("no output enabled; turn on the console or configure a log path")
        } else if self.file.as_ref().is_some_and(|f| f.max_files == 0) {
            Some("max_files must be greater than zero")
        } else {
            None
        };

        problem.map_or(Ok(()), |message| {
            Err(LoggerError::InvalidConfiguration { message: message.into(), context: None })
        })
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        let Some(directives) = &self.filter else {
            return Ok(builder.from_env_lossy());
        };
        builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("cannot parse filter '{directives}': {e}").into(),
            context: None,
        })
    }

    fn file_layer(&self, output: &FileOutput) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
        fs::create_dir_all(&output.directory).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some(format!("creating {}", output.directory.display()).into()),
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(output.rotation.clone())
            .filename_prefix(&self.name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(output.max_files)
            .build(&output.directory)?;

        let (writer, guard) = tracing_appender::non_blocking(appender);
        let plain = layer().with_writer(writer).with_ansi(false);
        let boxed = if self.json { plain.json().boxed() } else { plain.boxed() };
        Ok((boxed, guard))
    }
}

/// Handle to the installed subscriber. Dropping it flushes and stops the file worker.
#[must_use = "Dropping this handle stops the background file writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder. `name` prefixes rolling files, e.g. `remit-server.2026-01-01.log`.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            console: true,
            level: LevelFilter::INFO,
            filter: None,
            file: None,
            json: false,
        }
    }

    /// Builder preloaded from the `[logging]` configuration section.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] when `level` is not a tracing level name.
    pub fn from_config(
        name: impl Into<String>,
        config: &LoggingConfig,
    ) -> Result<LoggerBuilder, LoggerError> {
        let level = LevelFilter::from_str(config.level.trim()).map_err(|_| {
            LoggerError::InvalidConfiguration {
                message: format!("unknown log level '{}'", config.level).into(),
                context: None,
            }
        })?;

        let mut builder = Self::builder(name).console(config.console).level(level).json(config.json);
        if let Some(filter) = config.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            builder = builder.filter(filter);
        }
        if let Some(path) = &config.path {
            builder = builder.file(FileOutput::daily(path));
        }
        Ok(builder)
    }

    /// True when a file worker is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder("remit-test");
        assert!(builder.console);
        assert!(!builder.json);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert!(builder.file.is_none());
    }

    #[test]
    fn from_config_maps_every_field() -> Result<(), LoggerError> {
        let config = LoggingConfig {
            console: false,
            level: "warn".to_owned(),
            filter: Some("remit_account=trace".to_owned()),
            path: Some(PathBuf::from("logs")),
            json: true,
        };

        let builder = Logger::from_config("remit-test", &config)?;

        assert!(!builder.console);
        assert!(builder.json);
        assert_eq!(builder.level, LevelFilter::WARN);
        assert_eq!(builder.filter.as_deref(), Some("remit_account=trace"));
        assert_eq!(builder.file, Some(FileOutput::daily("logs")));
        Ok(())
    }

    #[test]
    fn blank_filter_is_ignored() -> Result<(), LoggerError> {
        let config = LoggingConfig { filter: Some("  ".to_owned()), ..LoggingConfig::default() };
        assert!(Logger::from_config("remit-test", &config)?.filter.is_none());
        Ok(())
    }

    #[test]
    fn unknown_level_is_rejected() {
        let config = LoggingConfig { level: "loud".to_owned(), ..LoggingConfig::default() };
        let err = Logger::from_config("remit-test", &config).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn settings_are_checked_before_install() {
        let silent = Logger::builder("remit-test").console(false).init();
        assert!(matches!(silent, Err(LoggerError::InvalidConfiguration { .. })));

        let unnamed = Logger::builder(" ").init();
        assert!(matches!(unnamed, Err(LoggerError::InvalidConfiguration { .. })));

        let no_files = Logger::builder("remit-test")
            .file(FileOutput { max_files: 0, ..FileOutput::daily("logs") })
            .init();
        assert!(matches!(no_files, Err(LoggerError::InvalidConfiguration { .. })));

        let bad_filter = Logger::builder("remit-test").filter("remit=[").init();
        assert!(matches!(bad_filter, Err(LoggerError::InvalidConfiguration { .. })));
    }
}
