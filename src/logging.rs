//! Console and file log setup.
//!
//! [`LogConfig::build_dispatch`] returns a [`Dispatch`] instead of installing
//! a global subscriber. The binary attaches it to the pipeline future; tests
//! can scope it with [`tracing::dispatcher::with_default`].

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

/// Log file written to the current directory unless configured otherwise
pub const DEFAULT_LOG_FILE: &str = "BibPMC.log";

/// Where log records go and how much of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Threshold for stderr output; `RUST_LOG` overrides it
    pub console_level: LevelFilter,
    /// Append-mode log file, `None` to disable
    pub file: Option<PathBuf>,
    pub file_level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::INFO,
            file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            file_level: LevelFilter::DEBUG,
        }
    }
}

impl LogConfig {
    pub fn with_console_level(mut self, level: LevelFilter) -> Self {
        self.console_level = level;
        self
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Build the subscriber. Fails only if the log file cannot be opened.
    pub fn build_dispatch(&self) -> io::Result<Dispatch> {
        let console_filter = EnvFilter::builder()
            .with_default_directive(self.console_level.into())
            .from_env_lossy();

        let console = fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_target(false)
            .with_filter(console_filter);

        let file = match &self.file {
            Some(path) => {
                let handle = OpenOptions::new().create(true).append(true).open(path)?;
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(handle))
                        .with_filter(self.file_level),
                )
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry().with(console).with(file);
        Ok(Dispatch::new(subscriber))
    }
}

/// Console threshold from `-v`/`-q` counts, falling back to the configured
/// level name (`info` when unparseable)
pub fn console_level(verbose: u8, quiet: bool, configured: &str) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }

    match verbose {
        0 => configured.parse().unwrap_or(LevelFilter::INFO),
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Delete a log file left by an earlier run. Returns whether one existed.
pub fn remove_stale_log(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
