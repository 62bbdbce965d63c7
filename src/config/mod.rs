//! Configuration management.
//!
//! Settings come from an optional TOML file layered under `BIBPMC_*`
//! environment variables. Every key has a default, so no file is needed.
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! base_url = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/"
//! tool = "BibPMC"
//! timeout_secs = 60
//!
//! [logging]
//! level = "info"
//! file = "BibPMC.log"
//!
//! [output]
//! suffix = "_BibPMC.bib"
//! ```
//!
//! Environment variables use `__` between section and key, e.g.
//! `BIBPMC_SERVICE__TIMEOUT_SECS=60`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::DEFAULT_LOG_FILE;
use crate::pipeline::DEFAULT_OUTPUT_SUFFIX;
use crate::sources::{DEFAULT_TOOL, PMC_IDCONV_URL};

/// Name of the configuration file looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "bibpmc.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// ID Converter endpoint settings
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// File the settings were read from, `None` for defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// ID Converter endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as the `tool` query parameter
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Per-request timeout; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tool: default_tool(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    PMC_IDCONV_URL.to_string()
}

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Console level: error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file, relative to the current directory
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

/// Output file naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Replaces the input extension when `--out-bib` is not given
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

fn default_suffix() -> String {
    DEFAULT_OUTPUT_SUFFIX.to_string()
}

/// Find a configuration file: `./bibpmc.toml`, then
/// `<config dir>/bibpmc/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, [`find_config_file`] is
/// consulted and a missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    let source = match path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    if let Some(file) = &source {
        builder = builder.add_source(
            config::File::from(file.as_path())
                .format(config::FileFormat::Toml)
                .required(true),
        );
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("BIBPMC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config.source = source;
    Ok(config)
}
