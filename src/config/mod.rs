//! Configuration for the exporter
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/scrollgrab/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod extraction;
mod features;
mod format;
mod logging;
mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use extraction::{ExtractionConfig, FileExtraction};
pub use features::{Features, FileFeatures};
pub use format::{FileFormat, FileTarget, FormatConfig, TargetConfig};
pub use logging::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory exports are written to by the file sink
    pub output_dir: PathBuf,

    /// Directory for run journals
    pub log_dir: PathBuf,

    /// Prefix of export file names (`<prefix>-<YYYY-MM-DD>.txt`)
    pub filename_prefix: String,

    /// Scroll driver policy
    pub extraction: ExtractionConfig,

    /// Columns, delimiter, headers
    pub format: FormatConfig,

    /// Scroll target selectors
    pub target: TargetConfig,

    /// Feature flags for optional modules
    pub features: Features,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            log_dir: PathBuf::from("./logs"),
            filename_prefix: "export".to_string(),
            extraction: ExtractionConfig::default(),
            format: FormatConfig::default(),
            target: TargetConfig::default(),
            features: Features::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub output_dir: Option<String>,
    pub log_dir: Option<String>,
    pub filename_prefix: Option<String>,

    /// Optional [extraction] section
    pub extraction: Option<FileExtraction>,

    /// Optional [format] section
    pub format: Option<FileFormat>,

    /// Optional [target] section
    pub target: Option<FileTarget>,

    /// Optional [features] section
    pub features: Option<FileFeatures>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

/// Environment overrides, read once so resolution stays testable
#[derive(Debug, Default)]
pub(crate) struct EnvOverrides {
    pub output_dir: Option<String>,
    pub log_dir: Option<String>,
    pub delimiter: Option<String>,
    pub columns: Option<usize>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            output_dir: std::env::var("SCROLLGRAB_OUTPUT_DIR").ok(),
            log_dir: std::env::var("SCROLLGRAB_LOG_DIR").ok(),
            delimiter: std::env::var("SCROLLGRAB_DELIMITER").ok(),
            columns: std::env::var("SCROLLGRAB_COLUMNS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/scrollgrab/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("scrollgrab").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// Exits the process if the file exists but cannot be read or parsed:
    /// silently falling back to defaults would export with the wrong policy.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n  CONFIG ERROR - Failed to parse configuration file\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Numbers written as strings (scroll_delta_px = 400)");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run: scrollgrab config --reset\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n  CONFIG ERROR - Cannot read configuration file\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Self {
        Self::resolve(Self::load_file_config(), EnvOverrides::from_env())
    }

    /// Merge file values and environment overrides over defaults
    pub(crate) fn resolve(file: FileConfig, env: EnvOverrides) -> Self {
        let defaults = Self::default();

        let output_dir = env
            .output_dir
            .or(file.output_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let log_dir = env
            .log_dir
            .or(file.log_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        let filename_prefix = file
            .filename_prefix
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(defaults.filename_prefix);

        Self {
            output_dir,
            log_dir,
            filename_prefix,
            extraction: ExtractionConfig::from_file(file.extraction),
            format: FormatConfig::from_file(file.format, env.delimiter, env.columns),
            target: TargetConfig::from_file(file.target),
            features: Features::from_file(file.features),
            logging: LoggingConfig::from_file(file.logging),
        }
    }
}
