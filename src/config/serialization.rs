//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Quote a string as a TOML basic string
fn quoted(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

/// Render a list of strings as an inline TOML array
fn string_list(items: &[String]) -> String {
    let inner: Vec<String> = items.iter().map(|s| quoted(s)).collect();
    format!("[{}]", inner.join(", "))
}

impl Config {
    /// Serialize config to TOML format
    ///
    /// Produces a complete, commented config file that `Config::from_env`
    /// reads back to the same values.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# scrollgrab configuration

# Directory exports are written to (file sink)
output_dir = {output_dir}

# Directory for run journals
log_dir = {log_dir}

# Export file name: <prefix>-<YYYY-MM-DD>.txt
filename_prefix = {prefix}

# Scroll driver policy
[extraction]
scroll_delta_px = {delta}
# Pause before each scroll step so the current window can paint
scan_delay_ms = {scan_delay}
poll_interval_ms = {poll}
max_settle_ms = {settle}
# Consecutive empty scans at the bottom before the run is complete
empty_scan_threshold = {threshold}
bottom_tolerance_px = {tolerance}
# Offset movement that ends a settle wait early
settle_progress_px = {progress}

# Output format (SCROLLGRAB_DELIMITER / SCROLLGRAB_COLUMNS override)
[format]
column_count = {columns}
delimiter = {delimiter}
quote = {quote}
default_headers = {default_headers}
min_header_labels = {min_labels}
ignored_header_labels = {ignored}

# Scroll target selectors, tried in order
[target]
selectors = {selectors}

# Feature flags
[features]
journal = {journal}
banner = {banner}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging in addition to stderr
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            output_dir = quoted(&self.output_dir.display().to_string()),
            log_dir = quoted(&self.log_dir.display().to_string()),
            prefix = quoted(&self.filename_prefix),
            delta = self.extraction.scroll_delta_px,
            scan_delay = self.extraction.scan_delay_ms,
            poll = self.extraction.poll_interval_ms,
            settle = self.extraction.max_settle_ms,
            threshold = self.extraction.empty_scan_threshold,
            tolerance = self.extraction.bottom_tolerance_px,
            progress = self.extraction.settle_progress_px,
            columns = self.format.column_count,
            delimiter = quoted(&self.format.delimiter),
            quote = quoted(&self.format.quote.to_string()),
            default_headers = string_list(&self.format.default_headers),
            min_labels = self.format.min_header_labels,
            ignored = string_list(&self.format.ignored_header_labels),
            selectors = string_list(&self.target.selectors),
            journal = self.features.journal,
            banner = self.features.banner,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.display().to_string()),
            log_file_rotation = quoted(self.logging.file_rotation.as_str()),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }
}
