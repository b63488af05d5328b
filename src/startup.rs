// Startup module - banner and effective policy summary
//
// Everything here goes to stderr: stdout may be carrying the export itself.

use crate::cli::{Destination, RunRequest, Source};
use crate::config::{Config, Features, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Module status for display
pub struct ModuleStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: &'static str,
}

/// Describe where the rows come from
fn describe_source(source: &Source) -> String {
    match source {
        Source::Capture(path) => format!("capture {}", path.display()),
        Source::Demo { rows } => format!("demo table ({} rows)", rows),
    }
}

/// Describe where the export goes
fn describe_destination(destination: &Destination, config: &Config) -> String {
    match destination {
        Destination::File(Some(dir)) => dir.display().to_string(),
        Destination::File(None) => config.output_dir.display().to_string(),
        Destination::Stdout => "stdout".to_string(),
        Destination::Clipboard => "clipboard".to_string(),
    }
}

/// Print the startup banner and the effective extraction policy
pub fn print_startup(config: &Config, request: &RunRequest) {
    use colors::*;

    eprintln!();
    eprintln!("  {BOLD}{CYAN}scrollgrab{RESET} {DIM}v{VERSION}{RESET}");
    eprintln!("  {DIM}Virtualized table export{RESET}");
    eprintln!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            eprintln!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            eprintln!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    eprintln!();

    let policy = &config.extraction;
    eprintln!("  {DIM}Policy:{RESET}");
    eprintln!(
        "    step {}px, settle ≤{}ms every {}ms, done after {} empty scans at the bottom",
        policy.scroll_delta_px,
        policy.max_settle_ms,
        policy.poll_interval_ms,
        policy.empty_scan_threshold
    );
    eprintln!(
        "    {} columns, delimiter {:?}",
        config.format.column_count, config.format.delimiter
    );
    eprintln!();

    for module in &get_module_status(config) {
        print_module_status(module);
    }
    eprintln!();

    eprintln!(
        "  {MAGENTA}▸{RESET} Source: {BOLD}{}{RESET}",
        describe_source(&request.source)
    );
    eprintln!(
        "  {MAGENTA}▸{RESET} Destination: {BOLD}{}{RESET}",
        describe_destination(&request.destination, config)
    );
    if matches!(request.source, Source::Demo { .. }) {
        eprintln!("  {YELLOW}▸{RESET} {YELLOW}Demo mode active{RESET} {DIM}(built-in table){RESET}");
    }
    eprintln!();
}

/// Status of optional modules based on config
fn get_module_status(config: &Config) -> Vec<ModuleStatus> {
    let Features { journal, banner: _ } = &config.features;

    vec![
        ModuleStatus {
            name: "driver",
            enabled: true, // Core, always on
            description: "Scroll and sample",
        },
        ModuleStatus {
            name: "journal",
            enabled: *journal,
            description: "JSONL run events",
        },
        ModuleStatus {
            name: "file-log",
            enabled: config.logging.file_enabled,
            description: "JSON trace logs",
        },
    ]
}

fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    eprintln!(
        "    {icon} {style}{:<12}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}

/// Log the effective policy (lands in the JSON log file when enabled)
pub fn log_startup(config: &Config, request: &RunRequest) {
    tracing::info!("scrollgrab v{}", VERSION);
    tracing::info!(
        "Policy: step={}px poll={}ms settle={}ms threshold={} tolerance={}px",
        config.extraction.scroll_delta_px,
        config.extraction.poll_interval_ms,
        config.extraction.max_settle_ms,
        config.extraction.empty_scan_threshold,
        config.extraction.bottom_tolerance_px
    );
    tracing::info!(
        "Source: {} -> {}",
        describe_source(&request.source),
        describe_destination(&request.destination, config)
    );
    for module in get_module_status(config) {
        let icon = if module.enabled { "✓" } else { "○" };
        tracing::debug!("  {} {} - {}", icon, module.name, module.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_destination_falls_back_to_output_dir() {
        let config = Config {
            output_dir: PathBuf::from("/srv/exports"),
            ..Config::default()
        };
        assert_eq!(
            describe_destination(&Destination::File(None), &config),
            "/srv/exports"
        );
        assert_eq!(
            describe_destination(&Destination::File(Some(PathBuf::from("out"))), &config),
            "out"
        );
    }

    #[test]
    fn test_journal_status_follows_feature_flag() {
        let mut config = Config::default();
        config.features.journal = true;
        let journal = get_module_status(&config)
            .into_iter()
            .find(|m| m.name == "journal")
            .unwrap();
        assert!(journal.enabled);
    }
}
