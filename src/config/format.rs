//! Output format and target configuration

use serde::Deserialize;

/// Default scroll target selectors, tried in order
pub const DEFAULT_SELECTORS: &[&str] = &["[data-scroll-root]", ".table-view-scroller", "main"];

/// Column layout, delimiter and header heuristics
#[derive(Debug, Clone, PartialEq)]
pub struct FormatConfig {
    /// Cells read per row (and maximum header width)
    pub column_count: usize,
    /// Field separator
    pub delimiter: String,
    /// Quote character for escaped fields
    pub quote: char,
    /// Headers used when the header row is missing or implausible
    pub default_headers: Vec<String>,
    /// Minimum usable labels for a captured header row to be trusted
    pub min_header_labels: usize,
    /// Header row labels that are UI affordances, not columns
    pub ignored_header_labels: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            column_count: 4,
            delimiter: ", ".to_string(),
            quote: '"',
            default_headers: ["Name", "Project type", "Main category", "Description"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_header_labels: 3,
            ignored_header_labels: vec!["+".to_string(), "New".to_string()],
        }
    }
}

/// Format settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileFormat {
    pub column_count: Option<usize>,
    pub delimiter: Option<String>,
    /// Only the first character is used
    pub quote: Option<String>,
    pub default_headers: Option<Vec<String>>,
    pub min_header_labels: Option<usize>,
    pub ignored_header_labels: Option<Vec<String>>,
}

impl FormatConfig {
    /// Create from file config with defaults
    ///
    /// `delimiter_env` and `columns_env` are environment overrides and win
    /// over the file.
    pub fn from_file(
        file: Option<FileFormat>,
        delimiter_env: Option<String>,
        columns_env: Option<usize>,
    ) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let column_count = columns_env
            .or(file.column_count)
            .filter(|&n| n > 0)
            .unwrap_or(defaults.column_count);

        // Repeated labels collapse; an empty list keeps the built-in headers
        let mut default_headers: Vec<String> = Vec::new();
        for label in file
            .default_headers
            .filter(|h| h.iter().any(|l| !l.trim().is_empty()))
            .unwrap_or(defaults.default_headers)
        {
            if !label.trim().is_empty() && !default_headers.contains(&label) {
                default_headers.push(label);
            }
        }
        default_headers.truncate(column_count);

        Self {
            column_count,
            delimiter: delimiter_env
                .or(file.delimiter)
                .filter(|d| !d.is_empty())
                .unwrap_or(defaults.delimiter),
            quote: file
                .quote
                .and_then(|q| q.chars().next())
                .unwrap_or(defaults.quote),
            default_headers,
            min_header_labels: file.min_header_labels.unwrap_or(defaults.min_header_labels),
            ignored_header_labels: file
                .ignored_header_labels
                .unwrap_or(defaults.ignored_header_labels),
        }
    }
}

/// Where to find the scroll target
#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    pub selectors: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Target settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileTarget {
    pub selectors: Option<Vec<String>>,
}

impl TargetConfig {
    pub fn from_file(file: Option<FileTarget>) -> Self {
        let selectors = file
            .unwrap_or_default()
            .selectors
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::default().selectors);
        Self { selectors }
    }
}
