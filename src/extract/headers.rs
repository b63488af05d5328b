//! Header row capture
//!
//! Header rows in virtualized tables are noisy: nested wrappers repeat the
//! same label, and toolbar affordances ("+", "New") sit in the same row.
//! Labels are filtered, deduplicated and capped at the column count. If too
//! few usable labels remain, the configured default headers are used.

use crate::config::FormatConfig;

/// Ordered, deduplicated column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSet(Vec<String>);

impl HeaderSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Capture headers from the rendered header row
    ///
    /// `labels` is the raw label list from the view (`None` when no header
    /// row is rendered). Falls back to `format.default_headers` when the row
    /// is missing or has fewer than `format.min_header_labels` usable labels.
    pub fn capture(labels: Option<Vec<String>>, format: &FormatConfig) -> Self {
        let fallback =
            || Self::from_labels(format.default_headers.iter().cloned(), format.column_count);

        let Some(labels) = labels else {
            tracing::warn!("Header row not found, using default headers");
            return fallback();
        };

        let usable: Vec<String> = labels
            .iter()
            .map(|label| label.trim())
            .filter(|label| label.chars().count() > 1)
            .filter(|label| !format.ignored_header_labels.iter().any(|i| i == label))
            .map(str::to_string)
            .collect();

        if usable.len() < format.min_header_labels {
            tracing::warn!(
                "Header row has {} usable labels (need {}), using default headers",
                usable.len(),
                format.min_header_labels
            );
            return fallback();
        }

        let headers = Self::from_labels(usable, format.column_count);
        tracing::debug!("Captured headers: {:?}", headers.0);
        headers
    }

    /// Deduplicate in order and cap at `column_count`
    fn from_labels(labels: impl IntoIterator<Item = String>, column_count: usize) -> Self {
        let mut deduped: Vec<String> = Vec::with_capacity(column_count);
        for label in labels {
            if deduped.len() == column_count {
                break;
            }
            if !deduped.contains(&label) {
                deduped.push(label);
            }
        }
        Self::new(deduped)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Number of columns in the exported document
    pub fn width(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_missing_header_row_keeps_default() {
        let format = FormatConfig::default();
        let headers = HeaderSet::capture(None, &format);
        assert_eq!(headers.labels(), format.default_headers.as_slice());
    }

    #[test]
    fn test_nested_labels_are_deduplicated() {
        let format = FormatConfig::default();
        let headers = HeaderSet::capture(
            labels(&["Title", "Title", " Owner ", "Owner", "Status", "Due"]),
            &format,
        );
        assert_eq!(headers.labels(), &["Title", "Owner", "Status", "Due"]);
    }

    #[test]
    fn test_affordances_and_short_labels_are_ignored() {
        let format = FormatConfig::default();
        let headers = HeaderSet::capture(
            labels(&["+", "Title", "", "X", "Owner", "New", "Status"]),
            &format,
        );
        assert_eq!(headers.labels(), &["Title", "Owner", "Status"]);
    }

    #[test]
    fn test_too_few_labels_keeps_default() {
        let format = FormatConfig::default();
        let headers = HeaderSet::capture(labels(&["Title", "+", "Owner", "New"]), &format);
        assert_eq!(headers.labels(), format.default_headers.as_slice());
    }

    #[test]
    fn test_minimum_counts_labels_before_dedup() {
        let format = FormatConfig::default();
        let headers = HeaderSet::capture(labels(&["Title", "Title", "Owner"]), &format);
        assert_eq!(headers.labels(), &["Title", "Owner"]);
    }

    #[test]
    fn test_fallback_headers_are_deduplicated() {
        let format = FormatConfig {
            default_headers: ["Name", "Name", "Owner", "Due", "Owner", "Status"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..FormatConfig::default()
        };
        let headers = HeaderSet::capture(None, &format);
        assert_eq!(headers.labels(), &["Name", "Owner", "Due", "Status"]);
    }

    #[test]
    fn test_capped_at_column_count() {
        let format = FormatConfig {
            column_count: 2,
            ..FormatConfig::default()
        };
        let headers = HeaderSet::capture(labels(&["One", "Two", "Three"]), &format);
        assert_eq!(headers.labels(), &["One", "Two"]);
        assert_eq!(headers.width(), 2);
    }
}
