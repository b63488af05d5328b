//! Shared utility functions

use chrono::Utc;
use std::borrow::Cow;

/// Generate a unique run ID for journal file naming
/// Format: YYYYMMDD-HHMMSS-XXXX (timestamp + 4 random hex chars)
pub fn generate_run_id() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
    // RandomState is seeded per process, good enough for a file name suffix
    let random = RandomState::new().build_hasher().finish();

    format!("{}-{:04x}", timestamp, random & 0xFFFF)
}

/// Shorten a cell for log output, cutting on a UTF-8 boundary
///
/// Text longer than `max_bytes` is cut at the last character boundary at or
/// before `max_bytes` and gets a trailing ellipsis.
pub fn preview(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}…", &s[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_is_borrowed() {
        assert!(matches!(preview("Acme", 10), Cow::Borrowed("Acme")));
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        // Each character is 3 bytes
        assert_eq!(preview("日本語", 4), "日…");
        assert_eq!(preview("日本語", 6), "日本…");
        assert_eq!(preview("hello world", 5), "hello…");
    }

    #[test]
    fn test_preview_to_zero() {
        assert_eq!(preview("hello", 0), "…");
    }

    #[test]
    fn test_run_id_format() {
        let id = generate_run_id();
        // YYYYMMDD-HHMMSS-XXXX
        assert_eq!(id.len(), 20);
        assert_eq!(id.matches('-').count(), 2);
        assert!(id[16..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
