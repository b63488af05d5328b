//! Feature flags configuration

use serde::Deserialize;

/// Optional modules
#[derive(Debug, Clone)]
pub struct Features {
    /// Journal: write run events to a JSONL file in the log directory
    pub journal: bool,

    /// Banner: print the effective policy before a run
    pub banner: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            journal: false,
            banner: true,
        }
    }
}

/// Feature flags as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileFeatures {
    pub journal: Option<bool>,
    pub banner: Option<bool>,
}

impl Features {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileFeatures>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            journal: file.journal.unwrap_or(defaults.journal),
            banner: file.banner.unwrap_or(defaults.banner),
        }
    }
}
