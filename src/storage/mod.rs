// Storage module - journals run events to disk in JSON Lines format
//
// One JSON object per line, so a journal can be grepped or piped into jq:
//
//   jq 'select(.type == "state_changed")' logs/scrollgrab-20251127-143022-a7b3.jsonl
//
// Each run gets its own file: scrollgrab-YYYYMMDD-HHMMSS-XXXX.jsonl

use crate::events::ExportEvent;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Writes run events to a JSON Lines file
pub struct Journal {
    path: PathBuf,
    event_rx: mpsc::Receiver<ExportEvent>,
}

impl Journal {
    /// Create a journal for one run, creating the log directory if needed
    pub fn new(
        log_dir: &Path,
        run_id: &str,
        event_rx: mpsc::Receiver<ExportEvent>,
    ) -> Result<Self> {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;

        Ok(Self {
            path: Self::file_path(log_dir, run_id),
            event_rx,
        })
    }

    /// Path of a run's journal: `<log_dir>/scrollgrab-<run_id>.jsonl`
    pub fn file_path(log_dir: &Path, run_id: &str) -> PathBuf {
        log_dir.join(format!("scrollgrab-{}.jsonl", run_id))
    }

    /// Write events until every sender is dropped
    pub async fn run(mut self) -> Result<()> {
        tracing::debug!("Journal started: {:?}", self.path);

        while let Some(event) = self.event_rx.recv().await {
            if let Err(e) = self.write_event(&event) {
                tracing::error!("Failed to journal event: {:?}", e);
                // Keep going, a missing line is better than a dead journal
            }
        }

        tracing::debug!("Journal closed: {:?}", self.path);
        Ok(())
    }

    fn write_event(&self, event: &ExportEvent) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open journal file")?;

        let json = serde_json::to_string(event).context("Failed to serialize event")?;
        writeln!(file, "{}", json).context("Failed to write to journal file")?;

        // Flush immediately so the journal is readable even if the process dies
        file.flush().context("Failed to flush journal file")?;

        Ok(())
    }
}
