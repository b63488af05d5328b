//! Export sinks
//!
//! A sink receives the finished document together with a suggested file
//! name (`<prefix>-<YYYY-MM-DD>.txt`). Where the text ends up is the sink's
//! business: a file, stdout or the system clipboard.

use anyhow::{Context, Result};
use arboard::Clipboard;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// A serialized export ready for delivery
#[derive(Debug, Clone)]
pub struct ExportDocument {
    /// Suggested file name
    pub filename: String,
    /// Full document text
    pub text: String,
    /// Number of data rows (header excluded)
    pub rows: usize,
}

/// Suggested file name for an export made on `date`
pub fn suggested_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.txt", prefix, date.format("%Y-%m-%d"))
}

/// Destination for finished exports
pub trait Sink: Send + Sync {
    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Persist or present the document
    fn deliver(&self, document: &ExportDocument) -> Result<()>;
}

/// Sinks chosen at runtime from the command line
impl Sink for Box<dyn Sink> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn deliver(&self, document: &ExportDocument) -> Result<()> {
        (**self).deliver(document)
    }
}

/// Writes exports into a directory under their suggested name
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, document: &ExportDocument) -> PathBuf {
        self.dir.join(&document.filename)
    }
}

impl Sink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn deliver(&self, document: &ExportDocument) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))?;

        let path = self.path_for(document);
        fs::write(&path, &document.text)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;

        tracing::info!("Wrote {} rows to {}", document.rows, path.display());
        Ok(())
    }
}

/// Prints exports to stdout
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    fn deliver(&self, document: &ExportDocument) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(document.text.as_bytes())
            .context("Failed to write export to stdout")?;
        stdout.flush().context("Failed to flush stdout")?;
        Ok(())
    }
}

/// Copies exports to the system clipboard
///
/// The clipboard is opened per delivery so no handle is held between runs.
pub struct ClipboardSink;

impl Sink for ClipboardSink {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn deliver(&self, document: &ExportDocument) -> Result<()> {
        let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
        clipboard
            .set_text(document.text.as_str())
            .context("Failed to set clipboard text")?;
        tracing::info!("Copied {} rows to the clipboard", document.rows);
        Ok(())
    }
}
