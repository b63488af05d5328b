// scrollgrab - export every row of a virtualized table
//
// Virtualized tables only keep the rows near the viewport mounted, so a
// plain read sees a window of the data. scrollgrab scrolls the table in
// steps, samples the mounted rows after each step, dedups them by row id
// and serializes the result once the bottom stops yielding new rows.
//
// Architecture:
// - cli: parses the command, handles config management
// - extract: Exporter, ScrollDriver, ViewportSampler, RowStore
// - serialize + sink: document rendering and delivery (file, stdout, clipboard)
// - sim: simulated virtualized view for captures and the demo table
// - storage: optional JSONL journal of run events

mod cli;
mod config;
mod events;
mod extract;
mod logging;
mod serialize;
mod sim;
mod sink;
mod startup;
mod storage;
mod util;

use anyhow::{Context, Result};
use cli::{Destination, Source};
use config::Config;
use events::{EventChannels, ExportEvent};
use extract::{ExportOutcome, ExportSettings, Exporter};
use sim::capture::Capture;
use sink::{ClipboardSink, FileSink, Sink, StdoutSink};
use storage::Journal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Bounded event channel capacity; observers that fall behind lose events
const EVENT_BUFFER: usize = 1000;

/// Log run progress as events arrive
async fn report_progress(mut event_rx: mpsc::Receiver<ExportEvent>) {
    while let Some(event) = event_rx.recv().await {
        match event {
            ExportEvent::Progress { rows, .. } => tracing::info!("{} rows collected", rows),
            ExportEvent::StateChanged { from, to, rows, .. } => {
                tracing::debug!("{:?} -> {:?} at {} rows", from, to, rows)
            }
            _ => {}
        }
    }
}

/// Spawn the journal task when enabled
///
/// A journal that cannot be created is logged and skipped; the export
/// itself does not depend on it.
fn spawn_journal(
    config: &Config,
    run_id: &str,
) -> (Option<mpsc::Sender<ExportEvent>>, Option<JoinHandle<Result<()>>>) {
    if !config.features.journal {
        return (None, None);
    }

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    match Journal::new(&config.log_dir, run_id, rx) {
        Ok(journal) => {
            tracing::info!(
                "Journal: {}",
                Journal::file_path(&config.log_dir, run_id).display()
            );
            (Some(tx), Some(tokio::spawn(journal.run())))
        }
        Err(e) => {
            tracing::error!("Failed to start journal: {:#}", e);
            (None, None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Config commands are handled (and exit) before anything else starts
    let Some(request) = cli::handle_cli() else {
        return Ok(());
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // Keep the guard alive so file logs flush on exit
    let _log_guard = logging::init(&config.logging);

    if config.features.banner {
        startup::print_startup(&config, &request);
    }
    startup::log_startup(&config, &request);

    let run_id = util::generate_run_id();
    tracing::debug!("Run ID: {}", run_id);

    // Pages mount their table under the first configured selector
    let selector = config
        .target
        .selectors
        .first()
        .cloned()
        .unwrap_or_default();
    let page = match &request.source {
        Source::Capture(path) => Capture::load(path)?.into_page(&selector),
        Source::Demo { rows } => sim::demo::demo_page(&selector, *rows),
    };

    let sink: Box<dyn Sink> = match &request.destination {
        Destination::File(dir) => Box::new(FileSink::new(
            dir.clone().unwrap_or_else(|| config.output_dir.clone()),
        )),
        Destination::Stdout => Box::new(StdoutSink),
        Destination::Clipboard => Box::new(ClipboardSink),
    };

    let (progress_tx, progress_rx) = mpsc::channel(EVENT_BUFFER);
    let (journal_tx, journal_handle) = spawn_journal(&config, &run_id);
    let channels = EventChannels {
        progress: Some(progress_tx),
        journal: journal_tx,
    };
    let progress_handle = tokio::spawn(report_progress(progress_rx));

    let settings = ExportSettings {
        extraction: config.extraction.clone(),
        format: config.format.clone(),
        selectors: config.target.selectors.clone(),
        filename_prefix: config.filename_prefix.clone(),
    };
    let exporter = Exporter::new(page, sink, settings).with_channels(channels);

    // Ctrl+C ends the run early; collected rows are still exported
    let cancel = exporter.cancel_handle();
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, exporting the rows collected so far");
            cancel.cancel();
        }
    });

    let outcome = exporter.trigger().await;
    signal_handle.abort();
    tracing::debug!("Run ended with {} rows collected", exporter.progress());

    // Dropping the exporter closes the event channels so observers finish
    drop(exporter);
    let _ = progress_handle.await;
    if let Some(handle) = journal_handle {
        match handle.await {
            Ok(Err(e)) => tracing::error!("Journal error: {:#}", e),
            Err(e) => tracing::error!("Journal task failed: {}", e),
            Ok(Ok(())) => {}
        }
    }

    match outcome.context("Export failed")? {
        ExportOutcome::Exported {
            rows,
            filename,
            partial: false,
        } => {
            tracing::info!("Exported {} rows ({})", rows, filename);
        }
        ExportOutcome::Exported {
            rows,
            filename,
            partial: true,
        } => {
            tracing::warn!("Export cancelled, saved {} rows ({})", rows, filename);
        }
        ExportOutcome::Empty { cancelled } => {
            if cancelled {
                eprintln!("Export cancelled before any rows were collected");
            } else {
                eprintln!("Nothing to export: the table has no rows");
            }
        }
        ExportOutcome::Ignored => {
            tracing::warn!("An export is already running");
        }
    }

    Ok(())
}
