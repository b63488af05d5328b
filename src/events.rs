// Events emitted by an export run
//
// The driver publishes lifecycle events so the surrounding tool can show
// progress and optionally journal the run. Sends never block the run: a
// full or closed channel just drops the event.

use crate::extract::driver::DriverState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Event type that flows from the exporter to its observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")] // {"type": "progress", ...}
pub enum ExportEvent {
    /// A run was triggered and the scroll target was found
    RunStarted {
        timestamp: DateTime<Utc>,
        headers: Vec<String>,
    },

    /// The driver moved between states
    StateChanged {
        timestamp: DateTime<Utc>,
        from: DriverState,
        to: DriverState,
        rows: usize,
    },

    /// New rows were collected (row count never decreases within a run)
    Progress { timestamp: DateTime<Utc>, rows: usize },

    /// The driver reached its terminal state
    RunFinished {
        timestamp: DateTime<Utc>,
        rows: usize,
        cancelled: bool,
        iterations: u64,
    },

    /// The serialized document was handed to the sink
    Delivered {
        timestamp: DateTime<Utc>,
        filename: String,
        bytes: usize,
    },
}

/// Observers of a run: the progress display and the optional journal
#[derive(Debug, Clone, Default)]
pub struct EventChannels {
    pub progress: Option<mpsc::Sender<ExportEvent>>,
    pub journal: Option<mpsc::Sender<ExportEvent>>,
}

impl EventChannels {
    /// Send to every observer without waiting
    pub fn send(&self, event: ExportEvent) {
        if let Some(tx) = &self.journal {
            let _ = tx.try_send(event.clone());
        }
        if let Some(tx) = &self.progress {
            let _ = tx.try_send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = ExportEvent::StateChanged {
            timestamp: Utc::now(),
            from: DriverState::Scanning,
            to: DriverState::Settling,
            rows: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "state_changed");
        assert_eq!(json["from"], "scanning");
        assert_eq!(json["to"], "settling");
    }

    #[tokio::test]
    async fn test_send_fans_out_and_tolerates_closed_channels() {
        let (progress_tx, mut progress_rx) = mpsc::channel(4);
        let (journal_tx, journal_rx) = mpsc::channel(4);
        drop(journal_rx);

        let channels = EventChannels {
            progress: Some(progress_tx),
            journal: Some(journal_tx),
        };
        channels.send(ExportEvent::Progress {
            timestamp: Utc::now(),
            rows: 1,
        });

        match progress_rx.recv().await {
            Some(ExportEvent::Progress { rows, .. }) => assert_eq!(rows, 1),
            other => panic!("Expected Progress event, got {:?}", other),
        }
    }
}
