//! Phase-transition narration — a pure side channel.
//!
//! The state machine emits one update per transition; anything may listen
//! (the narration task in `main` logs them) and nothing has to. Emission
//! never blocks and never fails the pipeline: a send with zero receivers is
//! simply discarded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::matching::session::MatchPhase;

/// One human-readable progress update: the phase entered plus free-text
/// detail meant for display.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub phase: MatchPhase,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl ProgressUpdate {
    pub fn new(phase: MatchPhase, detail: impl Into<String>) -> Self {
        Self {
            phase,
            detail: detail.into(),
            at: Utc::now(),
        }
    }
}

/// Broadcast wrapper whose emit ignores the no-subscriber case.
#[derive(Clone)]
pub struct ProgressChannel {
    tx: broadcast::Sender<ProgressUpdate>,
}

impl ProgressChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.tx.subscribe()
    }

    /// Fire-and-forget. The outcome of the state machine must never depend
    /// on whether anything is listening.
    pub fn emit(&self, update: ProgressUpdate) {
        let _ = self.tx.send(update);
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new()
    }
}
