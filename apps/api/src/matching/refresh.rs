//! Refresh controller — fetches a non-overlapping batch for a ready session.
//!
//! Single-flight: one refresh at a time per session, enforced with a flag
//! held under the session lock so interleaved seen-key unions cannot race.
//! An empty batch is a first-class outcome, not an error: the displayed
//! jobs stay put and a transient notice is raised that clears itself.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::gateway::MatchIntel;
use crate::matching::session::{MatchPhase, MatchSnapshot, SharedSession};

/// How long the "no more results" notice stays up before auto-clearing.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

const NO_MORE_RESULTS: &str = "No more postings match the current profile right now.";

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    /// True when the upstream returned a structurally valid but empty batch.
    pub exhausted: bool,
    pub snapshot: MatchSnapshot,
}

pub async fn refresh_jobs(
    session: &SharedSession,
    intel: &dyn MatchIntel,
) -> Result<RefreshResult, AppError> {
    // Claim the single-flight slot and snapshot the inputs.
    let (profile, analysis, exclude) = {
        let mut s = session.lock().await;
        if s.phase != MatchPhase::Ready {
            return Err(AppError::IllegalState(
                "refresh requires a ready match session".to_string(),
            ));
        }
        if s.refresh_in_flight {
            return Err(AppError::IllegalState(
                "a refresh is already in flight".to_string(),
            ));
        }
        let Some(analysis) = s.analysis.clone() else {
            return Err(AppError::IllegalState(
                "ready session is missing its analysis".to_string(),
            ));
        };
        s.refresh_in_flight = true;
        (s.profile.clone(), analysis, s.seen_keys.as_slice().to_vec())
    };

    info!("Refreshing postings, excluding {} seen keys", exclude.len());
    let result = intel.search_jobs(&profile, &analysis, &exclude).await;

    let mut s = session.lock().await;
    s.refresh_in_flight = false;

    let batch = match result {
        Ok(batch) => batch,
        Err(e) => {
            // The session stays Ready with its jobs intact; the error lands
            // in the single error slot and the caller may retry.
            s.record_error(e.to_string());
            return Err(e);
        }
    };

    if batch.is_empty() {
        s.notice = Some(NO_MORE_RESULTS.to_string());
        s.notice_epoch += 1;
        let epoch = s.notice_epoch;
        let snapshot = s.snapshot();
        drop(s);
        spawn_notice_clear(session.clone(), epoch);
        info!("Refresh exhausted: no unseen postings returned");
        return Ok(RefreshResult {
            exhausted: true,
            snapshot,
        });
    }

    // A fresh batch replaces the display set; seen keys only ever grow.
    s.seen_keys.union(&batch);
    s.jobs = batch;
    s.notice = None;
    s.notice_epoch += 1;
    info!(
        "Refresh replaced the result set with {} postings ({} keys seen)",
        s.jobs.len(),
        s.seen_keys.len()
    );
    Ok(RefreshResult {
        exhausted: false,
        snapshot: s.snapshot(),
    })
}

/// Clears the notice after `NOTICE_TTL` unless a newer notice (or a clearing
/// refresh) bumped the epoch in the meantime.
fn spawn_notice_clear(session: SharedSession, epoch: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(NOTICE_TTL).await;
        let mut s = session.lock().await;
        if s.notice_epoch == epoch {
            s.notice = None;
        }
    });
}
