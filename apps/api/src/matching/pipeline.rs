//! Match pipeline — drives one session through
//! `Idle → Analyzing → Searching → Ready`, or into `Failed`.
//!
//! The session lock is never held across a gateway await: each phase locks
//! to transition, releases, awaits the call, then locks again to record the
//! outcome. Failures are recorded and surfaced; nothing retries here — the
//! caller re-triggers from `Idle` after an explicit reset.

use tracing::info;

use crate::errors::AppError;
use crate::gateway::MatchIntel;
use crate::matching::progress::{ProgressChannel, ProgressUpdate};
use crate::matching::session::{MatchPhase, MatchSession, MatchSnapshot, SeenKeys, SharedSession};
use crate::models::profile::Profile;

/// Appends a progress update to the session log and mirrors it onto the
/// broadcast channel.
fn push_progress(
    session: &mut MatchSession,
    channel: &ProgressChannel,
    phase: MatchPhase,
    detail: impl Into<String>,
) {
    let update = ProgressUpdate::new(phase, detail);
    session.progress.push(update.clone());
    channel.emit(update);
}

/// Runs the full analyze → search pipeline against the given profile
/// snapshot. Returns the ready snapshot, or the error that sent the session
/// into `Failed` (or a validation error that left it at `Idle`).
pub async fn run_match(
    session: &SharedSession,
    intel: &dyn MatchIntel,
    channel: &ProgressChannel,
    profile: Profile,
) -> Result<MatchSnapshot, AppError> {
    // Entry: guard the transition out of Idle.
    {
        let mut s = session.lock().await;
        if s.phase != MatchPhase::Idle {
            return Err(AppError::IllegalState(
                "a match session already exists; reset it before starting another".to_string(),
            ));
        }
        if !profile.is_complete() {
            return Err(AppError::Validation(
                "Enter resume text and expectations to start matching".to_string(),
            ));
        }

        s.profile = profile.clone();
        s.last_error = None;
        s.phase = MatchPhase::Analyzing;
        push_progress(
            &mut s,
            channel,
            MatchPhase::Analyzing,
            "Extracting core skills and strengths from the resume",
        );
    }

    info!("Match phase 1: analyzing profile");
    let analysis = match intel.analyze(&profile).await {
        Ok(analysis) => analysis,
        Err(e) => {
            let mut s = session.lock().await;
            s.phase = MatchPhase::Failed;
            s.record_error(e.to_string());
            push_progress(&mut s, channel, MatchPhase::Failed, "Profile analysis failed");
            return Err(e);
        }
    };

    {
        let mut s = session.lock().await;
        s.analysis = Some(analysis.clone());
        s.phase = MatchPhase::Searching;
        push_progress(
            &mut s,
            channel,
            MatchPhase::Searching,
            format!(
                "Identified {} core skills; searching live postings",
                analysis.keywords.len()
            ),
        );
    }

    info!("Match phase 2: searching live postings");
    // First search runs with an empty exclusion list.
    let batch = match intel.search_jobs(&profile, &analysis, &[]).await {
        Ok(batch) => batch,
        Err(e) => {
            let mut s = session.lock().await;
            s.phase = MatchPhase::Failed;
            s.record_error(e.to_string());
            push_progress(&mut s, channel, MatchPhase::Failed, "Job search failed");
            return Err(e);
        }
    };

    let mut s = session.lock().await;
    s.seen_keys = SeenKeys::from_jobs(&batch);
    s.jobs = batch;
    s.phase = MatchPhase::Ready;
    let job_count = s.jobs.len();
    push_progress(
        &mut s,
        channel,
        MatchPhase::Ready,
        format!("Matched {} live postings against the profile", job_count),
    );
    info!("Match session ready with {} postings", s.jobs.len());

    Ok(s.snapshot())
}
