//! The live match session and its dedup bookkeeping.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::matching::progress::ProgressUpdate;
use crate::models::analysis::AnalysisResult;
use crate::models::job::JobMatch;
use crate::models::profile::Profile;

/// Discrete phases of the match pipeline. `Failed` is terminal and reachable
/// from `Analyzing` or `Searching`; recovery is an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MatchPhase {
    #[default]
    Idle,
    Analyzing,
    Searching,
    Ready,
    Failed,
}

/// Insertion-ordered, duplicate-free set of job identity keys.
///
/// Grows monotonically across the initial search and every refresh; reset
/// only when the whole session is abandoned.
#[derive(Debug, Clone, Default)]
pub struct SeenKeys {
    keys: Vec<String>,
    index: HashSet<String>,
}

impl SeenKeys {
    pub fn from_jobs(jobs: &[JobMatch]) -> Self {
        let mut seen = Self::default();
        seen.union(jobs);
        seen
    }

    /// Unions the identity keys of `jobs` into the set, keeping first-seen
    /// order and dropping duplicates.
    pub fn union(&mut self, jobs: &[JobMatch]) {
        for job in jobs {
            let key = job.identity_key();
            if self.index.insert(key.clone()) {
                self.keys.push(key);
            }
        }
    }

    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// The transient working set behind the results view. Exactly one lives in
/// app state; it is discarded (never auto-archived) on reset.
#[derive(Default)]
pub struct MatchSession {
    pub phase: MatchPhase,
    pub profile: Profile,
    pub analysis: Option<AnalysisResult>,
    pub jobs: Vec<JobMatch>,
    pub seen_keys: SeenKeys,
    pub progress: Vec<ProgressUpdate>,
    /// Single error slot; the latest failure overwrites earlier ones.
    pub last_error: Option<String>,
    /// Transient "no more results" notice; auto-clears after a short delay.
    pub notice: Option<String>,
    /// Bumped on every notice change so a stale clear task never clobbers a
    /// newer notice.
    pub notice_epoch: u64,
    /// Single-flight guard for the refresh controller.
    pub refresh_in_flight: bool,
}

pub type SharedSession = Arc<Mutex<MatchSession>>;

impl MatchSession {
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Discards everything and returns to pristine `Idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            phase: self.phase,
            profile: self.profile.clone(),
            analysis: self.analysis.clone(),
            jobs: self.jobs.clone(),
            seen_count: self.seen_keys.len(),
            notice: self.notice.clone(),
            last_error: self.last_error.clone(),
            progress: self.progress.clone(),
        }
    }
}

/// Read-only view of the session returned by the API.
#[derive(Debug, Serialize)]
pub struct MatchSnapshot {
    pub phase: MatchPhase,
    pub profile: Profile,
    pub analysis: Option<AnalysisResult>,
    pub jobs: Vec<JobMatch>,
    pub seen_count: usize,
    pub notice: Option<String>,
    pub last_error: Option<String>,
    pub progress: Vec<ProgressUpdate>,
}
