//! Optimization session — the per-job diagnose → deep-rewrite sub-pipeline.
//!
//! Independent of the match session's lifecycle: the same job may be open
//! in several sessions at once, and each open starts from scratch (no
//! caching of diagnoses across opens). The deep rewrite reveals its steps
//! one at a time on a fixed cadence — a deliberate pacing contract that
//! preserves upstream order exactly — and is cancellable only by closing
//! the whole session.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::gateway::MatchIntel;
use crate::models::job::JobMatch;
use crate::models::optimize::{OptimizationDiagnosis, OptimizationStep};

/// Fixed pacing between revealed rewrite steps.
pub const STEP_REVEAL_INTERVAL: Duration = Duration::from_millis(800);

pub struct OptimizationSession {
    pub id: Uuid,
    pub job: JobMatch,
    /// Resume snapshot taken when the session opened.
    pub resume_text: String,
    pub diagnosis: Option<OptimizationDiagnosis>,
    /// Full upstream step sequence; only `revealed` of them are visible.
    steps: Vec<OptimizationStep>,
    revealed: usize,
    pub rewriting: bool,
    /// Single error slot; the latest failure overwrites earlier ones.
    pub last_error: Option<String>,
    reveal_task: Option<AbortHandle>,
}

pub type SharedOptimization = Arc<Mutex<OptimizationSession>>;

impl OptimizationSession {
    fn new(job: JobMatch, resume_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            job,
            resume_text,
            diagnosis: None,
            steps: Vec::new(),
            revealed: 0,
            rewriting: false,
            last_error: None,
            reveal_task: None,
        }
    }

    fn record_error(&mut self, e: &AppError) {
        self.last_error = Some(e.to_string());
    }

    pub fn view(&self) -> OptimizationView {
        OptimizationView {
            id: self.id,
            job: self.job.clone(),
            diagnosis: self.diagnosis.clone(),
            steps: self.steps[..self.revealed].to_vec(),
            rewriting: self.rewriting,
            rewrite_complete: !self.rewriting
                && !self.steps.is_empty()
                && self.revealed == self.steps.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Read-only view returned by the API; `steps` is the revealed prefix only.
#[derive(Debug, Serialize)]
pub struct OptimizationView {
    pub id: Uuid,
    pub job: JobMatch,
    pub diagnosis: Option<OptimizationDiagnosis>,
    pub steps: Vec<OptimizationStep>,
    pub rewriting: bool,
    pub rewrite_complete: bool,
    pub last_error: Option<String>,
}

/// All open optimization sessions, keyed by id.
#[derive(Clone, Default)]
pub struct OptimizationRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SharedOptimization>>>,
}

impl OptimizationRegistry {
    pub async fn get(&self, id: Uuid) -> Option<SharedOptimization> {
        self.sessions.read().await.get(&id).cloned()
    }

    async fn insert(&self, session: OptimizationSession) -> (Uuid, SharedOptimization) {
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        (id, shared)
    }

    async fn remove(&self, id: Uuid) -> Option<SharedOptimization> {
        self.sessions.write().await.remove(&id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Opens a fresh session for a job and immediately runs the diagnosis.
///
/// The session is created even when the diagnosis fails — the failure lands
/// in the error slot and the diagnosis stays retryable in place.
pub async fn open_session(
    registry: &OptimizationRegistry,
    intel: &dyn MatchIntel,
    job: JobMatch,
    resume_text: String,
) -> Result<OptimizationView, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "a resume is required before optimizing against a job".to_string(),
        ));
    }

    let (id, session) = registry
        .insert(OptimizationSession::new(job, resume_text))
        .await;
    info!("Opened optimization session {id}");

    // A failed diagnosis is reported through the view, not as a request
    // error: the session exists and the diagnosis can be retried.
    let _ = run_diagnosis(&session, intel).await;

    let s = session.lock().await;
    Ok(s.view())
}

/// Runs (or re-runs) the diagnosis from scratch. Any previously fetched
/// rewrite steps are invalidated.
pub async fn run_diagnosis(
    session: &SharedOptimization,
    intel: &dyn MatchIntel,
) -> Result<OptimizationView, AppError> {
    let (resume_text, job) = {
        let mut s = session.lock().await;
        if let Some(handle) = s.reveal_task.take() {
            handle.abort();
        }
        s.diagnosis = None;
        s.steps.clear();
        s.revealed = 0;
        s.rewriting = false;
        s.last_error = None;
        (s.resume_text.clone(), s.job.clone())
    };

    match intel.diagnose(&resume_text, &job).await {
        Ok(diagnosis) => {
            let mut s = session.lock().await;
            s.diagnosis = Some(diagnosis);
            Ok(s.view())
        }
        Err(e) => {
            let mut s = session.lock().await;
            s.record_error(&e);
            Err(e)
        }
    }
}

/// Fetches the rewrite steps and starts the staged reveal: the first step
/// is visible immediately, each subsequent one after the fixed interval.
pub async fn start_deep_rewrite(
    session: &SharedOptimization,
    intel: &dyn MatchIntel,
) -> Result<OptimizationView, AppError> {
    let (resume_text, job) = {
        let mut s = session.lock().await;
        if s.diagnosis.is_none() {
            return Err(AppError::IllegalState(
                "run a diagnosis before requesting the deep rewrite".to_string(),
            ));
        }
        if s.rewriting {
            return Err(AppError::IllegalState(
                "a deep rewrite is already running".to_string(),
            ));
        }
        if let Some(handle) = s.reveal_task.take() {
            handle.abort();
        }
        s.steps.clear();
        s.revealed = 0;
        s.rewriting = true;
        s.last_error = None;
        (s.resume_text.clone(), s.job.clone())
    };

    let result = intel.deep_optimize(&resume_text, &job).await;

    let mut s = session.lock().await;
    let steps = match result {
        Ok(steps) => steps,
        Err(e) => {
            s.rewriting = false;
            s.record_error(&e);
            return Err(e);
        }
    };

    info!("Deep rewrite produced {} steps", steps.len());
    s.steps = steps;
    s.revealed = s.steps.len().min(1);
    if s.revealed < s.steps.len() {
        s.reveal_task = Some(spawn_reveal(session.clone()));
    } else {
        s.rewriting = false;
    }
    Ok(s.view())
}

/// Closes and discards the session, cancelling any in-flight reveal.
pub async fn close_session(registry: &OptimizationRegistry, id: Uuid) -> Result<(), AppError> {
    let session = registry
        .remove(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Optimization session {id} not found")))?;
    let mut s = session.lock().await;
    if let Some(handle) = s.reveal_task.take() {
        handle.abort();
    }
    info!("Closed optimization session {id}");
    Ok(())
}

/// Advances the reveal one step per tick until the sequence is exhausted.
fn spawn_reveal(session: SharedOptimization) -> AbortHandle {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(STEP_REVEAL_INTERVAL).await;
            let mut s = session.lock().await;
            if s.revealed < s.steps.len() {
                s.revealed += 1;
            }
            if s.revealed >= s.steps.len() {
                s.rewriting = false;
                s.reveal_task = None;
                break;
            }
        }
    })
    .abort_handle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{sample_job, sample_steps, StubIntel};

    fn job() -> JobMatch {
        sample_job("Acme", "Staff Engineer", "https://acme.dev/jobs/1")
    }

    async fn open_ok(registry: &OptimizationRegistry, intel: &StubIntel) -> SharedOptimization {
        let view = open_session(registry, intel, job(), "resume text".to_string())
            .await
            .unwrap();
        registry.get(view.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_runs_diagnosis_immediately() {
        let registry = OptimizationRegistry::default();
        let intel = StubIntel::default();

        let view = open_session(&registry, &intel, job(), "resume".to_string())
            .await
            .unwrap();

        assert!(view.diagnosis.is_some());
        assert!(view.last_error.is_none());
        assert!(view.steps.is_empty());
    }

    #[tokio::test]
    async fn test_open_with_empty_resume_is_rejected() {
        let registry = OptimizationRegistry::default();
        let intel = StubIntel::default();

        let result = open_session(&registry, &intel, job(), "  ".to_string()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_failed_diagnosis_leaves_session_retryable() {
        let registry = OptimizationRegistry::default();
        let failing = StubIntel {
            fail_diagnose: true,
            ..StubIntel::default()
        };

        let view = open_session(&registry, &failing, job(), "resume".to_string())
            .await
            .unwrap();
        assert!(view.diagnosis.is_none());
        assert!(view.last_error.is_some());

        // Retry against a healthy gateway succeeds and clears the error.
        let session = registry.get(view.id).await.unwrap();
        let healthy = StubIntel::default();
        let view = run_diagnosis(&session, &healthy).await.unwrap();
        assert!(view.diagnosis.is_some());
        assert!(view.last_error.is_none());
    }

    #[tokio::test]
    async fn test_deep_rewrite_without_diagnosis_is_illegal() {
        let registry = OptimizationRegistry::default();
        let failing = StubIntel {
            fail_diagnose: true,
            ..StubIntel::default()
        };
        let view = open_session(&registry, &failing, job(), "resume".to_string())
            .await
            .unwrap();
        let session = registry.get(view.id).await.unwrap();

        let result = start_deep_rewrite(&session, &failing).await;
        assert!(matches!(result, Err(AppError::IllegalState(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_exposes_steps_in_order() {
        let registry = OptimizationRegistry::default();
        let intel = StubIntel {
            steps: sample_steps(3),
            ..StubIntel::default()
        };
        let session = open_ok(&registry, &intel).await;

        let view = start_deep_rewrite(&session, &intel).await.unwrap();
        assert_eq!(view.steps.len(), 1);
        assert_eq!(view.steps[0].section, "Section 0");
        assert!(view.rewriting);
        assert!(!view.rewrite_complete);

        tokio::time::sleep(STEP_REVEAL_INTERVAL + Duration::from_millis(50)).await;
        let view = session.lock().await.view();
        assert_eq!(view.steps.len(), 2);
        assert_eq!(view.steps[1].section, "Section 1");

        tokio::time::sleep(STEP_REVEAL_INTERVAL + Duration::from_millis(50)).await;
        let view = session.lock().await.view();
        assert_eq!(view.steps.len(), 3);
        assert_eq!(view.steps[2].section, "Section 2");
        assert!(!view.rewriting);
        assert!(view.rewrite_complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_the_reveal() {
        let registry = OptimizationRegistry::default();
        let intel = StubIntel {
            steps: sample_steps(3),
            ..StubIntel::default()
        };
        let session = open_ok(&registry, &intel).await;
        let id = session.lock().await.id;

        start_deep_rewrite(&session, &intel).await.unwrap();
        close_session(&registry, id).await.unwrap();
        assert!(registry.get(id).await.is_none());

        // The aborted task never advances the sequence again.
        tokio::time::sleep(Duration::from_secs(10)).await;
        let view = session.lock().await.view();
        assert_eq!(view.steps.len(), 1);
    }

    #[tokio::test]
    async fn test_single_step_rewrite_completes_immediately() {
        let registry = OptimizationRegistry::default();
        let intel = StubIntel {
            steps: sample_steps(1),
            ..StubIntel::default()
        };
        let session = open_ok(&registry, &intel).await;

        let view = start_deep_rewrite(&session, &intel).await.unwrap();
        assert_eq!(view.steps.len(), 1);
        assert!(!view.rewriting);
        assert!(view.rewrite_complete);
    }

    #[tokio::test]
    async fn test_empty_step_sequence_is_not_an_error() {
        let registry = OptimizationRegistry::default();
        let intel = StubIntel {
            steps: Vec::new(),
            ..StubIntel::default()
        };
        let session = open_ok(&registry, &intel).await;

        let view = start_deep_rewrite(&session, &intel).await.unwrap();
        assert!(view.steps.is_empty());
        assert!(!view.rewriting);
        assert!(!view.rewrite_complete);
    }

    #[tokio::test]
    async fn test_deep_rewrite_failure_is_retryable() {
        let registry = OptimizationRegistry::default();
        let intel = StubIntel::default();
        let session = open_ok(&registry, &intel).await;

        let failing = StubIntel {
            fail_deep: true,
            ..StubIntel::default()
        };
        let result = start_deep_rewrite(&session, &failing).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert!(session.lock().await.last_error.is_some());

        let ok = StubIntel {
            steps: sample_steps(1),
            ..StubIntel::default()
        };
        let view = start_deep_rewrite(&session, &ok).await.unwrap();
        assert_eq!(view.steps.len(), 1);
        assert!(view.last_error.is_none());
    }
}
