//! History archive — append-only ledger of completed match sessions.
//!
//! Items are immutable deep snapshots, newest first, created only by an
//! explicit save. The whole list is rewritten through the persistence port
//! on every change; concurrent saves serialize on the archive lock so
//! insertion order is preserved. No single-item delete or update exists.

pub mod handlers;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::session::{MatchPhase, MatchSnapshot, SeenKeys, SharedSession};
use crate::models::analysis::AnalysisResult;
use crate::models::history::HistoryItem;
use crate::models::identity::Identity;
use crate::models::job::JobMatch;
use crate::models::profile::Profile;
use crate::storage::StateStore;

const HISTORY_KEY: &str = "history";

pub struct HistoryArchive {
    store: Arc<dyn StateStore>,
    items: Mutex<Vec<HistoryItem>>,
}

impl HistoryArchive {
    /// Reads the archive slot once; an absent slot is an empty archive.
    pub fn load(store: Arc<dyn StateStore>) -> anyhow::Result<Self> {
        let items: Vec<HistoryItem> = match store.load(HISTORY_KEY)? {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };
        info!("History archive loaded with {} item(s)", items.len());
        Ok(Self {
            store,
            items: Mutex::new(items),
        })
    }

    pub async fn list(&self) -> Vec<HistoryItem> {
        self.items.lock().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<HistoryItem> {
        self.items.lock().await.iter().find(|i| i.id == id).cloned()
    }

    /// Prepends a snapshot. Guards: a signed-in identity must be attached
    /// and the session must carry an analysis plus a non-empty job list.
    pub async fn save(
        &self,
        identity: Option<&Identity>,
        profile: Profile,
        analysis: Option<AnalysisResult>,
        jobs: Vec<JobMatch>,
    ) -> Result<HistoryItem, AppError> {
        if identity.is_none() {
            return Err(AppError::SignInRequired);
        }
        let Some(analysis) = analysis else {
            return Err(AppError::Validation(
                "nothing to save: the session has no analysis".to_string(),
            ));
        };
        if jobs.is_empty() {
            return Err(AppError::Validation(
                "nothing to save: the session has no postings".to_string(),
            ));
        }

        let item = HistoryItem {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            profile,
            analysis,
            jobs,
        };

        // The lock spans mutation and persistence so concurrent saves land
        // in insertion order on disk as well as in memory.
        let mut items = self.items.lock().await;
        items.insert(0, item.clone());
        let value = serde_json::to_value(&*items)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
        if let Err(e) = self.store.save(HISTORY_KEY, &value) {
            items.remove(0);
            return Err(AppError::Internal(e));
        }

        info!("Archived session snapshot {} ({} total)", item.id, items.len());
        Ok(item)
    }
}

/// Replaces the live match session with an archived snapshot and moves it
/// straight to `Ready`. Seen keys are recomputed from the restored jobs.
pub async fn restore_session(
    archive: &HistoryArchive,
    session: &SharedSession,
    id: Uuid,
) -> Result<MatchSnapshot, AppError> {
    let item = archive
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("History item {id} not found")))?;

    let mut s = session.lock().await;
    if matches!(s.phase, MatchPhase::Analyzing | MatchPhase::Searching) {
        return Err(AppError::IllegalState(
            "cannot restore while a match is in progress".to_string(),
        ));
    }
    if s.refresh_in_flight {
        return Err(AppError::IllegalState(
            "cannot restore while a refresh is in flight".to_string(),
        ));
    }

    s.reset();
    s.profile = item.profile;
    s.analysis = Some(item.analysis);
    s.seen_keys = SeenKeys::from_jobs(&item.jobs);
    s.jobs = item.jobs;
    s.phase = MatchPhase::Ready;
    info!("Restored session from history item {id}");
    Ok(s.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{sample_analysis, sample_job};
    use crate::matching::session::MatchSession;
    use crate::models::identity::Provider;
    use crate::storage::MemoryStore;

    fn archive() -> (Arc<MemoryStore>, HistoryArchive) {
        let store = Arc::new(MemoryStore::default());
        let archive = HistoryArchive::load(store.clone()).unwrap();
        (store, archive)
    }

    fn profile() -> Profile {
        Profile {
            resume_text: "resume".to_string(),
            expectations: "remote".to_string(),
        }
    }

    fn jobs() -> Vec<JobMatch> {
        vec![
            sample_job("Acme", "Engineer", "https://acme.dev/1"),
            sample_job("Beta", "Engineer", "https://beta.dev/2"),
        ]
    }

    #[tokio::test]
    async fn test_save_requires_identity() {
        let (_, archive) = archive();
        let result = archive
            .save(None, profile(), Some(sample_analysis()), jobs())
            .await;
        assert!(matches!(result, Err(AppError::SignInRequired)));
        assert!(archive.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_requires_analysis_and_jobs() {
        let (_, archive) = archive();
        let identity = Identity::demo(Provider::Google);

        let result = archive
            .save(Some(&identity), profile(), None, jobs())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = archive
            .save(Some(&identity), profile(), Some(sample_analysis()), vec![])
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        assert!(archive.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_prepends_newest_first_and_persists() {
        let (store, archive) = archive();
        let identity = Identity::demo(Provider::Google);

        let first = archive
            .save(Some(&identity), profile(), Some(sample_analysis()), jobs())
            .await
            .unwrap();
        let second = archive
            .save(Some(&identity), profile(), Some(sample_analysis()), jobs())
            .await
            .unwrap();

        let items = archive.list().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
        assert_eq!(items[1].id, first.id);

        // A fresh archive over the same store sees the persisted list.
        let reloaded = HistoryArchive::load(store).unwrap();
        let items = reloaded.list().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
    }

    #[tokio::test]
    async fn test_concurrent_saves_both_land() {
        let (_, archive) = archive();
        let archive = Arc::new(archive);
        let identity = Identity::demo(Provider::Google);

        let a = {
            let archive = archive.clone();
            let identity = identity.clone();
            tokio::spawn(async move {
                archive
                    .save(Some(&identity), profile(), Some(sample_analysis()), jobs())
                    .await
            })
        };
        let b = archive
            .save(Some(&identity), profile(), Some(sample_analysis()), jobs())
            .await;

        assert!(a.await.unwrap().is_ok());
        assert!(b.is_ok());
        assert_eq!(archive.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_restore_replaces_session_and_recomputes_seen_keys() {
        let (_, archive) = archive();
        let identity = Identity::demo(Provider::Google);
        let item = archive
            .save(Some(&identity), profile(), Some(sample_analysis()), jobs())
            .await
            .unwrap();

        let session: SharedSession = Arc::new(Mutex::new(MatchSession::default()));
        let snapshot = restore_session(&archive, &session, item.id).await.unwrap();

        assert_eq!(snapshot.phase, MatchPhase::Ready);
        assert_eq!(snapshot.jobs.len(), 2);
        assert_eq!(snapshot.seen_count, 2);

        let s = session.lock().await;
        assert!(s.seen_keys.contains("Acme-Engineer"));
        assert!(s.seen_keys.contains("Beta-Engineer"));
    }

    #[tokio::test]
    async fn test_restore_mid_phase_is_illegal() {
        let (_, archive) = archive();
        let identity = Identity::demo(Provider::Google);
        let item = archive
            .save(Some(&identity), profile(), Some(sample_analysis()), jobs())
            .await
            .unwrap();

        let session: SharedSession = Arc::new(Mutex::new(MatchSession::default()));
        session.lock().await.phase = MatchPhase::Searching;

        let result = restore_session(&archive, &session, item.id).await;
        assert!(matches!(result, Err(AppError::IllegalState(_))));
    }

    #[tokio::test]
    async fn test_restore_unknown_item_is_not_found() {
        let (_, archive) = archive();
        let session: SharedSession = Arc::new(Mutex::new(MatchSession::default()));

        let result = restore_session(&archive, &session, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
