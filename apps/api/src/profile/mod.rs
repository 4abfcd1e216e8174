//! Profile store — the seeker's working resume text and expectations.
//!
//! Freely mutable through edits and document import until a match session
//! snapshots it by value; archived snapshots are immutable copies.

pub mod extract;
pub mod handlers;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::profile::Profile;

/// The editable draft plus display metadata for an imported document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileDraft {
    #[serde(flatten)]
    pub profile: Profile,
    /// Display name of the imported document, if the resume came from one.
    pub source_name: Option<String>,
}

#[derive(Default)]
pub struct ProfileStore {
    draft: RwLock<ProfileDraft>,
}

impl ProfileStore {
    pub async fn get(&self) -> ProfileDraft {
        self.draft.read().await.clone()
    }

    /// Value snapshot handed to a starting match session.
    pub async fn snapshot(&self) -> Profile {
        self.draft.read().await.profile.clone()
    }

    /// Partial free-text edit. Replacing the resume text by hand drops the
    /// imported-document name, which no longer describes the content.
    pub async fn edit(
        &self,
        resume_text: Option<String>,
        expectations: Option<String>,
    ) -> ProfileDraft {
        let mut draft = self.draft.write().await;
        if let Some(resume_text) = resume_text {
            draft.profile.resume_text = resume_text;
            draft.source_name = None;
        }
        if let Some(expectations) = expectations {
            draft.profile.expectations = expectations;
        }
        draft.clone()
    }

    /// Replaces the resume text with freshly extracted document text.
    pub async fn import(&self, resume_text: String, source_name: String) -> ProfileDraft {
        let mut draft = self.draft.write().await;
        draft.profile.resume_text = resume_text;
        draft.source_name = Some(source_name);
        draft.clone()
    }
}
