use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::job::JobMatch;
use crate::models::profile::Profile;

/// An immutable deep snapshot of a completed match session.
///
/// Created only by an explicit save; never mutated afterwards. The archive
/// keeps items newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub profile: Profile,
    pub analysis: AnalysisResult,
    pub jobs: Vec<JobMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_item_roundtrip() {
        let item = HistoryItem {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            profile: Profile {
                resume_text: "resume".to_string(),
                expectations: "remote".to_string(),
            },
            analysis: AnalysisResult {
                keywords: vec!["Rust".to_string()],
                summary: "summary".to_string(),
                suggested_roles: vec![],
                strengths: vec![],
            },
            jobs: vec![],
        };

        let json = serde_json::to_value(&item).unwrap();
        let back: HistoryItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, item.id);
        assert_eq!(back.profile.resume_text, "resume");
    }
}
