use serde::{Deserialize, Serialize};

/// A seeker's working profile: raw resume text plus stated expectations.
///
/// Mutable while the user edits; snapshotted by value when a match session
/// starts and frozen inside any archived history item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub resume_text: String,
    pub expectations: String,
}

impl Profile {
    /// Both fields must be non-empty before a match session may start.
    pub fn is_complete(&self) -> bool {
        !self.resume_text.trim().is_empty() && !self.expectations.trim().is_empty()
    }
}
