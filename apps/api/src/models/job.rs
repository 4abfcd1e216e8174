//! Job posting matches and the identity-key scheme used to deduplicate them.

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// A single job posting matched against the seeker's profile.
///
/// Produced in batches by the gateway's search operation. `skills_match`
/// and `requirements_missing` are optional in the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    /// 0–100 fit score assigned upstream.
    pub match_score: f64,
    pub reason: String,
    pub url: String,
    pub jd_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_match: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_missing: Option<Vec<String>>,
}

impl JobMatch {
    /// Dedup key within one user's result set: `company-title`.
    /// Not globally unique, but sufficient for session-scoped exclusion.
    pub fn identity_key(&self) -> String {
        format!("{}-{}", self.company, self.title)
    }

    /// A posting is only shown if its URL is a well-formed absolute
    /// http(s) URL. Anything else is dropped silently upstream of display.
    pub fn has_valid_url(&self) -> bool {
        match Url::parse(&self.url) {
            Ok(url) => matches!(url.scheme(), "http" | "https"),
            Err(_) => false,
        }
    }
}

/// Filters a raw search batch down to entries with valid absolute URLs,
/// preserving relative order. Malformed entries are not an error.
pub fn retain_valid_urls(batch: Vec<JobMatch>) -> Vec<JobMatch> {
    batch.into_iter().filter(JobMatch::has_valid_url).collect()
}
