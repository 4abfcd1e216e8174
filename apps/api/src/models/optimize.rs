use serde::{Deserialize, Serialize};

/// Expert diagnosis of one (job, resume) pairing. Produced fresh on every
/// optimization open; never persisted across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationDiagnosis {
    pub match_overview: String,
    /// 0–100 suggested fit after rewrites.
    pub score: f64,
    pub core_gaps: Vec<String>,
    pub quick_wins: Vec<String>,
}

/// One rewrite suggestion: a resume passage and its improved form.
/// Steps arrive as an ordered sequence and are revealed in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationStep {
    pub section: String,
    pub original: String,
    pub improved: String,
    pub reasoning: String,
}
