use serde::{Deserialize, Serialize};

/// Structured profile analysis produced once per match session.
/// Immutable after creation; the search phase and history snapshots
/// consume it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub keywords: Vec<String>,
    pub summary: String,
    pub suggested_roles: Vec<String>,
    pub strengths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_result_deserializes() {
        let json = r#"{
            "keywords": ["Rust", "distributed systems"],
            "summary": "Backend engineer with infrastructure depth.",
            "suggested_roles": ["Platform Engineer", "SRE"],
            "strengths": ["Ownership of production systems"]
        }"#;

        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.keywords.len(), 2);
        assert_eq!(analysis.suggested_roles[1], "SRE");
        assert!(!analysis.summary.is_empty());
    }

    #[test]
    fn test_analysis_result_missing_field_fails() {
        // A payload without `strengths` must be rejected, not defaulted.
        let json = r#"{
            "keywords": [],
            "summary": "x",
            "suggested_roles": []
        }"#;
        let result: Result<AnalysisResult, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
