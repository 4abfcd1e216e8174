//! AI Gateway — the four typed operations against the language model.
//!
//! Stateless: each operation is a single request/response round trip whose
//! output shape is validated before it is returned. All calls go through
//! `llm_client`; no session state lives here.
//!
//! Carried in `AppState` as `Arc<dyn MatchIntel>` so orchestrators are
//! tested against a stub without a network.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, LlmClient, LlmError};
use crate::models::analysis::AnalysisResult;
use crate::models::job::{retain_valid_urls, JobMatch};
use crate::models::optimize::{OptimizationDiagnosis, OptimizationStep};
use crate::models::profile::Profile;

pub mod prompts;

/// Bounded-input contract: rewrite prompts carry at most this many chars of
/// resume text. Callers must not assume the full resume was considered.
const DIAGNOSE_RESUME_MAX_CHARS: usize = 2000;
const DEEP_REWRITE_RESUME_MAX_CHARS: usize = 2500;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The gateway seam. Orchestrators depend on this trait, never on the
/// concrete LLM-backed implementation.
#[async_trait]
pub trait MatchIntel: Send + Sync {
    /// Structured profile analysis. Fails with `Configuration` when no
    /// credential is set, `Upstream` on transport or shape failure.
    async fn analyze(&self, profile: &Profile) -> Result<AnalysisResult, AppError>;

    /// One batch of live postings, already URL-filtered. `exclude_keys`
    /// biases results away from seen postings (best-effort hint only).
    /// An unparseable payload is a soft empty batch, not an error.
    async fn search_jobs(
        &self,
        profile: &Profile,
        analysis: &AnalysisResult,
        exclude_keys: &[String],
    ) -> Result<Vec<JobMatch>, AppError>;

    /// Fit diagnosis for one (resume, job) pairing.
    async fn diagnose(
        &self,
        resume_text: &str,
        job: &JobMatch,
    ) -> Result<OptimizationDiagnosis, AppError>;

    /// Ordered rewrite steps for one (resume, job) pairing.
    async fn deep_optimize(
        &self,
        resume_text: &str,
        job: &JobMatch,
    ) -> Result<Vec<OptimizationStep>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmGateway {
    llm: LlmClient,
}

impl LlmGateway {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl MatchIntel for LlmGateway {
    async fn analyze(&self, profile: &Profile) -> Result<AnalysisResult, AppError> {
        let prompt = prompts::ANALYZE_PROMPT_TEMPLATE
            .replace("{resume_text}", &profile.resume_text)
            .replace("{expectations}", &profile.expectations);

        self.llm
            .call_json::<AnalysisResult>(&prompt, &compose_system(prompts::ANALYZE_SYSTEM))
            .await
            .map_err(|e| map_llm_error("Profile analysis", e))
    }

    async fn search_jobs(
        &self,
        profile: &Profile,
        analysis: &AnalysisResult,
        exclude_keys: &[String],
    ) -> Result<Vec<JobMatch>, AppError> {
        let exclusions = if exclude_keys.is_empty() {
            String::new()
        } else {
            prompts::SEARCH_EXCLUSIONS_TEMPLATE.replace("{keys}", &exclude_keys.join(", "))
        };

        let prompt = prompts::SEARCH_PROMPT_TEMPLATE
            .replace("{summary}", &analysis.summary)
            .replace("{expectations}", &profile.expectations)
            .replace("{exclusions}", &exclusions);

        // Transport/API failures are hard errors; an unparseable payload is
        // the soft "no more jobs" outcome and must not raise.
        let response = self
            .llm
            .call(&prompt, &compose_system(prompts::SEARCH_SYSTEM))
            .await
            .map_err(|e| map_llm_error("Job search", e))?;

        let Some(text) = response.text() else {
            warn!("Job search returned no text content; treating as empty batch");
            return Ok(Vec::new());
        };

        let batch: Vec<JobMatch> = match serde_json::from_str(strip_json_fences(text)) {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Job search payload did not parse ({e}); treating as empty batch");
                return Ok(Vec::new());
            }
        };

        let raw_count = batch.len();
        let kept = retain_valid_urls(batch);
        if kept.len() < raw_count {
            info!(
                "Dropped {} search result(s) with malformed URLs",
                raw_count - kept.len()
            );
        }
        Ok(kept)
    }

    async fn diagnose(
        &self,
        resume_text: &str,
        job: &JobMatch,
    ) -> Result<OptimizationDiagnosis, AppError> {
        let prompt = prompts::DIAGNOSE_PROMPT_TEMPLATE
            .replace("{title}", &job.title)
            .replace("{company}", &job.company)
            .replace("{jd_summary}", &job.jd_summary)
            .replace("{resume_text}", char_prefix(resume_text, DIAGNOSE_RESUME_MAX_CHARS));

        self.llm
            .call_json::<OptimizationDiagnosis>(&prompt, &compose_system(prompts::DIAGNOSE_SYSTEM))
            .await
            .map_err(|e| map_llm_error("Fit diagnosis", e))
    }

    async fn deep_optimize(
        &self,
        resume_text: &str,
        job: &JobMatch,
    ) -> Result<Vec<OptimizationStep>, AppError> {
        let prompt = prompts::DEEP_REWRITE_PROMPT_TEMPLATE
            .replace("{title}", &job.title)
            .replace(
                "{resume_text}",
                char_prefix(resume_text, DEEP_REWRITE_RESUME_MAX_CHARS),
            );

        self.llm
            .call_json::<Vec<OptimizationStep>>(&prompt, &compose_system(prompts::DEEP_REWRITE_SYSTEM))
            .await
            .map_err(|e| map_llm_error("Deep rewrite", e))
    }
}

/// Every operation shares the JSON-only output discipline on top of its
/// own persona.
fn compose_system(persona: &str) -> String {
    format!("{persona} {}", prompts::JSON_ONLY_SYSTEM)
}

fn map_llm_error(operation: &str, e: LlmError) -> AppError {
    match e {
        LlmError::MissingApiKey => AppError::Configuration(
            "ANTHROPIC_API_KEY is not set; AI operations are unavailable".to_string(),
        ),
        other => AppError::Upstream(format!("{operation} failed: {other}")),
    }
}

/// First `max_chars` characters of `s`, never splitting a char boundary.
fn char_prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test stub
// ────────────────────────────────────────────────────────────────────────────

/// Scriptable in-memory gateway for orchestrator tests. Honors the same
/// contract as `LlmGateway`: search batches come back URL-filtered.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    pub fn sample_analysis() -> AnalysisResult {
        AnalysisResult {
            keywords: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            summary: "Backend engineer, 5 years, infrastructure heavy.".to_string(),
            suggested_roles: vec!["Platform Engineer".to_string()],
            strengths: vec!["Owns services end to end".to_string()],
        }
    }

    pub fn sample_job(company: &str, title: &str, url: &str) -> JobMatch {
        JobMatch {
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            salary: "$130k".to_string(),
            match_score: 85.0,
            reason: "Direct experience overlap".to_string(),
            url: url.to_string(),
            jd_summary: "Build and run backend services.".to_string(),
            skills_match: None,
            requirements_missing: None,
        }
    }

    pub fn sample_diagnosis() -> OptimizationDiagnosis {
        OptimizationDiagnosis {
            match_overview: "Parsed 4 core requirements; solid overlap.".to_string(),
            score: 78.0,
            core_gaps: vec!["No Kafka exposure stated".to_string()],
            quick_wins: vec!["Quantify throughput work".to_string()],
        }
    }

    pub fn sample_steps(n: usize) -> Vec<OptimizationStep> {
        (0..n)
            .map(|i| OptimizationStep {
                section: format!("Section {i}"),
                original: format!("original {i}"),
                improved: format!("improved {i}"),
                reasoning: format!("reasoning {i}"),
            })
            .collect()
    }

    #[derive(Default)]
    pub struct StubIntel {
        pub fail_analyze: bool,
        pub fail_search: bool,
        pub fail_diagnose: bool,
        pub fail_deep: bool,
        /// Each search call pops the next batch; exhausted → empty batch.
        pub batches: Mutex<VecDeque<Vec<JobMatch>>>,
        pub steps: Vec<OptimizationStep>,
        /// Exclusion lists observed by each search call, in order.
        pub recorded_exclusions: Mutex<Vec<Vec<String>>>,
        /// Artificial latency before search returns, for in-flight tests.
        pub search_delay: Option<Duration>,
    }

    impl StubIntel {
        pub fn with_batches(batches: Vec<Vec<JobMatch>>) -> Self {
            Self {
                batches: Mutex::new(batches.into()),
                steps: sample_steps(3),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl MatchIntel for StubIntel {
        async fn analyze(&self, _profile: &Profile) -> Result<AnalysisResult, AppError> {
            if self.fail_analyze {
                return Err(AppError::Upstream("analysis stub failure".to_string()));
            }
            Ok(sample_analysis())
        }

        async fn search_jobs(
            &self,
            _profile: &Profile,
            _analysis: &AnalysisResult,
            exclude_keys: &[String],
        ) -> Result<Vec<JobMatch>, AppError> {
            if let Some(delay) = self.search_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_search {
                return Err(AppError::Upstream("search stub failure".to_string()));
            }
            self.recorded_exclusions
                .lock()
                .unwrap()
                .push(exclude_keys.to_vec());
            let batch = self
                .batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();
            Ok(retain_valid_urls(batch))
        }

        async fn diagnose(
            &self,
            _resume_text: &str,
            _job: &JobMatch,
        ) -> Result<OptimizationDiagnosis, AppError> {
            if self.fail_diagnose {
                return Err(AppError::Upstream("diagnosis stub failure".to_string()));
            }
            Ok(sample_diagnosis())
        }

        async fn deep_optimize(
            &self,
            _resume_text: &str,
            _job: &JobMatch,
        ) -> Result<Vec<OptimizationStep>, AppError> {
            if self.fail_deep {
                return Err(AppError::Upstream("deep rewrite stub failure".to_string()));
            }
            Ok(self.steps.clone())
        }
    }
}
