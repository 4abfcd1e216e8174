// Prompt templates for the four gateway operations.
// Each request is a free-form instruction plus an explicit declaration of
// the JSON shape the model must return; the gateway validates responses
// against that shape with serde and never trusts unguarded field access.

/// System prompt enforcing JSON-only output for every gateway call.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

pub const ANALYZE_SYSTEM: &str = "You are a senior career advisor who produces \
    structured, evidence-based profile analyses.";

pub const ANALYZE_PROMPT_TEMPLATE: &str = "\
Deeply analyze this job seeker's resume and expectations and produce a \
structured profile report. In `summary`, include a note of how many core \
experiences you identified.

Resume:
{resume_text}

Expectations:
{expectations}

Respond with a JSON object of exactly this shape:
{\"keywords\": [string], \"summary\": string, \"suggested_roles\": [string], \"strengths\": [string]}";

pub const SEARCH_SYSTEM: &str = "You are an expert headhunter who verifies that \
    postings are live and links are real before recommending them.";

pub const SEARCH_PROMPT_TEMPLATE: &str = "\
Find live job postings on company sites or major job boards that match this \
candidate, and score each against the profile.

Candidate background: {summary}
Expectations: {expectations}
{exclusions}
Requirements: only postings you believe are currently open, with real \
absolute links. In each `reason`, mention how many highly relevant \
experiences support the match.

Respond with a JSON array where every element has exactly this shape:
{\"title\": string, \"company\": string, \"location\": string, \"salary\": string, \
\"match_score\": number, \"reason\": string, \"url\": string, \"jd_summary\": string, \
\"skills_match\": [string], \"requirements_missing\": [string]}";

/// Inserted into the search prompt when previously seen postings must be
/// biased away from. Best-effort: local dedup still applies.
pub const SEARCH_EXCLUSIONS_TEMPLATE: &str = "Exclude these already-seen postings: {keys}\n";

pub const DIAGNOSE_SYSTEM: &str = "You are a resume coach diagnosing fit \
    between one resume and one specific job.";

pub const DIAGNOSE_PROMPT_TEMPLATE: &str = "\
Compare the requirements of \"{title} @ {company}\" with the resume below.

JD summary: {jd_summary}

Resume:
{resume_text}

Produce a diagnosis: a fit overview, core gaps, and quick improvements. In \
`match_overview`, state how many core requirements you parsed from the JD.

Respond with a JSON object of exactly this shape:
{\"match_overview\": string, \"score\": number, \"core_gaps\": [string], \"quick_wins\": [string]}";

pub const DEEP_REWRITE_SYSTEM: &str = "You are a resume coach performing deep \
    semantic rewrites, not keyword stuffing.";

pub const DEEP_REWRITE_PROMPT_TEMPLATE: &str = "\
Perform a deep semantic optimization targeted at \"{title}\". Pick the 2-3 \
passages from the resume below that most need rewriting for this role.

Resume:
{resume_text}

For each passage provide the original sentence, the improved sentence, and \
the reasoning behind the rewrite.

Respond with a JSON array where every element has exactly this shape:
{\"section\": string, \"original\": string, \"improved\": string, \"reasoning\": string}";
