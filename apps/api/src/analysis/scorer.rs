//! Compatibility scoring: a pluggable model behind a trait, with a
//! deterministic local fallback.
//!
//! The model (an LLM by default) produces the judgment; this module owns the
//! prompt, validates the reply into `AnalysisResult`, and falls back to a
//! keyword heuristic whenever the model is missing, fails, or replies with
//! something unusable. `analyze` never returns an error.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::Job;

const MAX_STRENGTHS: usize = 5;
const MAX_WEAKNESSES: usize = 4;
const MAX_IMPROVEMENTS: usize = 5;
const MAX_SKILLS: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Result shape
// ────────────────────────────────────────────────────────────────────────────

/// A suggested change: either a plain statement or a concrete rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Improvement {
    Rewrite { before: String, after: String },
    Plain(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub compatibility_score: u8, // 0 – 100
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<Improvement>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub source: AnalysisSource,
}

/// Reply shape expected from the model, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    pub compatibility_score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("model reply rejected: {0}")]
    Invalid(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Model trait
// ────────────────────────────────────────────────────────────────────────────

/// The external judgment capability: prompt in, structured reply out.
#[async_trait]
pub trait CompatibilityModel: Send + Sync {
    async fn score(&self, prompt: &str) -> Result<RawAnalysis, ScoringError>;
}

#[async_trait]
impl CompatibilityModel for LlmClient {
    async fn score(&self, prompt: &str) -> Result<RawAnalysis, ScoringError> {
        Ok(self.call_json::<RawAnalysis>(prompt, ANALYSIS_SYSTEM).await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CompatibilityScorer {
    model: Option<Arc<dyn CompatibilityModel>>,
}

impl CompatibilityScorer {
    pub fn new(model: Option<Arc<dyn CompatibilityModel>>) -> Self {
        Self { model }
    }

    /// Scorer that only ever uses the local heuristic.
    pub fn offline() -> Self {
        Self { model: None }
    }

    pub async fn analyze(&self, job: &Job, document_text: &str) -> AnalysisResult {
        let Some(model) = &self.model else {
            return fallback_analysis(job, document_text);
        };

        let prompt = build_analysis_prompt(job, document_text);
        match model.score(&prompt).await.and_then(validate) {
            Ok(result) => {
                info!(
                    "Model analysis for job {}: score {}",
                    job.job_id, result.compatibility_score
                );
                result
            }
            Err(e) => {
                warn!("Compatibility model unavailable for job {}, using fallback: {e}", job.job_id);
                fallback_analysis(job, document_text)
            }
        }
    }
}

/// Normalizes a model reply into the fixed result shape.
fn validate(raw: RawAnalysis) -> Result<AnalysisResult, ScoringError> {
    if !raw.compatibility_score.is_finite() {
        return Err(ScoringError::Invalid(
            "compatibilityScore is not a number".to_string(),
        ));
    }
    let score = raw.compatibility_score.round().clamp(0.0, 100.0) as u8;

    let improvements: Vec<Improvement> = raw
        .improvements
        .into_iter()
        .filter_map(|imp| match imp {
            Improvement::Plain(text) => {
                let text = text.trim().to_string();
                (!text.is_empty()).then_some(Improvement::Plain(text))
            }
            Improvement::Rewrite { before, after } => {
                let after = after.trim().to_string();
                (!after.is_empty()).then(|| Improvement::Rewrite {
                    before: before.trim().to_string(),
                    after,
                })
            }
        })
        .take(MAX_IMPROVEMENTS)
        .collect();

    Ok(AnalysisResult {
        compatibility_score: score,
        strengths: clean(raw.strengths, MAX_STRENGTHS),
        weaknesses: clean(raw.weaknesses, MAX_WEAKNESSES),
        improvements,
        matching_skills: clean(raw.matching_skills, MAX_SKILLS),
        missing_skills: clean(raw.missing_skills, MAX_SKILLS),
        source: AnalysisSource::Model,
    })
}

/// Trims, drops blanks and case-insensitive duplicates, caps length.
fn clean(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(cap)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Deterministic fallback
// ────────────────────────────────────────────────────────────────────────────

/// True when `needle` occurs in `haystack` not flanked by alphanumerics.
/// Both sides are expected lowercase.
fn mentions(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Keyword heuristic over the job's tags. Same inputs, same output.
///
/// score = 40 + 60 × matched / total tags (50 when the job lists no tags)
pub fn fallback_analysis(job: &Job, document_text: &str) -> AnalysisResult {
    let text = document_text.to_lowercase();
    let tags = clean(job.tags.clone(), usize::MAX);

    let (matching_skills, missing_skills): (Vec<String>, Vec<String>) = tags
        .into_iter()
        .partition(|tag| mentions(&text, &tag.to_lowercase()));

    let total = matching_skills.len() + missing_skills.len();
    let score = if total == 0 {
        50
    } else {
        (40.0 + 60.0 * matching_skills.len() as f64 / total as f64).round() as u8
    };

    let mut strengths = Vec::new();
    if !matching_skills.is_empty() {
        strengths.push(format!(
            "Covers {} of {} listed skills: {}",
            matching_skills.len(),
            total,
            matching_skills.join(", ")
        ));
    }
    strengths.push(format!(
        "Background can be compared directly with the {} role at {}",
        job.role, job.company_name
    ));

    let mut weaknesses = Vec::new();
    if !missing_skills.is_empty() {
        weaknesses.push(format!("No mention of: {}", missing_skills.join(", ")));
    }
    if document_text.trim().is_empty() {
        weaknesses.push("The CV contained no readable text".to_string());
    }

    let mut improvements: Vec<Improvement> = missing_skills
        .iter()
        .take(3)
        .map(|skill| Improvement::Plain(format!("Add concrete evidence of {skill} experience")))
        .collect();
    improvements.push(Improvement::Plain(
        "Quantify achievements with numbers and metrics".to_string(),
    ));
    improvements.push(Improvement::Plain(format!(
        "Tailor the skills section to the {} posting",
        job.role
    )));

    AnalysisResult {
        compatibility_score: score,
        strengths,
        weaknesses,
        improvements,
        matching_skills,
        missing_skills,
        source: AnalysisSource::Fallback,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
