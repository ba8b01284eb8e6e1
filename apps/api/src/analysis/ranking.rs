//! Local alternative-job ranking by tag overlap with matched skills.

use serde::{Deserialize, Serialize};

use crate::models::{Job, JobStatus};

pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedJob {
    pub job_id: String,
    pub role: String,
    pub company_name: String,
    pub location: String,
    pub match_score: usize,
}

/// Number of `tags` containing (case-insensitively) at least one token.
/// A tag counts once however many tokens it contains.
fn match_count(tags: &[String], tokens: &[String]) -> usize {
    tags.iter()
        .filter(|tag| {
            let tag = tag.to_lowercase();
            tokens.iter().any(|token| tag.contains(token.as_str()))
        })
        .count()
}

/// Ranks active jobs other than `exclude_id` by tag overlap with
/// `matched_skills`, highest first. Equal scores keep pool order.
pub fn rank_alternatives(
    matched_skills: &[String],
    exclude_id: &str,
    pool: &[Job],
) -> Vec<SuggestedJob> {
    let tokens: Vec<String> = matched_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut ranked: Vec<SuggestedJob> = pool
        .iter()
        .filter(|job| job.status == JobStatus::Active && job.job_id != exclude_id)
        .map(|job| SuggestedJob {
            job_id: job.job_id.clone(),
            role: job.role.clone(),
            company_name: job.company_name.clone(),
            location: job.location.clone(),
            match_score: match_count(&job.tags, &tokens),
        })
        .collect();

    // `sort_by` is stable, which preserves pool order among ties.
    ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    ranked.truncate(MAX_SUGGESTIONS);
    ranked
}
