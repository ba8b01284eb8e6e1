// Prompt constants for résumé-to-job compatibility analysis.

use crate::models::Job;

/// Upper bound on job description characters sent to the model.
pub const MAX_DESCRIPTION_CHARS: usize = 4_000;
/// Upper bound on résumé characters sent to the model.
pub const MAX_DOCUMENT_CHARS: usize = 12_000;

pub const ANALYSIS_SYSTEM: &str = "You are an experienced technical recruiter. \
    Compare a candidate's CV with a job posting and judge how well they fit. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Replace `{role}`, `{company}`, `{location}`, `{description}`, `{tags}` and
/// `{cv}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following CV against this job description.

JOB DETAILS:
Role: {role}
Company: {company}
Location: {location}
Job Description: {description}
Required Skills/Tags: {tags}

CV CONTENT:
{cv}

Return a JSON object with this EXACT schema (no extra fields):
{
  "compatibilityScore": 72,
  "strengths": ["3-5 key strengths that match the job"],
  "weaknesses": ["2-4 areas that need improvement"],
  "improvements": [
    "a specific suggestion",
    {"before": "a line from the CV", "after": "the same line rewritten"}
  ],
  "matchingSkills": ["skills from the CV that match the job requirements"],
  "missingSkills": ["important skills missing from the CV"]
}

compatibilityScore is an integer between 0 and 100."#;

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Builds the analysis prompt. Output depends only on the inputs and is
/// bounded by the truncation limits above.
pub fn build_analysis_prompt(job: &Job, document_text: &str) -> String {
    let tags = if job.tags.is_empty() {
        "Not specified".to_string()
    } else {
        job.tags.join(", ")
    };

    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("role", job.role.as_str()),
            ("company", job.company_name.as_str()),
            ("location", job.location.as_str()),
            ("tags", tags.as_str()),
            (
                "description",
                truncate_chars(job.job_description.trim(), MAX_DESCRIPTION_CHARS),
            ),
            ("cv", truncate_chars(document_text.trim(), MAX_DOCUMENT_CHARS)),
        ],
    )
}

/// Substitutes `{name}` placeholders in a single left-to-right pass. Inserted
/// values are never rescanned; unknown `{...}` text is copied as-is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
