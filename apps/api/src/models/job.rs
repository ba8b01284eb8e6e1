use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{first_missing, Collection, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Expired,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Expired => "expired",
        }
    }
}

/// A private-sector job posting, stored under `(category, jobId)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub category: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub original_link: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub batch: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_on: Option<String>,
    #[serde(default)]
    pub expires_on: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
}

impl Record for Job {
    const COLLECTION: Collection = Collection::Jobs;

    fn id(&self) -> &str {
        &self.job_id
    }

    fn partition(&self) -> &str {
        &self.category
    }

    fn timestamp(&self) -> Option<&str> {
        self.posted_on.as_deref()
    }
}

/// Admin-supplied fields for a new job. The server assigns id, timestamp and status.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub role: Option<String>,
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_description: Option<String>,
    pub original_link: Option<String>,
    pub category: Option<String>,
    pub expires_on: Option<String>,
    #[serde(default, deserialize_with = "list_or_csv")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "list_or_csv")]
    pub batch: Vec<String>,
    pub experience: Option<String>,
}

impl JobDraft {
    /// Checks required fields and builds an active job with a fresh identifier.
    pub fn into_job(self) -> Result<Job, AppError> {
        let missing = first_missing(&[
            ("role", self.role.as_deref()),
            ("companyName", self.company_name.as_deref()),
            ("location", self.location.as_deref()),
            ("salary", self.salary.as_deref()),
            ("jobDescription", self.job_description.as_deref()),
            ("originalLink", self.original_link.as_deref()),
            ("category", self.category.as_deref()),
            ("expiresOn", self.expires_on.as_deref()),
        ]);
        if let Some(field) = missing {
            return Err(AppError::Validation(format!("{field} is required")));
        }

        Ok(Job {
            job_id: Uuid::new_v4().to_string(),
            category: self.category.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            company_name: self.company_name.unwrap_or_default(),
            company_logo: self.company_logo,
            location: self.location.unwrap_or_default(),
            salary: self.salary.unwrap_or_default(),
            job_description: self.job_description.unwrap_or_default(),
            original_link: self.original_link.unwrap_or_default(),
            tags: self.tags,
            batch: self.batch,
            posted_on: Some(Utc::now().to_rfc3339()),
            expires_on: self.expires_on.unwrap_or_default(),
            status: JobStatus::Active,
            experience: self.experience,
        })
    }
}

/// Accepts either a JSON list or a comma-separated string (spreadsheet rows).
pub(crate) fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
        Number(serde_json::Number),
    }

    let raw = Option::<ListOrCsv>::deserialize(deserializer)?;
    let values = match raw {
        None => vec![],
        Some(ListOrCsv::List(items)) => items,
        Some(ListOrCsv::Csv(s)) => s.split(',').map(str::to_string).collect(),
        Some(ListOrCsv::Number(n)) => n.to_string().split(',').map(str::to_string).collect(),
    };
    Ok(values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}
