use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{first_missing, Collection, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GovernmentJobStatus {
    #[default]
    Active,
    ResultOut,
    Closed,
}

impl GovernmentJobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GovernmentJobStatus::Active => "active",
            GovernmentJobStatus::ResultOut => "result-out",
            GovernmentJobStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportantDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<String>,
}

/// A government recruitment notice, stored under `(organization, jobId)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernmentJob {
    pub job_id: String,
    pub organization: String,
    #[serde(default)]
    pub post_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertisement_no: Option<String>,
    #[serde(default)]
    pub important_dates: ImportantDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacancy_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    #[serde(default)]
    pub official_website: String,
    #[serde(default)]
    pub notification_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: GovernmentJobStatus,
}

impl Record for GovernmentJob {
    const COLLECTION: Collection = Collection::GovernmentJobs;

    fn id(&self) -> &str {
        &self.job_id
    }

    fn partition(&self) -> &str {
        &self.organization
    }

    fn timestamp(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernmentJobDraft {
    pub post_name: Option<String>,
    pub organization: Option<String>,
    pub advertisement_no: Option<String>,
    #[serde(default)]
    pub important_dates: ImportantDates,
    // Spreadsheet rows carry the dates flat rather than nested.
    pub application_start: Option<String>,
    pub application_end: Option<String>,
    pub exam_date: Option<String>,
    pub application_fee: Option<String>,
    pub vacancy_details: Option<String>,
    pub eligibility: Option<String>,
    pub official_website: Option<String>,
    pub notification_link: Option<String>,
    pub apply_link: Option<String>,
    pub result_link: Option<String>,
}

impl GovernmentJobDraft {
    pub fn into_job(self) -> Result<GovernmentJob, AppError> {
        let missing = first_missing(&[
            ("postName", self.post_name.as_deref()),
            ("organization", self.organization.as_deref()),
            ("officialWebsite", self.official_website.as_deref()),
            ("notificationLink", self.notification_link.as_deref()),
        ]);
        if let Some(field) = missing {
            return Err(AppError::Validation(format!("{field} is required")));
        }

        let important_dates = ImportantDates {
            application_start: self
                .important_dates
                .application_start
                .or(self.application_start),
            application_end: self.important_dates.application_end.or(self.application_end),
            exam_date: self.important_dates.exam_date.or(self.exam_date),
        };

        Ok(GovernmentJob {
            job_id: Uuid::new_v4().to_string(),
            organization: self.organization.unwrap_or_default(),
            post_name: self.post_name.unwrap_or_default(),
            advertisement_no: self.advertisement_no,
            important_dates,
            application_fee: self.application_fee,
            vacancy_details: self.vacancy_details,
            eligibility: self.eligibility,
            official_website: self.official_website.unwrap_or_default(),
            notification_link: self.notification_link.unwrap_or_default(),
            apply_link: self.apply_link,
            result_link: self.result_link,
            created_at: Some(Utc::now().to_rfc3339()),
            status: GovernmentJobStatus::Active,
        })
    }
}
