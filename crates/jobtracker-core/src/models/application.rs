use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Interview, Note};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    /// Parse the backend code (`applied`, `offer`, ...), case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
            ApplicationStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Applied => write!(f, "Applied"),
            ApplicationStatus::Interview => write!(f, "Interview"),
            ApplicationStatus::Offer => write!(f, "Offer"),
            ApplicationStatus::Rejected => write!(f, "Rejected"),
            ApplicationStatus::Withdrawn => write!(f, "Withdrawn"),
            ApplicationStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Row returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplicationSummary {
    pub id: i64,
    pub company_name: String,
    pub position_title: String,
    pub application_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub interview_count: u32,
    #[serde(default)]
    pub note_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Full application record with nested interviews and notes.
///
/// The search endpoint also returns this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: i64,
    pub company_name: String,
    pub position_title: String,
    #[serde(default)]
    pub job_description: String,
    pub application_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    // Decimal fields arrive as strings ("85000.00")
    #[serde(default)]
    pub salary_min: Option<String>,
    #[serde(default)]
    pub salary_max: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub general_notes: String,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub interviews: Vec<Interview>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Writable fields for create (POST) and update (PUT).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewJobApplication {
    pub company_name: String,
    pub position_title: String,
    pub application_date: NaiveDate,
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_person: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub general_notes: String,
}

impl NewJobApplication {
    pub fn new(company_name: &str, position_title: &str, application_date: NaiveDate) -> Self {
        Self {
            company_name: company_name.to_string(),
            position_title: position_title.to_string(),
            application_date,
            ..Self::default()
        }
    }
}

impl JobApplication {
    /// Label used in lists and headers: "Position at Company".
    pub fn title(&self) -> String {
        format!("{} at {}", self.position_title, self.company_name)
    }

    /// Editable copy of this record, for a read-modify-write update.
    pub fn to_update(&self) -> Option<NewJobApplication> {
        Some(NewJobApplication {
            company_name: self.company_name.clone(),
            position_title: self.position_title.clone(),
            application_date: self.application_date?,
            status: self.status,
            job_description: self.job_description.clone(),
            contact_person: self.contact_person.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
            salary_min: self.salary_min.clone(),
            salary_max: self.salary_max.clone(),
            location: self.location.clone(),
            job_url: self.job_url.clone(),
            source: self.source.clone(),
            general_notes: self.general_notes.clone(),
        })
    }
}
