use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default interview length when the backend omits it
const DEFAULT_DURATION_MINUTES: u32 = 60;

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Phone,
    Video,
    Onsite,
    Technical,
    Behavioral,
    Final,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for InterviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterviewType::Phone => write!(f, "Phone"),
            InterviewType::Video => write!(f, "Video"),
            InterviewType::Onsite => write!(f, "On-site"),
            InterviewType::Technical => write!(f, "Technical"),
            InterviewType::Behavioral => write!(f, "Behavioral"),
            InterviewType::Final => write!(f, "Final"),
            InterviewType::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterviewStatus::Scheduled => write!(f, "Scheduled"),
            InterviewStatus::Completed => write!(f, "Completed"),
            InterviewStatus::Cancelled => write!(f, "Cancelled"),
            InterviewStatus::Rescheduled => write!(f, "Rescheduled"),
            InterviewStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: i64,
    pub interview_type: InterviewType,
    #[serde(default)]
    pub status: InterviewStatus,
    pub scheduled_date: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub interviewer_name: String,
    #[serde(default)]
    pub interviewer_title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub meeting_link: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Interview {
    pub fn formatted_date(&self) -> String {
        self.scheduled_date.format("%b %d, %Y %H:%M").to_string()
    }

    /// Where the interview happens: the meeting link for remote ones,
    /// otherwise the location, otherwise "TBD".
    pub fn venue(&self) -> &str {
        if !self.meeting_link.is_empty() {
            &self.meeting_link
        } else if !self.location.is_empty() {
            &self.location
        } else {
            "TBD"
        }
    }
}

/// Writable fields for scheduling an interview against an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInterview {
    pub job_application: i64,
    pub interview_type: InterviewType,
    pub status: InterviewStatus,
    pub scheduled_date: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub interviewer_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub interviewer_title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meeting_link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl NewInterview {
    pub fn new(
        job_application: i64,
        interview_type: InterviewType,
        scheduled_date: DateTime<Utc>,
    ) -> Self {
        Self {
            job_application,
            interview_type,
            status: InterviewStatus::Scheduled,
            scheduled_date,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            interviewer_name: String::new(),
            interviewer_title: String::new(),
            location: String::new(),
            meeting_link: String::new(),
            notes: String::new(),
        }
    }
}
