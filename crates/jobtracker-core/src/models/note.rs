use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating or replacing a note on an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNote {
    pub job_application: i64,
    pub title: String,
    pub content: String,
}

impl NewNote {
    pub fn new(job_application: i64, title: &str, content: &str) -> Self {
        Self {
            job_application,
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}
