//! Typed endpoints for applications, interviews and notes.
//!
//! These are thin wrappers: every call goes through [`ApiClient::request`],
//! so credential injection and the 401 policy apply uniformly.

use chrono::NaiveDate;

use crate::models::{
    DashboardStats, Interview, JobApplication, JobApplicationSummary, NewInterview,
    NewJobApplication, NewNote, Note,
};

use super::{ApiClient, ApiError};

const APPLICATIONS_PATH: &str = "/api/job-applications/";
const INTERVIEWS_PATH: &str = "/api/interviews/";
const NOTES_PATH: &str = "/api/notes/";

fn detail_path(collection: &str, id: i64) -> String {
    format!("{}{}/", collection, id)
}

impl ApiClient {
    // ===== Job applications =====

    pub async fn list_applications(&self) -> Result<Vec<JobApplicationSummary>, ApiError> {
        self.get(APPLICATIONS_PATH).await
    }

    pub async fn get_application(&self, id: i64) -> Result<JobApplication, ApiError> {
        self.get(&detail_path(APPLICATIONS_PATH, id)).await
    }

    pub async fn create_application(
        &self,
        application: &NewJobApplication,
    ) -> Result<JobApplication, ApiError> {
        self.post(APPLICATIONS_PATH, application).await
    }

    pub async fn update_application(
        &self,
        id: i64,
        application: &NewJobApplication,
    ) -> Result<JobApplication, ApiError> {
        self.put(&detail_path(APPLICATIONS_PATH, id), application).await
    }

    pub async fn delete_application(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&detail_path(APPLICATIONS_PATH, id)).await
    }

    /// Search company, position, location and notes. The backend rejects an
    /// empty query, so it is refused before any request is made.
    pub async fn search_applications(&self, query: &str) -> Result<Vec<JobApplication>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidRequest("search query must not be empty".into()));
        }
        self.get_with_query("/api/job-applications/search/", &[("q", query)])
            .await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/api/job-applications/dashboard_stats/").await
    }

    // ===== Interviews =====

    pub async fn list_interviews(&self) -> Result<Vec<Interview>, ApiError> {
        self.get(INTERVIEWS_PATH).await
    }

    pub async fn get_interview(&self, id: i64) -> Result<Interview, ApiError> {
        self.get(&detail_path(INTERVIEWS_PATH, id)).await
    }

    // The create/update serializer echoes the writable fields only, so the
    // response is read back as the same shape that was sent.
    pub async fn create_interview(&self, interview: &NewInterview) -> Result<NewInterview, ApiError> {
        self.post(INTERVIEWS_PATH, interview).await
    }

    pub async fn update_interview(
        &self,
        id: i64,
        interview: &NewInterview,
    ) -> Result<NewInterview, ApiError> {
        self.put(&detail_path(INTERVIEWS_PATH, id), interview).await
    }

    pub async fn delete_interview(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&detail_path(INTERVIEWS_PATH, id)).await
    }

    /// Scheduled interviews from now on, soonest first.
    pub async fn upcoming_interviews(&self) -> Result<Vec<Interview>, ApiError> {
        self.get("/api/interviews/upcoming/").await
    }

    /// Interviews whose date falls within `start..=end`.
    pub async fn interview_calendar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Interview>, ApiError> {
        if end < start {
            return Err(ApiError::InvalidRequest(format!(
                "calendar range ends ({}) before it starts ({})",
                end, start
            )));
        }
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        self.get_with_query("/api/interviews/calendar/", &[("start", start.as_str()), ("end", end.as_str())])
            .await
    }

    // ===== Notes =====

    pub async fn list_notes(&self) -> Result<Vec<Note>, ApiError> {
        self.get(NOTES_PATH).await
    }

    pub async fn get_note(&self, id: i64) -> Result<Note, ApiError> {
        self.get(&detail_path(NOTES_PATH, id)).await
    }

    pub async fn create_note(&self, note: &NewNote) -> Result<NewNote, ApiError> {
        self.post(NOTES_PATH, note).await
    }

    pub async fn update_note(&self, id: i64, note: &NewNote) -> Result<NewNote, ApiError> {
        self.put(&detail_path(NOTES_PATH, id), note).await
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&detail_path(NOTES_PATH, id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_path() {
        assert_eq!(detail_path(APPLICATIONS_PATH, 12), "/api/job-applications/12/");
        assert_eq!(detail_path(NOTES_PATH, 1), "/api/notes/1/");
    }
}
