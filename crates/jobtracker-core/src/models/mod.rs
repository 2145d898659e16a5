//! Data models for job tracker entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `User`, `RegistrationRequest`: account profile and sign-up payload
//! - `JobApplication`, `JobApplicationSummary`: tracked applications
//! - `Interview`, `Note`: records attached to an application
//! - `DashboardStats`: per-user aggregates

pub mod application;
pub mod dashboard;
pub mod interview;
pub mod note;
pub mod user;

pub use application::{ApplicationStatus, JobApplication, JobApplicationSummary, NewJobApplication};
pub use dashboard::{DashboardStats, MonthlyCount, StatusCount};
pub use interview::{Interview, InterviewStatus, InterviewType, NewInterview};
pub use note::{NewNote, Note};
pub use user::{RegistrationRequest, User};
