//! REST API transport for the job tracker backend.
//!
//! This module provides the `ApiClient` for communicating with the backend
//! to authenticate and to manage applications, interviews and notes.
//!
//! The API uses token authentication: every request carries
//! `Authorization: Token <credential>` when a credential is stored.

pub mod client;
pub mod error;
pub mod resources;

pub use client::{ApiClient, TransportEvent, LOGIN_PATH};
pub use error::ApiError;
