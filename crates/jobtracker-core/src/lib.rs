//! jobtracker-core - client library for the job application tracker.
//!
//! The two pieces with real behavior are the [`SessionManager`], which owns
//! the authenticated session and its persisted credential, and the
//! [`ApiClient`] transport every backend call goes through. Around them sit
//! the typed resource endpoints, the data models, configuration, and the
//! route guard front ends use to protect views.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
pub mod utils;

pub use api::{ApiClient, ApiError, TransportEvent, LOGIN_PATH};
pub use auth::{AuthFailure, AuthResult, Session, SessionManager, TokenStore};
pub use config::{Config, TokenStoreKind};
pub use router::{Access, Navigator, Route, RouteGuard};
