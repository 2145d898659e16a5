//! Authentication module for managing the user session and its credential.
//!
//! This module provides:
//! - `SessionManager`: login/register/logout and startup restore
//! - `Session`: the read-only session snapshot consumers observe
//! - `TokenStore`: durable credential storage (file, OS keychain, memory)
//!
//! Only the credential is persisted; the session itself lives for one process.

pub mod credentials;
pub mod failure;
pub mod session;

pub use credentials::{
    open_token_store, FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY,
};
pub use failure::{AuthFailure, AuthResult, LOGIN_FAILED};
pub use session::{Session, SessionManager};
