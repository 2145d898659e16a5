use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::{RegistrationRequest, User};

use super::failure::{AuthFailure, AuthResult, LOGIN_FAILED};
use super::TokenStore;

/// In-memory authentication state for the lifetime of the process.
///
/// Only [`SessionManager`] can change it; everyone else reads snapshots or
/// watches it through [`SessionManager::subscribe`].
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: Option<User>,
    loading: bool,
}

impl Session {
    /// State at process start, before the stored credential has been checked.
    fn restoring() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state(user: Option<User>, loading: bool) -> Self {
        Self { user, loading }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// True iff a user has been resolved against the backend.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// True only while the startup restore is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Owns the session and the persisted credential.
///
/// `restore` runs once at startup; `login`, `register` and `logout` are the
/// only other writers. The transport's 401 policy may delete the credential
/// behind the manager's back, in which case the session stays authenticated
/// until the next `logout` or a new process.
pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
    restored: AtomicBool,
}

impl SessionManager {
    /// Create a manager in the loading state. Call [`SessionManager::restore`]
    /// (or use [`SessionManager::start`]) before trusting the session.
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::restoring());
        Self {
            store: api.token_store(),
            api,
            state,
            restored: AtomicBool::new(false),
        }
    }

    /// Create a manager and restore the persisted session.
    pub async fn start(api: ApiClient) -> Self {
        let manager = Self::new(api);
        manager.restore().await;
        manager
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Point-in-time copy of the session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Read-only view that is notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn stored_token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential");
                None
            }
        }
    }

    fn clear_credential(&self) {
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "Failed to delete stored credential");
        }
    }

    /// Put the credential back the way it was before a failed login.
    fn rollback_credential(&self, previous: Option<String>) {
        let result = match previous {
            Some(token) => self.store.set(&token),
            None => self.store.remove(),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to roll back stored credential");
        }
    }

    /// Validate the persisted credential against the backend.
    ///
    /// Runs at most once per manager; later calls return immediately. Any
    /// failure deletes the credential and leaves the session unauthenticated.
    /// `loading` is cleared either way.
    pub async fn restore(&self) {
        if self.restored.swap(true, Ordering::SeqCst) {
            debug!("Session restore already ran, ignoring");
            return;
        }

        let user = match self.stored_token() {
            None => {
                debug!("No stored credential, starting unauthenticated");
                None
            }
            Some(_) => match self.api.current_user().await {
                Ok(user) => {
                    info!(username = %user.username, "Session restored");
                    Some(user)
                }
                Err(e) => {
                    info!(error = %e, "Stored credential rejected, clearing it");
                    self.clear_credential();
                    None
                }
            },
        };

        self.state.send_modify(|session| {
            session.user = user;
            session.loading = false;
        });
    }

    /// Authenticate, persist the credential and resolve the user.
    ///
    /// The user fetch is part of the same operation: if it fails the stored
    /// credential is rolled back and the session is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult {
        let previous = self.stored_token();

        let token = match self.api.obtain_token(username, password).await {
            Ok(token) => token,
            Err(e) => {
                warn!(username, error = %e, "Login failed");
                return Err(AuthFailure::from_login_error(&e));
            }
        };

        if let Err(e) = self.store.set(&token) {
            warn!(error = %e, "Failed to persist credential");
            return Err(AuthFailure::rejected(LOGIN_FAILED));
        }

        match self.api.current_user().await {
            Ok(user) => {
                info!(username = %user.username, "Login successful");
                self.state.send_modify(|session| session.user = Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!(username, error = %e, "Failed to fetch user after login");
                self.rollback_credential(previous);
                Err(AuthFailure::from_login_error(&e))
            }
        }
    }

    /// Create an account, then log in with the same credentials.
    pub async fn register(&self, request: &RegistrationRequest) -> AuthResult {
        if let Err(e) = self.api.register(request).await {
            warn!(username = %request.username, error = %e, "Registration failed");
            return Err(AuthFailure::from_registration_error(e));
        }
        info!(username = %request.username, "Registered, logging in");
        self.login(&request.username, request.password()).await
    }

    /// Forget the credential and the user. No network call; safe to repeat.
    pub fn logout(&self) {
        self.clear_credential();
        self.state.send_modify(|session| session.user = None);
        info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn manager_with(store: Arc<MemoryTokenStore>) -> SessionManager {
        // Nothing listens on port 9; tests below never reach the network.
        let api = ApiClient::new("http://127.0.0.1:9", store).unwrap();
        SessionManager::new(api)
    }

    #[test]
    fn test_new_manager_is_loading() {
        let manager = manager_with(Arc::new(MemoryTokenStore::new()));
        let session = manager.snapshot();
        assert!(session.is_loading());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_token_is_immediate() {
        let manager = manager_with(Arc::new(MemoryTokenStore::new()));
        manager.restore().await;
        let session = manager.snapshot();
        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let store = Arc::new(MemoryTokenStore::new());
        let manager = manager_with(store.clone());
        manager.restore().await;

        // A credential appearing later must not trigger a second restore.
        store.set("late").unwrap();
        let mut rx = manager.subscribe();
        manager.restore().await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.get().unwrap().as_deref(), Some("late"));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let store = Arc::new(MemoryTokenStore::with_token("abc"));
        let manager = manager_with(store.clone());

        manager.logout();
        let once = manager.snapshot();
        manager.logout();

        assert_eq!(manager.snapshot(), once);
        assert!(!once.is_authenticated());
        assert_eq!(store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_restore() {
        let manager = manager_with(Arc::new(MemoryTokenStore::new()));
        let mut rx = manager.subscribe();
        assert!(rx.borrow().is_loading());

        manager.restore().await;

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_loading());
    }
}
