//! Application state for the jobtracker CLI.
//!
//! `App` wires configuration, the credential store, the API transport and
//! the session manager together, restores the session on startup, and runs
//! every protected command through the route guard.

use std::io::{self, Write};

use anyhow::{anyhow, bail, Context, Result};
use jobtracker_core::auth::open_token_store;
use jobtracker_core::models::RegistrationRequest;
use jobtracker_core::{
    Access, ApiClient, Config, Navigator, Route, RouteGuard, Session, SessionManager,
    TokenStoreKind,
};
use tracing::{debug, info, warn};

/// Environment variable holding the password for non-interactive logins
const PASSWORD_ENV: &str = "JOBTRACKER_PASSWORD";

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 150;

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: SessionManager,
    pub store_kind: TokenStoreKind,
    navigator: Navigator,
}

impl App {
    /// Build the client stack and restore the persisted session.
    pub async fn start(backend_url: Option<&str>, token_store: Option<&str>) -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        });

        let store_kind = token_store
            .map(str::parse::<TokenStoreKind>)
            .transpose()?;
        let store_kind = config.token_store(store_kind);
        let store = open_token_store(store_kind)?;
        let base_url = config.backend_url(backend_url)?;
        debug!(%base_url, "Using backend");

        let api = ApiClient::new(&base_url, store).context("Failed to create HTTP client")?;
        Ok(Self::with_client(config, api, store_kind).await)
    }

    /// Restore the session over an existing transport.
    pub async fn with_client(config: Config, api: ApiClient, store_kind: TokenStoreKind) -> Self {
        let session = SessionManager::new(api.clone());
        let mut guard = RouteGuard::new(session.subscribe());
        let mut navigator = Navigator::new(guard.clone(), api.subscribe());

        session.restore().await;
        guard.wait_until_ready().await;
        // A stale token gets a 401 during restore. That reset is silent and
        // must not be reported as an expiry of the command about to run.
        if navigator.poll_events() {
            debug!("Discarded session expiry raised during restore");
        }

        Self {
            config,
            api,
            session,
            store_kind,
            navigator,
        }
    }

    pub fn snapshot(&self) -> Session {
        self.session.snapshot()
    }

    /// Run the guard for `route`; protected commands call this first.
    pub fn require(&mut self, route: Route) -> Result<()> {
        match self.navigator.navigate(&route.path()) {
            Access::Allow => Ok(()),
            Access::Redirect(Route::Login) => {
                bail!("Please log in first: jobtracker login")
            }
            Access::Redirect(other) => bail!("{} is not available, try {}", route, other),
            Access::Pending => bail!("Session is still loading"),
        }
    }

    /// Resolve a client path through the guard and report where it lands.
    pub fn open(&mut self, path: &str) -> (Access, Route) {
        let access = self.navigator.navigate(path);
        (access, self.navigator.location())
    }

    /// True if the transport forced a redirect to login since the last check.
    pub fn session_expired(&mut self) -> bool {
        self.navigator.poll_events() && self.navigator.location() == Route::Login
    }

    fn remember_username(&mut self, username: &str) {
        self.config.last_username = Some(username.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Interactive login
    pub async fn login_interactive(&mut self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(u) => u,
            None => Self::prompt_username(self.config.last_username.as_deref())?,
        };
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
            bail!("Username must be 1-{} characters", MAX_USERNAME_LENGTH);
        }
        let password = Self::password_from_env_or_prompt("Password: ")?;
        if password.is_empty() {
            bail!("Username and password required");
        }

        eprintln!("Authenticating...");
        match self.session.login(&username, &password).await {
            Ok(user) => {
                self.remember_username(&username);
                info!("Login successful");
                println!("Logged in as {}", user.display_name());
                Ok(())
            }
            Err(failure) => Err(anyhow!(failure.message())),
        }
    }

    /// Interactive registration followed by automatic login
    pub async fn register_interactive(
        &mut self,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<()> {
        let username = match username {
            Some(u) => u,
            None => Self::prompt_username(None)?,
        };
        let email = match email {
            Some(e) => Some(e),
            None => {
                let e = Self::prompt("Email (optional): ")?;
                (!e.is_empty()).then_some(e)
            }
        };
        let password = Self::password_from_env_or_prompt("Password: ")?;
        if std::env::var(PASSWORD_ENV).is_err() {
            let confirm = rpassword::prompt_password("Confirm password: ")?;
            if confirm != password {
                bail!("Passwords do not match");
            }
        }

        let request = RegistrationRequest::new(&username, email.as_deref(), &password);
        match self.session.register(&request).await {
            Ok(user) => {
                self.remember_username(&username);
                println!("Account created. Logged in as {}", user.display_name());
                Ok(())
            }
            Err(failure) => {
                if let Some(errors) = failure.field_errors() {
                    debug!(%errors, "Registration rejected");
                }
                Err(anyhow!(failure.message()))
            }
        }
    }

    fn prompt(label: &str) -> Result<String> {
        print!("{}", label);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    fn prompt_username(last: Option<&str>) -> Result<String> {
        match last {
            Some(last) => {
                let input = Self::prompt(&format!("Username [{}]: ", last))?;
                Ok(if input.is_empty() { last.to_string() } else { input })
            }
            None => Self::prompt("Username: "),
        }
    }

    fn password_from_env_or_prompt(label: &str) -> Result<String> {
        match std::env::var(PASSWORD_ENV) {
            Ok(password) => Ok(password),
            Err(_) => Ok(rpassword::prompt_password(label)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::Arc;

    use jobtracker_core::auth::{MemoryTokenStore, TokenStore};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    async fn mount_user(server: &MockServer, token: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api-auth/user/"))
            .and(header("Authorization", format!("Token {}", token).as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "pk": 1,
                "username": "alice"
            })))
            .mount(server)
            .await;
    }

    async fn app_with_token(server: &MockServer, token: &str) -> (App, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::with_token(token));
        let api = ApiClient::new(&server.uri(), store.clone()).unwrap();
        let app = App::with_client(Config::default(), api, TokenStoreKind::File).await;
        (app, store)
    }

    #[tokio::test]
    async fn test_stale_token_then_login_is_not_reported_as_expired() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_user(&server, "stale", 401).await;
        mount_user(&server, "fresh", 200).await;
        Mock::given(method("POST"))
            .and(path("/api-token-auth/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "fresh"})))
            .mount(&server)
            .await;

        let (mut app, store) = app_with_token(&server, "stale").await;
        assert!(!app.snapshot().is_authenticated());
        assert_eq!(store.get().unwrap(), None);

        let user = app.session.login("alice", "pw").await.unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(store.get().unwrap().as_deref(), Some("fresh"));
        assert!(!app.session_expired());
    }

    #[tokio::test]
    async fn test_401_during_command_is_reported() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        mount_user(&server, "good", 200).await;
        Mock::given(method("GET"))
            .and(path("/api/notes/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (mut app, store) = app_with_token(&server, "good").await;
        assert!(!app.session_expired());
        app.require(Route::Applications).unwrap();

        assert!(app.api.list_notes().await.is_err());

        assert!(app.session_expired());
        assert_eq!(store.get().unwrap(), None);
    }
}
