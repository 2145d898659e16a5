//! API transport for the job tracker backend.
//!
//! This module provides the `ApiClient` struct through which every backend
//! call flows. It injects the stored credential into each request and owns
//! the global session-expiry policy: a 401 from any endpoint wipes the stored
//! credential and emits a [`TransportEvent::SessionExpired`] event.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::auth::TokenStore;
use crate::models::{RegistrationRequest, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Login entry point the client is sent to when the backend rejects the credential
pub const LOGIN_PATH: &str = "/login";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Capacity of the transport event channel. Events are rare (one per 401),
/// so a small buffer is enough for a lagging subscriber.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Authentication endpoints
const TOKEN_AUTH_PATH: &str = "/api-token-auth/";
const REGISTRATION_PATH: &str = "/api-auth/registration/";
const CURRENT_USER_PATH: &str = "/api-auth/user/";

/// Signals raised by the transport for the router/session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The backend answered 401; the stored credential has been deleted and
    /// the client must navigate to `redirect_to`.
    SessionExpired { redirect_to: String },
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// API client for the job tracker backend.
/// Clone is cheap - reqwest::Client and the token store are reference counted,
/// and clones share the same event channel.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    events: broadcast::Sender<TransportEvent>,
}

impl ApiClient {
    /// Create a client for `base_url` (already normalized, no trailing slash)
    /// reading credentials from `store`.
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential store shared with the session manager.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    /// Subscribe to transport events (forced navigation on 401).
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build the Authorization header from the credential as stored right now.
    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        let token = match self.store.get() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential, sending unauthenticated");
                None
            }
        };
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Token {}", token)).map_err(
                |_| ApiError::InvalidRequest("stored credential is not a valid header value".into()),
            )?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send one request and apply the response policy.
    ///
    /// No retries: every error status and network failure goes back to the caller.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        debug!(%method, path, "Sending request");

        let mut builder = self
            .client
            .request(method.clone(), url.as_str())
            .headers(self.auth_headers()?);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        debug!(%method, path, status = %response.status(), "Received response");
        self.check_response(response).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    /// Global 401 policy: forget the credential and send the client to login,
    /// whatever request triggered it.
    fn expire_session(&self) {
        info!("Backend rejected credential, clearing stored token");
        if let Err(e) = self.store.remove() {
            warn!(error = %e, "Failed to clear stored credential");
        }
        // send() only fails when nobody is subscribed
        let _ = self.events.send(TransportEvent::SessionExpired {
            redirect_to: LOGIN_PATH.to_string(),
        });
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.request::<()>(Method::GET, path, query, None).await?;
        Self::parse_json(response, path).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::POST, path, &[], Some(body)).await?;
        Self::parse_json(response, path).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::PUT, path, &[], Some(body)).await?;
        Self::parse_json(response, path).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request::<()>(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    // ===== Authentication =====

    /// Exchange a username/password pair for a credential.
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response: TokenResponse = self
            .post(TOKEN_AUTH_PATH, &TokenRequest { username, password })
            .await?;
        if response.token.is_empty() {
            return Err(ApiError::InvalidResponse("empty token in auth response".into()));
        }
        Ok(response.token)
    }

    /// Create an account. The response body is returned as-is; callers do
    /// not rely on its shape.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<Value, ApiError> {
        let response = self
            .request(Method::POST, REGISTRATION_PATH, &[], Some(request))
            .await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    /// Fetch the profile of the user owning the stored credential.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get(CURRENT_USER_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8000/", Arc::new(MemoryTokenStore::new())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api-auth/user/"), "http://localhost:8000/api-auth/user/");
    }

    #[test]
    fn test_auth_headers_read_store_each_time() {
        let store = Arc::new(MemoryTokenStore::new());
        let client = ApiClient::new("http://localhost:8000", store.clone()).unwrap();

        assert!(client.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());

        store.set("abc123").unwrap();
        let headers = client.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Token abc123");

        store.remove().unwrap();
        assert!(client.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_auth_headers_reject_unprintable_token() {
        let store = Arc::new(MemoryTokenStore::with_token("bad\ntoken"));
        let client = ApiClient::new("http://localhost:8000", store).unwrap();
        assert!(matches!(client.auth_headers(), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_expire_session_clears_token_and_notifies() {
        let store = Arc::new(MemoryTokenStore::with_token("abc"));
        let client = ApiClient::new("http://localhost:8000", store.clone()).unwrap();
        let mut events = client.subscribe();

        client.expire_session();

        assert_eq!(store.get().unwrap(), None);
        assert_eq!(
            events.try_recv().unwrap(),
            TransportEvent::SessionExpired {
                redirect_to: "/login".to_string()
            }
        );
    }
}
