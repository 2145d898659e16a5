//! Account models: the authenticated profile and the registration payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile returned by `GET /api-auth/user/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "pk")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// Full name when the profile has one, otherwise the username.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        match (first.is_empty(), last.is_empty()) {
            (true, true) => self.username.clone(),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (false, false) => format!("{} {}", first, last),
        }
    }
}

/// Body for `POST /api-auth/registration/`.
///
/// The backend expects the password twice (`password1`/`password2`). Fields
/// the backend adds later can be passed through `extra`.
#[derive(Clone, Serialize)]
pub struct RegistrationRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password1: String,
    pub password2: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegistrationRequest {
    pub fn new(username: &str, email: Option<&str>, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.map(str::to_string),
            password1: password.to_string(),
            password2: password.to_string(),
            extra: Map::new(),
        }
    }

    /// Password used for the automatic login after registering.
    pub fn password(&self) -> &str {
        &self.password1
    }
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_parses_minimal_profile() {
        let user: User = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.id, None);
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn test_user_parses_full_profile() {
        let user: User = serde_json::from_value(json!({
            "pk": 7,
            "username": "alice",
            "email": "alice@example.com",
            "first_name": "Alice",
            "last_name": "Liddell",
            "is_staff": false
        }))
        .unwrap();
        assert_eq!(user.id, Some(7));
        assert_eq!(user.display_name(), "Alice Liddell");
    }

    #[test]
    fn test_display_name_partial() {
        let user = User {
            id: None,
            username: "bob".to_string(),
            email: None,
            first_name: Some("  ".to_string()),
            last_name: Some("Builder".to_string()),
        };
        assert_eq!(user.display_name(), "Builder");
    }

    #[test]
    fn test_registration_request_serializes_both_passwords() {
        let mut request = RegistrationRequest::new("carol", Some("carol@example.com"), "s3cret!");
        request.extra.insert("first_name".to_string(), json!("Carol"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "username": "carol",
                "email": "carol@example.com",
                "password1": "s3cret!",
                "password2": "s3cret!",
                "first_name": "Carol"
            })
        );
        assert_eq!(request.password(), "s3cret!");
    }

    #[test]
    fn test_registration_debug_hides_password() {
        let request = RegistrationRequest::new("dave", None, "hunter2");
        assert!(!format!("{:?}", request).contains("hunter2"));
    }
}
