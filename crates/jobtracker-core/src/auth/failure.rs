use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::User;

/// Generic reason when the backend gave nothing better.
pub const LOGIN_FAILED: &str = "Login failed.";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Expected failure of a session operation.
///
/// Login failures are reduced to one human-readable string, registration
/// failures keep the backend's structured payload so a form can show
/// per-field messages. Callers of `register` can see both: a rejected
/// registration yields `Invalid`, a failed auto-login yields `Rejected`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthFailure {
    #[error("{reason}")]
    Rejected { reason: String },

    #[error("Registration failed: {errors}")]
    Invalid { errors: Value },
}

/// Outcome of `login` / `register`: the resolved user, or why it failed.
pub type AuthResult = Result<User, AuthFailure>;

impl AuthFailure {
    pub fn rejected(reason: &str) -> Self {
        AuthFailure::Rejected {
            reason: reason.to_string(),
        }
    }

    /// Reduce a login error to a message, preferring what the backend said.
    pub(crate) fn from_login_error(err: &ApiError) -> Self {
        let reason = err
            .payload()
            .and_then(first_backend_message)
            .unwrap_or_else(|| LOGIN_FAILED.to_string());
        AuthFailure::Rejected { reason }
    }

    /// Keep the registration error body verbatim.
    pub(crate) fn from_registration_error(err: ApiError) -> Self {
        let errors = match err {
            ApiError::BadRequest(value) => value,
            ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError(body)
                if !body.is_empty() =>
            {
                serde_json::from_str(&body).unwrap_or(Value::String(body))
            }
            _ => Value::String(REGISTRATION_FAILED.to_string()),
        };
        AuthFailure::Invalid { errors }
    }

    /// One line suitable for an inline error message, whichever shape this is.
    pub fn message(&self) -> String {
        match self {
            AuthFailure::Rejected { reason } => reason.clone(),
            AuthFailure::Invalid { errors } => {
                let lines = field_messages(errors);
                if lines.is_empty() {
                    REGISTRATION_FAILED.to_string()
                } else {
                    lines.join("; ")
                }
            }
        }
    }

    /// Structured field errors, present only for registration failures.
    pub fn field_errors(&self) -> Option<&Value> {
        match self {
            AuthFailure::Invalid { errors } => Some(errors),
            AuthFailure::Rejected { .. } => None,
        }
    }
}

fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

/// `non_field_errors[0]` first, then the first message of any field.
///
/// serde_json maps are sorted by key here (no `preserve_order`), so "first
/// field" means alphabetically first, not the order the backend sent.
fn first_backend_message(payload: &Value) -> Option<String> {
    let fields = payload.as_object()?;
    if let Some(message) = fields.get("non_field_errors").and_then(first_string) {
        return Some(message);
    }
    fields.values().find_map(first_string)
}

/// Flatten `{"field": ["msg", ...]}` into `"field: msg"` lines.
fn field_messages(errors: &Value) -> Vec<String> {
    match errors {
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        Value::Array(_) => first_string(errors).into_iter().collect(),
        Value::Object(fields) => fields
            .iter()
            .flat_map(|(field, messages)| {
                let messages: Vec<&Value> = match messages {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                messages
                    .into_iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .map(|m| {
                        if field == "non_field_errors" {
                            m
                        } else {
                            format!("{}: {}", field, m)
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect(),
        _ => Vec::new(),
    }
}
