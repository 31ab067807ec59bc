use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EMAIL_ENV: &str = "QUOTE_DESK_EMAIL";
pub const PASSWORD_ENV: &str = "QUOTE_DESK_PASSWORD";

/// Error body returned by the backend on non-success statuses.
/// `message` is a string for most errors and a list for validation errors.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<u16>,
}

impl ApiErrorBody {
    pub fn message_text(&self) -> Option<String> {
        match &self.message {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Array(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            _ => self.error.clone(),
        }
    }
}

/// Body of `POST auth/login`
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Both variables must be set and non-empty
    pub fn from_env() -> Option<Self> {
        let email = std::env::var(EMAIL_ENV).ok().filter(|v| !v.trim().is_empty())?;
        let password = std::env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty())?;
        Some(Self {
            email: email.trim().to_string(),
            password,
        })
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest").field("email", &self.email).finish_non_exhaustive()
    }
}

/// Claims read from the access token; only `exp` is acted on
#[derive(Clone, Debug, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
