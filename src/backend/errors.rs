use serde_json::Value;
use thiserror::Error;

/// Failures surfaced by the REST backend client.
///
/// `401` and `403` are folded into [`BackendError::Unauthorized`] here and
/// nowhere else; callers only ever match on the variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("session expired or access denied (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("no session token available")]
    MissingToken,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not reach backend: {0}")]
    Transport(String),

    #[error("unexpected backend response: {0}")]
    Decode(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

const MAX_MESSAGE_LEN: usize = 200;

impl BackendError {
    /// Maps a non-success status and its body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => BackendError::Unauthorized { status },
            404 => BackendError::NotFound,
            409 => BackendError::Conflict(extract_message(body)),
            _ => BackendError::Status {
                status,
                message: extract_message(body),
            },
        }
    }

    /// True for every failure that must run the session-expired flow.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            BackendError::Unauthorized { .. } | BackendError::MissingToken
        )
    }

    /// Best-effort human readable text for toasts.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Unauthorized { .. } | BackendError::MissingToken => {
                "Your session has expired. Please log in again.".to_string()
            }
            BackendError::Conflict(message) if !message.is_empty() => message.clone(),
            BackendError::Conflict(_) => "The record conflicts with an existing one.".to_string(),
            BackendError::NotFound => "The requested record was not found.".to_string(),
            BackendError::Status { message, .. } if !message.is_empty() => message.clone(),
            BackendError::Status { status, .. } => format!("The server returned an error ({status})."),
            BackendError::Transport(_) => "Could not reach the server. Please try again.".to_string(),
            BackendError::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

/// Pulls `message` or `error` out of a JSON error body, falling back to the
/// raw (truncated) text.
fn extract_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
    });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    message.chars().take(MAX_MESSAGE_LEN).collect()
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
