use console_core::model::{Notification, RedemptionRecord, Task, User};
use serde::Deserialize;

/// Every admin route answers `{success, data, error}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Most routes send `{code, message}`; the delete route sends a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Detailed {
        #[serde(default)]
        code: String,
        #[serde(default)]
        message: String,
    },
    Plain(String),
}

impl ErrorBody {
    pub fn code(&self) -> Option<&str> {
        match self {
            ErrorBody::Detailed { code, .. } if !code.is_empty() => Some(code),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ErrorBody::Detailed { message, .. } => message,
            ErrorBody::Plain(message) => message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorOnly {
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// Pulls the error section out of a body without caring about `data`.
/// Returns `None` for empty or non-JSON bodies.
pub fn parse_error_body(body: &str) -> Option<ErrorBody> {
    serde_json::from_str::<ErrorOnly>(body).ok()?.error
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersData {
    #[serde(default)]
    pub(crate) users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordsData {
    #[serde(default)]
    pub(crate) records: Vec<RedemptionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TasksData {
    #[serde(default)]
    pub(crate) tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationsData {
    #[serde(default)]
    pub(crate) notifications: Vec<Notification>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageData {
    #[serde(default)]
    pub(crate) message: Option<String>,
}
