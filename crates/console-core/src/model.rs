use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub fid: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub kid: i64,
    #[serde(default)]
    pub avatar_image: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub code: String,
    #[serde(default)]
    pub all_done: bool,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Failed,
    Processing,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Processing => "processing",
        }
    }
}

impl Task {
    /// Display status, checked in order: `all_done` wins, then any retry
    /// marks the task failed, otherwise it is still processing.
    ///
    /// A task with retries pending still reports `Failed`; the backend does
    /// not expose enough to tell the two apart.
    pub fn status(&self) -> TaskStatus {
        if self.all_done {
            TaskStatus::Completed
        } else if self.retry_count > 0 {
            TaskStatus::Failed
        } else {
            TaskStatus::Processing
        }
    }

    /// Identifier shown to the operator and sent on delete.
    pub fn id(&self) -> &str {
        &self.code
    }

    pub fn display_name(&self) -> &str {
        if self.code.trim().is_empty() {
            "Unnamed task"
        } else {
            &self.code
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub id: i64,
    pub fid: String,
    pub code: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Success,
    Failed,
    Duplicate,
}

impl RedemptionRecord {
    pub fn record_status(&self) -> RecordStatus {
        match self.status.as_str() {
            "success" => RecordStatus::Success,
            "failed" => RecordStatus::Failed,
            _ => RecordStatus::Duplicate,
        }
    }
}

impl RecordStatus {
    pub fn label(self) -> &'static str {
        match self {
            RecordStatus::Success => "success",
            RecordStatus::Failed => "failed",
            RecordStatus::Duplicate => "duplicate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Notification {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }

    pub fn content_preview(&self) -> String {
        preview(&self.content)
    }

    pub fn result_preview(&self) -> String {
        preview(&self.result)
    }
}

/// Cuts `value` to the first 50 characters and appends `...` when longer.
pub fn preview(value: &str) -> String {
    if value.chars().count() <= PREVIEW_CHARS {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}

/// The machine's UTC offset, or UTC when it cannot be read. On Unix `time`
/// only answers while the process is single-threaded, so resolve this once
/// at startup and pass it along.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Renders a backend timestamp as `YYYY-MM-DD HH:MM:SS` at `offset`.
/// Absent values render as `-`; unparseable ones are returned verbatim.
pub fn format_timestamp(value: Option<&str>, offset: UtcOffset) -> String {
    let Some(raw) = value.filter(|raw| !raw.trim().is_empty()) else {
        return "-".to_string();
    };
    let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) else {
        return raw.to_string();
    };
    parsed
        .to_offset(offset)
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| raw.to_string())
}
