use crate::config::default_diagnostics_dir;
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use uuid::Uuid;

const MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Append-only JSONL trail of failed operations, one file per day, rolled
/// over to a numbered sibling once a file reaches `max_bytes`.
#[derive(Clone)]
pub struct DiagnosticsLog {
    session_id: String,
    base_dir: PathBuf,
    max_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
    Cancelled,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Failed => "failed",
            Outcome::Cancelled => "cancelled",
        }
    }

    fn level(&self) -> &'static str {
        match self {
            Outcome::Ok => "INFO",
            Outcome::Failed => "ERROR",
            Outcome::Cancelled => "WARN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiagnosticRecord<'a> {
    pub event: &'a str,
    pub outcome: Outcome,
    pub task_id: Option<&'a str>,
    pub status_code: Option<u16>,
    pub message: Option<&'a str>,
    pub error: Option<&'a str>,
    pub details: Option<Value>,
}

impl<'a> DiagnosticRecord<'a> {
    pub fn new(event: &'a str, outcome: Outcome) -> Self {
        Self {
            event,
            outcome,
            task_id: None,
            status_code: None,
            message: None,
            error: None,
            details: None,
        }
    }
}

#[derive(Serialize)]
struct DiagnosticEntry<'a> {
    ts: String,
    level: &'static str,
    event: &'a str,
    entry_id: String,
    session_id: &'a str,
    outcome: &'static str,
    task_id: Option<&'a str>,
    status_code: Option<u16>,
    message: Option<&'a str>,
    error: Option<&'a str>,
    details: Option<&'a Value>,
}

impl DiagnosticsLog {
    pub fn new() -> anyhow::Result<Self> {
        Self::new_with_dir(default_diagnostics_dir()?, MAX_BYTES)
    }

    pub fn new_with_dir(base_dir: PathBuf, max_bytes: u64) -> anyhow::Result<Self> {
        fs::create_dir_all(&base_dir).context("create diagnostics dir")?;
        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            base_dir,
            max_bytes,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Appends one entry and returns its id.
    pub fn record(&self, record: &DiagnosticRecord<'_>) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ts = now.format(&Rfc3339).context("format timestamp")?;
        let entry_id = Uuid::new_v4().to_string();
        let entry = DiagnosticEntry {
            ts,
            level: record.outcome.level(),
            event: record.event,
            entry_id: entry_id.clone(),
            session_id: &self.session_id,
            outcome: record.outcome.as_str(),
            task_id: record.task_id,
            status_code: record.status_code,
            message: record.message,
            error: record.error,
            details: record.details.as_ref(),
        };
        let line = serde_json::to_string(&entry).context("serialize diagnostics entry")?;
        let path = next_log_path(&self.base_dir, &date_stamp(now)?, self.max_bytes);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open diagnostics log {}", path.display()))?;
        writeln!(file, "{line}").context("write diagnostics entry")?;
        Ok(entry_id)
    }
}

fn date_stamp(now: OffsetDateTime) -> anyhow::Result<String> {
    now.format(format_description!("[year][month][day]"))
        .context("format date")
}

fn next_log_path(base_dir: &Path, date: &str, max_bytes: u64) -> PathBuf {
    let mut suffix = 0;
    loop {
        let name = if suffix == 0 {
            format!("diagnostics-{date}.jsonl")
        } else {
            format!("diagnostics-{date}-{suffix}.jsonl")
        };
        let path = base_dir.join(name);
        match fs::metadata(&path) {
            Ok(metadata) if metadata.len() >= max_bytes => suffix += 1,
            _ => return path,
        }
    }
}
