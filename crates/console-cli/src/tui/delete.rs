use super::*;

/// A failed delete as shown to the operator and as written to diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(in crate::tui) struct DeleteFailure {
    pub(in crate::tui) status: u16,
    pub(in crate::tui) message: String,
    pub(in crate::tui) detail: String,
}

impl DeleteFailure {
    pub(in crate::tui) fn from_job(err: &JobError) -> Self {
        match err {
            JobError::Api(ApiError::Network(source)) => Self {
                status: 0,
                message: "Connection failed, check the network and retry".to_string(),
                detail: error_chain(source),
            },
            JobError::Api(api) => {
                let status = api.status_code();
                Self {
                    status,
                    message: delete_status_message(status, api.server_message()),
                    detail: api.to_string(),
                }
            }
            JobError::Crashed(reason) => Self {
                status: 0,
                message: "An error occurred while deleting the task".to_string(),
                detail: reason.clone(),
            },
        }
    }
}

pub(in crate::tui) fn delete_status_message(status: u16, server_message: Option<&str>) -> String {
    match status {
        400 => "Invalid task identifier format".to_string(),
        401 | 403 => "Insufficient permission, please log in again".to_string(),
        404 => "Task does not exist or was already deleted".to_string(),
        500 => "Server error, please retry later".to_string(),
        _ => match server_message {
            Some(message) => message.to_string(),
            None => format!("Delete failed (status code: {status})"),
        },
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

impl TuiApp {
    /// Asks for confirmation before deleting the selected completed task.
    /// Does nothing while that task already has a delete in flight.
    pub(in crate::tui) fn request_delete(&mut self) {
        let Some(task) = self.completed.selected_row() else {
            return;
        };
        let code = task.id().to_string();
        if self.deleting.contains(&code) {
            debug!(task_id = %code, "Delete already in flight");
            return;
        }
        let message = format!(
            "Task ID: {}\nCode: {}\n\nThis removes the task and all of its redemption records.\nThis cannot be undone.",
            code,
            task.display_name()
        );
        self.dialog = Some(ConfirmDialog {
            title: "Delete task".to_string(),
            message,
            action: PendingAction::DeleteTask { code },
        });
    }

    pub(in crate::tui) fn start_delete(&mut self, code: String) {
        if !self.deleting.insert(code.clone()) {
            return;
        }
        self.busy += 1;
        info!(task_id = %code, "Deleting task");
        let backend = Arc::clone(&self.backend);
        let job_code = code.clone();
        let session = self.session;
        self.spawn_job(
            async move { backend.delete_task(&job_code).await },
            move |result| AppEvent::Deleted {
                session,
                code,
                result,
            },
        );
    }

    pub(in crate::tui) fn finish_delete(&mut self, code: String, result: Result<String, JobError>) {
        let was_pending = self.deleting.remove(&code);
        if was_pending {
            self.busy = self.busy.saturating_sub(1);
        }
        let err = match result {
            Ok(message) => {
                info!(task_id = %code, message = %message, "Task deleted");
                self.toast(View::Tasks, ToastKind::Success, format!("Task {code} deleted"));
                if self.screen == Screen::Dashboard
                    && self.view == View::Tasks
                    && self.tasks_mode == TasksMode::History
                {
                    self.dispatch_load(LoadKind::Completed);
                }
                return;
            }
            Err(err) => err,
        };
        if let Some(reason) = err.auth_failure() {
            if !was_pending {
                debug!(task_id = %code, reason = %reason, "Ignoring auth failure from a stale delete");
                return;
            }
            let timestamp = now_rfc3339();
            warn!(
                task_id = %code,
                reason = %reason,
                timestamp = %timestamp,
                "Authentication error during delete"
            );
            self.deauthenticate(reason);
            return;
        }

        let failure = DeleteFailure::from_job(&err);
        let timestamp = now_rfc3339();
        error!(
            task_id = %code,
            status = failure.status,
            message = %failure.message,
            error = %failure.detail,
            timestamp = %timestamp,
            "Task delete failed"
        );
        self.record_delete_failure(&code, &failure);
        if was_pending {
            self.toast(View::Tasks, ToastKind::Error, failure.message);
        }
    }

    fn record_delete_failure(&self, code: &str, failure: &DeleteFailure) {
        self.record_diagnostic(DiagnosticRecord {
            task_id: Some(code),
            status_code: Some(failure.status),
            message: Some(&failure.message),
            error: Some(&failure.detail),
            details: Some(serde_json::json!({ "server": self.server_url })),
            ..DiagnosticRecord::new("task.delete", Outcome::Failed)
        });
    }

    pub(in crate::tui) fn cancel_delete(&self, code: &str) {
        info!(task_id = %code, "Delete cancelled");
        self.record_diagnostic(DiagnosticRecord {
            task_id: Some(code),
            ..DiagnosticRecord::new("task.delete", Outcome::Cancelled)
        });
    }

    fn record_diagnostic(&self, record: DiagnosticRecord<'_>) {
        let Some(diagnostics) = &self.diagnostics else {
            return;
        };
        if let Err(err) = diagnostics.record(&record) {
            warn!(error = %err, "Failed to write diagnostics entry");
        }
    }

    pub(in crate::tui) fn delete_label(&self, code: &str) -> &'static str {
        if self.deleting.contains(code) {
            "Deleting..."
        } else {
            "Delete"
        }
    }
}
