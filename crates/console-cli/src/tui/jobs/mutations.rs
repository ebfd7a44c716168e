use super::loads::describe;
use super::*;

impl TuiApp {
    /// Validates every field of the open form and, only if all pass, sends
    /// it. An invalid form stays open with its fields marked.
    pub(in crate::tui) fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if !validate_form(&mut form.fields) {
            form.message = Some("Please fill in all required fields".to_string());
            warn!(form = ?form.kind, "Form submission blocked by validation");
            return;
        }
        let Some(form) = self.form.take() else {
            return;
        };
        let value = form
            .fields
            .first()
            .map(|field| field.value.trim().to_string())
            .unwrap_or_default();
        let kind = form.kind;
        info!(form = ?kind, value = %value, "Submitting form");

        self.busy += 1;
        let backend = Arc::clone(&self.backend);
        let session = self.session;
        let wrap = move |result| AppEvent::Mutated {
            session,
            form: kind,
            result,
        };
        match kind {
            FormKind::AddUser => {
                self.spawn_job(async move { backend.add_user(&value).await }, wrap)
            }
            FormKind::AddTask => {
                self.spawn_job(async move { backend.add_task(&value).await }, wrap)
            }
        }
    }

    pub(in crate::tui) fn finish_mutation(&mut self, kind: FormKind, result: Result<String, JobError>) {
        self.busy = self.busy.saturating_sub(1);
        let view = kind.view();
        match result {
            Ok(message) => {
                info!(form = ?kind, message = %message, "Form submitted");
                self.toast(view, ToastKind::Success, message);
                if self.screen == Screen::Dashboard && self.view == view {
                    self.reload_current();
                }
            }
            Err(err) => {
                if let Some(reason) = err.auth_failure() {
                    self.deauthenticate(reason);
                    return;
                }
                error!(form = ?kind, error = %err, "Form submission failed");
                self.toast(view, ToastKind::Error, format!("Add failed: {}", describe(&err)));
            }
        }
    }

    pub(in crate::tui) fn submit_login(&mut self) {
        if self.login_pending {
            return;
        }
        if !validate_form(&mut self.login_fields) {
            self.login_message = Some("Please fill in all required fields".to_string());
            return;
        }
        let username = self.login_fields[0].value.trim().to_string();
        let password = self.login_fields[1].value.clone();
        self.login_pending = true;
        self.login_message = None;
        self.busy += 1;
        info!(username = %username, "Signing in");

        let backend = Arc::clone(&self.backend);
        self.spawn_job(
            async move { backend.login(&username, &password).await },
            AppEvent::LoggedIn,
        );
    }

    pub(in crate::tui) fn finish_login(&mut self, result: Result<LoginData, JobError>) {
        self.busy = self.busy.saturating_sub(1);
        self.login_pending = false;
        let data = match result {
            Ok(data) => data,
            Err(err) => {
                warn!(error = %err, "Login failed");
                self.login_message = Some(format!("Login failed: {}", describe(&err)));
                return;
            }
        };
        if let Err(err) = self
            .credentials
            .save(&data.token, data.expires_at.as_deref())
        {
            error!(error = %err, "Failed to store credential");
            self.login_message = Some(format!("Could not store credential: {err}"));
            return;
        }
        if let Some(password) = self.login_fields.get_mut(1) {
            password.value.clear();
        }
        self.login_message = None;
        self.screen = Screen::Dashboard;
        info!(expires_at = ?data.expires_at, "Signed in");
        self.navigate(View::Users);
    }
}
