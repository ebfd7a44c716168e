use super::*;

/// Applies an editing key to `field`. Returns whether the value changed.
pub(in crate::tui) fn edit_field(field: &mut InputField, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            field.value.clear();
            true
        }
        KeyCode::Backspace => field.value.pop().is_some(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            field.value.push(ch);
            true
        }
        _ => false,
    }
}

impl TuiApp {
    pub(in crate::tui) fn open_form(&mut self, kind: FormKind) {
        debug!(form = ?kind, "Opening form");
        self.form = Some(FormState::new(kind));
    }

    pub(in crate::tui) fn handle_form(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        let Some(form) = self.form.as_mut() else {
            return Ok(false);
        };
        match key.code {
            KeyCode::Esc => {
                debug!(form = ?form.kind, "Form dismissed");
                self.form = None;
            }
            KeyCode::Tab => form.index = (form.index + 1) % form.fields.len().max(1),
            KeyCode::Enter => self.submit_form(),
            _ => {
                if let Some(field) = form.fields.get_mut(form.index)
                    && edit_field(field, key)
                {
                    validate_field(field);
                    form.message = None;
                }
            }
        }
        Ok(false)
    }

    pub(in crate::tui) fn handle_dialog(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Enter => true,
            KeyCode::Char('n') | KeyCode::Esc => false,
            _ => return Ok(false),
        };
        let Some(dialog) = self.dialog.take() else {
            return Ok(false);
        };
        match (dialog.action, confirmed) {
            (PendingAction::DeleteTask { code }, true) => self.start_delete(code),
            (PendingAction::DeleteTask { code }, false) => self.cancel_delete(&code),
            (PendingAction::Logout, true) => self.logout(),
            (PendingAction::Logout, false) => debug!("Logout cancelled"),
        }
        Ok(false)
    }
}
