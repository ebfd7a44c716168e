use super::*;

impl TuiApp {
    /// Routes a key press. Returns `true` when the console should exit.
    pub(in crate::tui) fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            info!("Exit requested");
            return Ok(true);
        }
        if self.dialog.is_some() {
            return self.handle_dialog(key);
        }
        match self.screen {
            Screen::Login => self.handle_login(key),
            Screen::Dashboard if self.form.is_some() => self.handle_form(key),
            Screen::Dashboard => self.handle_dashboard(key),
        }
    }
}
