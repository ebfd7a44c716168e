use super::*;

impl TuiApp {
    pub(in crate::tui) fn handle_login(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::Down => {
                self.login_index = (self.login_index + 1) % self.login_fields.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.login_index =
                    (self.login_index + self.login_fields.len() - 1) % self.login_fields.len();
            }
            KeyCode::Enter => self.submit_login(),
            _ => {
                if let Some(field) = self.login_fields.get_mut(self.login_index)
                    && edit_field(field, key)
                {
                    validate_field(field);
                    self.login_message = None;
                }
            }
        }
        Ok(false)
    }
}
