use super::*;

impl TuiApp {
    pub(in crate::tui) fn handle_dashboard(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('1') => self.navigate(View::Users),
            KeyCode::Char('2') => self.navigate(View::Tasks),
            KeyCode::Char('3') => self.navigate(View::Notifications),
            KeyCode::Char('r') => self.reload_current(),
            KeyCode::Char('o') => {
                self.dialog = Some(ConfirmDialog {
                    title: "Log out".to_string(),
                    message: "End this session and return to the login screen?".to_string(),
                    action: PendingAction::Logout,
                });
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            _ => match self.view {
                View::Users => self.handle_users(key),
                View::UserDetail => self.handle_user_detail(key),
                View::Tasks => self.handle_tasks(key),
                View::Notifications => {}
            },
        }
        Ok(false)
    }

    fn handle_users(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') => self.open_form(FormKind::AddUser),
            KeyCode::Enter => {
                if let Some(user) = self.users.selected_row() {
                    let fid = user.fid.clone();
                    self.open_user_detail(fid);
                }
            }
            _ => {}
        }
    }

    fn handle_user_detail(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('b')) {
            self.navigate(View::Users);
        }
    }

    fn handle_tasks(&mut self, key: KeyEvent) {
        match (self.tasks_mode, key.code) {
            (_, KeyCode::Char('[')) => {
                let shorter = self.poller.interval().shorter();
                self.change_interval(shorter);
            }
            (_, KeyCode::Char(']')) => {
                let longer = self.poller.interval().longer();
                self.change_interval(longer);
            }
            (TasksMode::Live, KeyCode::Char('a')) => self.open_form(FormKind::AddTask),
            (TasksMode::Live, KeyCode::Char('h')) => self.show_history(),
            (TasksMode::History, KeyCode::Char('d')) => self.request_delete(),
            (TasksMode::History, KeyCode::Char('b') | KeyCode::Esc) => {
                self.navigate(View::Tasks)
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        match (self.view, self.tasks_mode) {
            (View::Users, _) => self.users.move_selection(delta),
            (View::UserDetail, _) => self.records.move_selection(delta),
            (View::Tasks, TasksMode::Live) => self.tasks.move_selection(delta),
            (View::Tasks, TasksMode::History) => self.completed.move_selection(delta),
            (View::Notifications, _) => self.notifications.move_selection(delta),
        }
    }
}
