use super::*;

impl TuiApp {
    pub(in crate::tui) fn draw(&mut self, frame: &mut ratatui::Frame) {
        if self.screen == Screen::Login {
            self.draw_login(frame);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(LOG_PANEL_HEIGHT),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, layout[0]);
        self.draw_nav(frame, layout[1]);
        match self.view {
            View::Users => self.draw_users(frame, layout[2]),
            View::UserDetail => self.draw_user_detail(frame, layout[2]),
            View::Tasks if self.tasks_mode == TasksMode::History => {
                self.draw_completed(frame, layout[2])
            }
            View::Tasks => self.draw_tasks(frame, layout[2]),
            View::Notifications => self.draw_notifications(frame, layout[2]),
        }
        self.draw_toast(frame, layout[3]);
        self.draw_log_panel(frame, layout[4]);

        let footer = Paragraph::new(self.footer_text())
            .block(Block::default().borders(Borders::ALL).title("Help"));
        frame.render_widget(footer, layout[5]);

        if self.form.is_some() {
            self.draw_form(frame);
        }
        if self.dialog.is_some() {
            self.draw_dialog(frame);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("Admin Console", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  {}", self.server_url)),
        ];
        if self.busy > 0 {
            spans.push(Span::styled(
                "  Working...",
                Style::default().fg(Color::Yellow),
            ));
        }
        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn draw_nav(&self, frame: &mut ratatui::Frame, area: Rect) {
        let active_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED);
        let mut spans = Vec::new();
        for item in NavItem::ALL {
            if !spans.is_empty() {
                spans.push(Span::raw(" | "));
            }
            // Drill-down views leave every entry inactive.
            if self.nav_highlight == Some(item) {
                spans.push(Span::styled(format!(" {} ", item.title()), active_style));
            } else {
                spans.push(Span::raw(format!(" {} ", item.title())));
            }
        }
        let nav = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(nav, area);
    }

    fn draw_toast(&self, frame: &mut ratatui::Frame, area: Rect) {
        let Some(toast) = self.current_toast() else {
            return;
        };
        let color = match toast.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
            ToastKind::Info => Color::Blue,
        };
        let line = Paragraph::new(Span::styled(
            toast.text.clone(),
            Style::default().fg(color),
        ));
        frame.render_widget(line, area);
    }

    fn draw_log_panel(&self, frame: &mut ratatui::Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = self
            .log_buffer
            .tail(visible)
            .iter()
            .map(|entry| Line::from(entry.format_compact()))
            .collect();
        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Log"));
        frame.render_widget(panel, area);
    }

    pub(in crate::tui) fn footer_text(&self) -> String {
        let common = "1/2/3: views | r: reload | o: logout | q: quit";
        match (self.view, self.tasks_mode) {
            (View::Users, _) => format!("Up/Down: select | Enter: records | a: add user | {common}"),
            (View::UserDetail, _) => format!("Up/Down: scroll | Esc: back to users | {common}"),
            (View::Tasks, TasksMode::Live) => format!(
                "a: add code | h: history | [/]: refresh {} | {common}",
                self.poller.interval()
            ),
            (View::Tasks, TasksMode::History) => {
                format!("Up/Down: select | d: delete | b: live list | {common}")
            }
            (View::Notifications, _) => format!("Up/Down: scroll | {common}"),
        }
    }
}
