use super::*;
use console_core::model::{RecordStatus, TaskStatus, format_timestamp};

fn status_style(color: Color) -> Style {
    Style::default().fg(color)
}

fn task_status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Completed => Color::Green,
        TaskStatus::Failed => Color::Red,
        TaskStatus::Processing => Color::Yellow,
    }
}

struct TableView<const N: usize> {
    title: String,
    columns: [(&'static str, Constraint); N],
    rows: Vec<Row<'static>>,
    selected: usize,
    empty_text: String,
}

fn draw_table<const N: usize>(frame: &mut ratatui::Frame, area: Rect, view: TableView<N>) {
    let block = Block::default().borders(Borders::ALL).title(view.title);
    if view.rows.is_empty() {
        let empty = Paragraph::new(view.empty_text)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }
    let header = Row::new(view.columns.map(|(name, _)| name))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let selected = view.selected;
    let table = Table::new(view.rows, view.columns.map(|(_, width)| width))
        .header(header)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(block);
    let mut state = TableState::default().with_selected(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

impl TuiApp {
    pub(in crate::tui) fn draw_users(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let rows = self
            .users
            .rows
            .iter()
            .map(|user| {
                Row::new(vec![
                    user.fid.clone(),
                    or_dash(&user.nickname).to_string(),
                    user.kid.to_string(),
                    format_timestamp(user.created_at.as_deref(), self.utc_offset),
                ])
            })
            .collect();
        draw_table(
            frame,
            area,
            TableView {
                title: format!("Users ({})", self.users.rows.len()),
                columns: [
                    ("FID", Constraint::Length(16)),
                    ("Nickname", Constraint::Min(16)),
                    ("KID", Constraint::Length(8)),
                    ("Created", Constraint::Length(20)),
                ],
                rows,
                selected: self.users.selected,
                empty_text: self.users.empty_text("users"),
            },
        );
    }

    pub(in crate::tui) fn draw_user_detail(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let fid = self.detail_key.as_deref().unwrap_or("-");
        let rows = self
            .records
            .rows
            .iter()
            .map(|record| {
                let status = record.record_status();
                let color = match status {
                    RecordStatus::Success => Color::Green,
                    RecordStatus::Failed => Color::Red,
                    RecordStatus::Duplicate => Color::Gray,
                };
                Row::new(vec![
                    Cell::from(record.code.clone()),
                    Cell::from(status.label()).style(status_style(color)),
                    Cell::from(or_dash(&record.message).to_string()),
                    Cell::from(format_timestamp(record.created_at.as_deref(), self.utc_offset)),
                ])
            })
            .collect();
        draw_table(
            frame,
            area,
            TableView {
                title: format!("Redemption records for {fid}"),
                columns: [
                    ("Code", Constraint::Length(20)),
                    ("Status", Constraint::Length(10)),
                    ("Message", Constraint::Min(20)),
                    ("Time", Constraint::Length(20)),
                ],
                rows,
                selected: self.records.selected,
                empty_text: self.records.empty_text("redemption records"),
            },
        );
    }

    pub(in crate::tui) fn draw_tasks(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let rows = self
            .tasks
            .rows
            .iter()
            .map(|task| {
                let status = task.status();
                Row::new(vec![
                    Cell::from(task.display_name().to_string()),
                    Cell::from(status.label())
                        .style(status_style(task_status_color(status))),
                    Cell::from(task.retry_count.to_string()),
                    Cell::from(
                        task.last_error
                            .as_deref()
                            .map(|err| truncate_with_ellipsis(err, 40))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(format_timestamp(task.created_at.as_deref(), self.utc_offset)),
                ])
            })
            .collect();
        let title = format!(
            "Tasks ({}) | refresh {}{}",
            self.tasks.rows.len(),
            self.poller.interval(),
            if self.poller.is_running() { "" } else { " (paused)" }
        );
        draw_table(
            frame,
            area,
            TableView {
                title,
                columns: [
                    ("Code", Constraint::Length(20)),
                    ("Status", Constraint::Length(12)),
                    ("Retries", Constraint::Length(8)),
                    ("Last error", Constraint::Min(20)),
                    ("Created", Constraint::Length(20)),
                ],
                rows,
                selected: self.tasks.selected,
                empty_text: self.tasks.empty_text("tasks"),
            },
        );
    }

    pub(in crate::tui) fn draw_completed(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let rows = self
            .completed
            .rows
            .iter()
            .map(|task| {
                let label = self.delete_label(task.id());
                let action_style = if label == "Delete" {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Row::new(vec![
                    Cell::from(task.display_name().to_string()),
                    Cell::from(task.retry_count.to_string()),
                    Cell::from(format_timestamp(task.created_at.as_deref(), self.utc_offset)),
                    Cell::from(format_timestamp(task.completed_at.as_deref(), self.utc_offset)),
                    Cell::from(label).style(action_style),
                ])
            })
            .collect();
        draw_table(
            frame,
            area,
            TableView {
                title: format!(
                    "Completed tasks ({}) | latest {}",
                    self.completed.rows.len(),
                    DEFAULT_PAGE_LIMIT
                ),
                columns: [
                    ("Code", Constraint::Min(20)),
                    ("Retries", Constraint::Length(8)),
                    ("Created", Constraint::Length(20)),
                    ("Completed", Constraint::Length(20)),
                    ("Action", Constraint::Length(12)),
                ],
                rows,
                selected: self.completed.selected,
                empty_text: self.completed.empty_text("completed tasks"),
            },
        );
    }

    pub(in crate::tui) fn draw_notifications(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let rows = self
            .notifications
            .rows
            .iter()
            .map(|notification| {
                let (label, color) = if notification.succeeded() {
                    ("success", Color::Green)
                } else {
                    ("failed", Color::Red)
                };
                Row::new(vec![
                    Cell::from(notification.channel.clone()),
                    Cell::from(notification.title.clone()),
                    Cell::from(notification.content_preview()),
                    Cell::from(notification.result_preview()),
                    Cell::from(label).style(status_style(color)),
                    Cell::from(format_timestamp(
                        notification.created_at.as_deref(),
                        self.utc_offset,
                    )),
                ])
            })
            .collect();
        draw_table(
            frame,
            area,
            TableView {
                title: format!("Notifications ({})", self.notifications.rows.len()),
                columns: [
                    ("Channel", Constraint::Length(10)),
                    ("Title", Constraint::Length(16)),
                    ("Content", Constraint::Min(20)),
                    ("Result", Constraint::Min(16)),
                    ("Status", Constraint::Length(8)),
                    ("Time", Constraint::Length(20)),
                ],
                rows,
                selected: self.notifications.selected,
                empty_text: self.notifications.empty_text("notifications"),
            },
        );
    }
}
