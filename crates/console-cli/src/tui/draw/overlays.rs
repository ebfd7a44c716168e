use super::*;

fn field_lines(fields: &[InputField], active: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, field) in fields.iter().enumerate() {
        let marker = if idx == active { "> " } else { "  " };
        let mut label_style = Style::default();
        if idx == active {
            label_style = label_style.add_modifier(Modifier::BOLD);
        }
        let required = if field.rule.required { " *" } else { "" };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}{required}: ", field.label), label_style),
            Span::raw(field.display_value()),
            Span::styled(
                if idx == active { "_" } else { "" },
                Style::default().add_modifier(Modifier::SLOW_BLINK),
            ),
        ]));
        if let Some(err) = &field.error {
            lines.push(Line::from(Span::styled(
                format!("    {err}"),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines
}

impl TuiApp {
    pub(in crate::tui) fn draw_login(&self, frame: &mut ratatui::Frame) {
        let area = centered_rect(60, 14, frame.area());
        let mut lines = vec![
            Line::from(Span::styled(
                "Admin Console",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::raw(format!("Server: {}", self.server_url))),
            Line::from(""),
        ];
        lines.extend(field_lines(&self.login_fields, self.login_index));
        lines.push(Line::from(""));
        if self.login_pending {
            lines.push(Line::from(Span::styled(
                "Signing in...",
                Style::default().fg(Color::Yellow),
            )));
        } else if let Some(message) = &self.login_message {
            lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Tab: next field | Enter: log in | Esc: quit",
            Style::default().fg(Color::DarkGray),
        )));

        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Log in"));
        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }

    pub(in crate::tui) fn draw_form(&self, frame: &mut ratatui::Frame) {
        let Some(form) = &self.form else {
            return;
        };
        let area = centered_rect(56, 9, frame.area());
        let mut lines = field_lines(&form.fields, form.index);
        lines.push(Line::from(""));
        if let Some(message) = &form.message {
            lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Enter: submit | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )));
        let widget = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(form.kind.title()));
        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }

    pub(in crate::tui) fn draw_dialog(&self, frame: &mut ratatui::Frame) {
        let Some(dialog) = &self.dialog else {
            return;
        };
        let area = centered_rect(64, 10, frame.area());
        let mut lines: Vec<Line> = dialog
            .message
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "y/Enter: confirm | n/Esc: cancel",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(dialog.title.clone()),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(widget, area);
    }
}
