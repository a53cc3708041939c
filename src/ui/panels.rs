use ratatui::Frame;
use ratatui::layout::{Alignment, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::{App, HeaderMode};
use crate::model::TransferStep;
use crate::ui::constants::{header_columns, help_text};
use crate::ui::helpers::{auth_kind_label, format_bytes, truncate_text};

pub(crate) fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(header_columns().as_ref())
        .split(area);

    let title = Paragraph::new(format!("SSHFETCH {}", env!("CARGO_PKG_VERSION")))
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(title, columns[0]);

    let header_style = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    match app.header_mode {
        HeaderMode::Help => {
            let help = Paragraph::new(help_text(app.mode))
                .block(
                    Block::default()
                        .title(Line::from(Span::styled("Help", header_style)))
                        .borders(Borders::ALL),
                )
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(help, columns[1]);
        }
        HeaderMode::Logs => {
            let log_lines = app
                .log_lines
                .iter()
                .rev()
                .take(columns[1].height.saturating_sub(2) as usize)
                .cloned()
                .collect::<Vec<_>>();
            let logs = Paragraph::new(log_lines.join("\n"))
                .block(
                    Block::default()
                        .title(Line::from(Span::styled("Logs", header_style)))
                        .borders(Borders::ALL),
                )
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true });
            frame.render_widget(logs, columns[1]);
        }
        HeaderMode::Off => {}
    }
}

/// Background shown behind the connection form.
pub(crate) fn draw_idle_panel(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from("Not connected"), Line::from("")];
    if let Some(saved) = &app.settings.last_connection {
        lines.push(Line::from(Span::styled(
            "Last connection",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {}@{}:{}", saved.user, saved.host, saved.port)));
        lines.push(Line::from(format!("  Auth: {}", auth_kind_label(saved.auth_kind))));
        if let Some(dir) = &saved.last_remote_dir {
            lines.push(Line::from(format!("  Last folder: {dir}")));
        }
    }
    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled("Remote files", header_style))),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

pub(crate) fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = Vec::new();
    if let Some(transfer) = &app.transfer {
        if transfer.step == TransferStep::Transferring && app.transfer_hidden {
            spans.push(Span::styled(
                format!(
                    "[transfer {} / {} files, h to show] ",
                    format_bytes(transfer.progress_bytes),
                    transfer.files_done
                ),
                Style::default().fg(Color::Green),
            ));
        }
    }
    let used: usize = spans.iter().map(|span| span.content.chars().count()).sum();
    let remaining = (area.width as usize).saturating_sub(used);
    spans.push(Span::raw(truncate_text(&app.status, remaining)));
    let status = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::Gray));
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::engine::gateway::MockConnector;

    fn render_with(app: &App, width: u16, height: u16, draw: fn(&mut Frame<'_>, &App, Rect)) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw(frame, app, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn header_switches_between_help_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::for_test(Arc::new(MockConnector::default()), dir.path());
        let content = render_with(&app, 120, 8, draw_header);
        assert!(content.contains("Help"));
        assert!(content.contains("Enter connect"));

        app.set_status("marker line");
        app.header_mode = HeaderMode::Logs;
        let content = render_with(&app, 120, 8, draw_header);
        assert!(content.contains("Logs"));
        assert!(content.contains("marker line"));
    }

    #[test]
    fn status_bar_shows_current_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::for_test(Arc::new(MockConnector::default()), dir.path());
        app.set_status("Reloaded /srv");
        let content = render_with(&app, 40, 1, draw_status_bar);
        assert!(content.contains("Reloaded /srv"));
    }
}
