use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};

use crate::app::App;
use crate::model::{AuthKind, Field, TransferStep};
use crate::ui::constants::{
    LABEL_WIDTH, MODAL_MAX_HEIGHT_PERCENT, MODAL_MIN_WIDTH, MODAL_WIDTH_PERCENT,
    NOTICE_WIDTH_PERCENT, TRANSFER_MODAL_WIDTH_PERCENT,
};
use crate::ui::helpers::{
    action_line, auth_kind_label, centered_rect_abs, centered_rect_by_height, draw_popup_frame,
    field_line, format_bytes, key_hint_line, modal_height, render_input_cursor, truncate_path,
};

pub(crate) fn draw_connection_modal(frame: &mut Frame<'_>, app: &App) {
    let form = &app.form;
    let footer_lines = vec![
        key_hint_line(&[
            ("Tab", "or Up/Down to move"),
            ("Left/Right", "to switch auth"),
        ]),
        key_hint_line(&[("Enter", "on Connect to log in"), ("Esc", "to quit")]),
    ];

    let area_width = (frame.area().width.saturating_mul(MODAL_WIDTH_PERCENT) / 100)
        .min(frame.area().width.saturating_sub(2))
        .max(MODAL_MIN_WIDTH);
    let pad = 1u16;
    let content_width = area_width.saturating_sub(2 + pad * 2);
    let value_width = content_width.saturating_sub(2 + LABEL_WIDTH as u16 + 2) as usize;
    let max_height = frame.area().height.saturating_mul(MODAL_MAX_HEIGHT_PERCENT) / 100;

    let mut lines = Vec::new();
    let mut active_row = None;
    for field in form.fields() {
        if field == form.active_field {
            active_row = Some(lines.len());
        }
        let active = field == form.active_field;
        let line = match field {
            Field::Host => field_line("Server", &form.host, active, false, LABEL_WIDTH, value_width),
            Field::Port => field_line("Port", &form.port, active, false, LABEL_WIDTH, value_width),
            Field::User => field_line("User", &form.user, active, false, LABEL_WIDTH, value_width),
            Field::AuthType => field_line(
                "Auth",
                auth_kind_label(form.auth_kind),
                active,
                false,
                LABEL_WIDTH,
                value_width,
            ),
            Field::KeyPath => {
                field_line("Key path", &form.key_path, active, false, LABEL_WIDTH, value_width)
            }
            Field::Password => {
                let label = match form.auth_kind {
                    AuthKind::Password => "Password",
                    AuthKind::PrivateKey => "Passphrase",
                };
                field_line(label, &form.password, active, true, LABEL_WIDTH, value_width)
            }
            Field::ActionConnect => {
                lines.push(Line::from(""));
                if active {
                    active_row = Some(lines.len());
                }
                action_line("Connect", active)
            }
        };
        lines.push(line);
    }

    if let Some(message) = &app.form_feedback {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let desired_height = modal_height(lines.len(), footer_lines.len() + 1);
    let area_height = desired_height
        .max(10)
        .min(max_height.max(10))
        .min(frame.area().height.saturating_sub(2));
    let area = centered_rect_abs(area_width, area_height, frame.area());
    let inner = draw_popup_frame(frame, area, "Connect to server", Style::default().fg(Color::Yellow));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(footer_lines.len() as u16 + 1),
            ]
            .as_ref(),
        )
        .split(inner);

    let max_visible = layout[0].height as usize;
    let scroll = if lines.len() > max_visible {
        let row = active_row.unwrap_or(0);
        let offset = (row + 1).saturating_sub(max_visible);
        offset.min(lines.len().saturating_sub(max_visible))
    } else {
        0
    };
    let visible_lines = if lines.len() > max_visible {
        lines[scroll..scroll + max_visible].to_vec()
    } else {
        lines
    };
    let paragraph = Paragraph::new(visible_lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, layout[0]);
    render_input_cursor(frame, form, layout[0], scroll, active_row, value_width);

    let footer = Paragraph::new(footer_lines)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, layout[1]);
}

pub(crate) fn draw_transfer_modal(frame: &mut Frame<'_>, app: &App) {
    let Some(transfer) = &app.transfer else {
        return;
    };
    let transferring = transfer.step == TransferStep::Transferring;
    let shown_paths = transfer.marked.len().min(5);
    let content_lines = 3 + shown_paths + usize::from(transfer.marked.len() > shown_paths);
    let extra = if transferring { 2 } else { 0 };
    let height = modal_height(content_lines + extra, 2);
    let area = centered_rect_by_height(TRANSFER_MODAL_WIDTH_PERCENT, height, frame.area());
    let title = if transferring {
        "Downloading"
    } else {
        "Download marked entries?"
    };
    let inner = draw_popup_frame(frame, area, title, Style::default());
    let width = inner.width.saturating_sub(4) as usize;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Into: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(truncate_path(
                &transfer.destination.display().to_string(),
                width.saturating_sub(2),
            )),
        ]),
        Line::from(format!("{} marked entries:", transfer.marked.len())),
    ];
    for path in transfer.marked.iter().take(shown_paths) {
        lines.push(Line::from(format!("  {}", truncate_path(path, width))));
    }
    if transfer.marked.len() > shown_paths {
        lines.push(Line::from(format!(
            "  ... and {} more",
            transfer.marked.len() - shown_paths
        )));
    }
    if transferring {
        lines.push(Line::from(""));
        let current = transfer.current.as_deref().unwrap_or("connecting...");
        let state = if transfer.cancel_requested {
            "Cancelling at"
        } else {
            "Copying"
        };
        lines.push(Line::from(format!("{state} {}", truncate_path(current, width))));
    }

    let layout = if transferring {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(3),
                    Constraint::Length(1),
                    Constraint::Length(2),
                ]
                .as_ref(),
            )
            .split(inner)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)].as_ref())
            .split(inner)
    };
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, layout[0]);

    if transferring {
        // Total size is unknown up front, so the gauge tracks files written.
        let total = transfer.marked.len().max(transfer.files_done).max(1);
        let ratio = (transfer.files_done as f64 / total as f64).min(1.0);
        let label = format!(
            "{} files, {}",
            transfer.files_done,
            format_bytes(transfer.progress_bytes)
        );
        let gauge = Gauge::default()
            .ratio(ratio)
            .label(label)
            .style(Style::default().fg(Color::Gray))
            .gauge_style(Style::default().fg(Color::Green));
        frame.render_widget(gauge, layout[1]);
    }

    let hints = if transferring {
        key_hint_line(&[("h", "to hide"), ("Esc", "to cancel")])
    } else {
        key_hint_line(&[("Enter", "to download"), ("Esc", "to cancel")])
    };
    let footer = Paragraph::new(hints)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    let footer_area = if transferring { layout[2] } else { layout[1] };
    frame.render_widget(footer, footer_area);
}

pub(crate) fn draw_notice_modal(frame: &mut Frame<'_>, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };
    let message_lines = notice.message.lines().count().max(1);
    let height = modal_height(message_lines + 3, 1);
    let area = centered_rect_by_height(NOTICE_WIDTH_PERCENT, height, frame.area());
    let inner = draw_popup_frame(
        frame,
        area,
        notice.title.as_str(),
        Style::default().fg(Color::Yellow),
    );

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(2)].as_ref())
        .split(inner);

    let message = Paragraph::new(notice.message.as_str()).wrap(Wrap { trim: true });
    frame.render_widget(message, layout[0]);

    let footer = Paragraph::new(Line::from(vec![
        Span::raw("Press "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" to close."),
    ]))
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, layout[1]);
}
