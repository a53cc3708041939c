use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::{AuthKind, ConnectionForm, Field};
use crate::ui::constants::{LABEL_WIDTH, POPUP_MIN_HEIGHT, POPUP_MIN_WIDTH};

pub(crate) fn field_line(
    label: &str,
    value: &str,
    active: bool,
    mask: bool,
    label_width: usize,
    max_value_width: usize,
) -> Line<'static> {
    let display = if mask && !value.is_empty() {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let display = truncate_text(&display, max_value_width);
    let indicator = if active { "> " } else { "  " };
    let indicator_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let spans = vec![
        Span::styled(indicator, indicator_style),
        Span::styled(
            format!("{label:<label_width$}: "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(display),
    ];
    Line::from(spans)
}

pub(crate) fn action_line(label: &str, active: bool) -> Line<'static> {
    let indicator = if active { "> " } else { "  " };
    let indicator_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let spans = vec![
        Span::styled(indicator, indicator_style),
        Span::styled(label.to_string(), Style::default().add_modifier(Modifier::BOLD)),
    ];
    Line::from(spans)
}

/// Footer line of `(key, description)` pairs, e.g. "Enter to open, Esc to close".
pub(crate) fn key_hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, (key, description)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(", "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {description}")));
    }
    Line::from(spans)
}

pub(crate) fn truncate_text(value: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let count = value.chars().count();
    if count <= max_width {
        return value.to_string();
    }
    if max_width <= 3 {
        return value.chars().take(max_width).collect();
    }
    let mut trimmed: String = value.chars().take(max_width - 3).collect();
    trimmed.push_str("...");
    trimmed
}

/// Keeps the tail of a path, which is the part that tells entries apart.
pub(crate) fn truncate_path(value: &str, max_width: usize) -> String {
    let count = value.chars().count();
    if count <= max_width {
        return value.to_string();
    }
    if max_width <= 3 {
        return value.chars().skip(count - max_width).collect();
    }
    let tail: String = value.chars().skip(count - (max_width - 3)).collect();
    format!("...{tail}")
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0usize;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

pub(crate) fn render_input_cursor(
    frame: &mut Frame<'_>,
    form: &ConnectionForm,
    area: Rect,
    scroll: usize,
    active_row: Option<usize>,
    max_value_width: usize,
) {
    let col = match form.active_field {
        Field::Host => form.host.chars().count(),
        Field::Port => form.port.chars().count(),
        Field::User => form.user.chars().count(),
        Field::KeyPath => form.key_path.chars().count(),
        Field::Password => form.password.chars().count(),
        Field::AuthType | Field::ActionConnect => return,
    };
    let Some(row) = active_row else {
        return;
    };
    if row < scroll {
        return;
    }
    let visible_row = row.saturating_sub(scroll);
    if visible_row >= area.height as usize {
        return;
    }
    let indicator_len = 2u16;
    let label_len = LABEL_WIDTH as u16 + 2;
    let col = col.min(max_value_width) as u16;
    let cursor_x = area.x + indicator_len + label_len + col;
    let cursor_y = area.y + visible_row as u16;
    frame.set_cursor_position((cursor_x, cursor_y));
}

pub(crate) fn auth_kind_label(kind: AuthKind) -> &'static str {
    match kind {
        AuthKind::Password => "Password",
        AuthKind::PrivateKey => "Private key",
    }
}

pub(crate) fn centered_rect_by_height(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width * percent_x / 100).min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    centered_rect_abs(width, height, area)
}

pub(crate) fn centered_rect_abs(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.max(POPUP_MIN_WIDTH).min(area.width);
    let height = height.max(POPUP_MIN_HEIGHT).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

pub(crate) fn padded_rect(area: Rect, pad: u16) -> Rect {
    Rect {
        x: area.x + pad,
        y: area.y + pad,
        width: area.width.saturating_sub(pad * 2),
        height: area.height.saturating_sub(pad * 2),
    }
}

pub(crate) fn modal_height(content_lines: usize, footer_lines: usize) -> u16 {
    let total = content_lines + footer_lines;
    (total as u16).saturating_add(2 + 2)
}

pub(crate) fn draw_popup_frame(frame: &mut Frame<'_>, area: Rect, title: &str, style: Style) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).border_style(style);
    frame.render_widget(block, area);
    let inner = padded_rect(area, 1);
    if inner.height < 2 {
        return inner;
    }
    let title_line = Paragraph::new(title)
        .alignment(Alignment::Center)
        .style(style.add_modifier(Modifier::BOLD));
    frame.render_widget(
        title_line,
        Rect {
            x: inner.x,
            y: inner.y,
            width: inner.width,
            height: 1,
        },
    );
    let line = "-".repeat(inner.width as usize);
    let separator = Paragraph::new(line).style(style);
    frame.render_widget(
        separator,
        Rect {
            x: inner.x,
            y: inner.y + 1,
            width: inner.width,
            height: 1,
        },
    );
    Rect {
        x: inner.x,
        y: inner.y + 2,
        width: inner.width,
        height: inner.height.saturating_sub(2),
    }
}

pub(crate) fn list_state(selected: usize, len: usize) -> ratatui::widgets::ListState {
    let mut state = ratatui::widgets::ListState::default();
    if len == 0 {
        state.select(None);
    } else {
        state.select(Some(selected.min(len.saturating_sub(1))));
    }
    state
}
