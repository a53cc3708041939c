use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::engine::preview::{PREVIEW_MAX_BYTES, PreviewOutcome};
use crate::ui::helpers::{format_bytes, key_hint_line, truncate_path};

pub(crate) fn draw_preview(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(preview) = &app.preview else {
        return;
    };
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let block = Block::default().borders(Borders::ALL).title(Line::from(Span::styled(
        truncate_path(&preview.path, area.width.saturating_sub(4) as usize),
        header_style,
    )));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(inner);
    let body = layout[0];
    let muted = Style::default().fg(Color::Gray);

    let (lines, position) = match &preview.outcome {
        PreviewOutcome::Content(bytes) if preview.binary => (
            vec![Line::from(Span::styled(
                format!("Binary file ({}), not shown", format_bytes(bytes.len() as u64)),
                muted,
            ))],
            String::new(),
        ),
        PreviewOutcome::Content(_) => {
            let total = preview.lines.len();
            let visible: Vec<Line> = preview
                .lines
                .iter()
                .skip(preview.scroll)
                .take(body.height as usize)
                .map(|line| Line::from(line.replace('\t', "    ")))
                .collect();
            let last = (preview.scroll + visible.len()).min(total);
            let position = format!("lines {}-{last} of {total}", preview.scroll + 1);
            (visible, position)
        }
        PreviewOutcome::Empty => (
            vec![Line::from(Span::styled("(empty file)", muted))],
            String::new(),
        ),
        PreviewOutcome::TooLarge(size) => (
            vec![Line::from(Span::styled(
                format!(
                    "File too large to preview ({}, limit {})",
                    format_bytes(*size),
                    format_bytes(PREVIEW_MAX_BYTES)
                ),
                muted,
            ))],
            String::new(),
        ),
        PreviewOutcome::Failed(reason) => (
            vec![Line::from(Span::styled(
                format!("Cannot read file: {reason}"),
                Style::default().fg(Color::Red),
            ))],
            String::new(),
        ),
    };
    frame.render_widget(Paragraph::new(lines), body);

    let mut footer_line = key_hint_line(&[("Up/Down/PgUp/PgDn", "to scroll"), ("Esc", "to close")]);
    if !position.is_empty() {
        footer_line.spans.push(Span::raw(format!(" | {position}")));
    }
    let footer = Paragraph::new(footer_line)
        .style(muted)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, layout[1]);
}
