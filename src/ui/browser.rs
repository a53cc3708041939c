use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::app::App;
use crate::engine::session::Session;
use crate::storage::download_base;
use crate::ui::constants::{MARK_OFF, MARK_ON};
use crate::ui::helpers::{list_state, truncate_path};

pub(crate) fn draw_browser(frame: &mut Frame<'_>, app: &App, session: &Session, area: Rect) {
    let level = session.current();
    let header_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let title_width = area.width.saturating_sub(4) as usize;
    let block = Block::default()
        .title(Line::from(Span::styled(
            truncate_path(&level.path, title_width),
            header_style,
        )))
        .borders(Borders::ALL);

    let visible = level.visible_entries(app.settings.show_hidden);
    let items: Vec<ListItem> = if visible.is_empty() {
        vec![ListItem::new(Span::styled(
            "(empty)",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        visible
            .iter()
            .map(|entry| {
                let marked = session.is_selected(&entry.path);
                let mark = if marked { MARK_ON } else { MARK_OFF };
                let is_dir = entry.is_dir == Some(true);
                let suffix = if is_dir { "/" } else { "" };
                let mut style = Style::default();
                if is_dir {
                    style = style.fg(Color::Cyan);
                }
                if marked {
                    style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
                }
                ListItem::new(Line::from(Span::styled(
                    format!("{mark}{}{suffix}", entry.name),
                    style,
                )))
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(Span::styled(
            "> ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    let mut state = list_state(level.cursor, visible.len());
    frame.render_stateful_widget(list, area, &mut state);
}

pub(crate) fn draw_marked_panel(frame: &mut Frame<'_>, app: &App, session: &Session, area: Rect) {
    let header_style = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    let marked = session.selection.all_marked();
    let width = area.width.saturating_sub(4) as usize;

    let destination = download_base(&app.settings)
        .map(|base| base.display().to_string())
        .unwrap_or_else(|_| "-".to_string());
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Host: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(session.config.label()),
        ]),
        Line::from(vec![
            Span::styled("Saves to: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(truncate_path(&destination, width.saturating_sub(10))),
        ]),
        Line::from(""),
    ];
    if marked.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing marked",
            Style::default().fg(Color::Gray),
        )));
    } else {
        lines.extend(
            marked
                .iter()
                .map(|path| Line::from(format!("  {}", truncate_path(path, width.saturating_sub(2))))),
        );
    }

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled(
                    format!("Marked ({})", marked.len()),
                    header_style,
                ))),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}
