use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, HeaderMode};
use crate::model::{Mode, TransferStep};
use crate::ui::constants::{HEADER_HEIGHT, LOGS_HEADER_HEIGHT, STATUS_HEIGHT, browser_columns};
use crate::ui::modals::{draw_connection_modal, draw_notice_modal, draw_transfer_modal};
use crate::ui::panels::{draw_header, draw_idle_panel, draw_status_bar};

mod browser;
pub(crate) mod constants;
pub(crate) mod helpers;
mod modals;
mod panels;
mod preview;

pub(crate) fn header_height(mode: HeaderMode) -> u16 {
    match mode {
        HeaderMode::Help => HEADER_HEIGHT,
        HeaderMode::Logs => LOGS_HEADER_HEIGHT,
        HeaderMode::Off => 0,
    }
}

/// Rows left for listing entries once header, status bar, and borders are drawn.
pub(crate) fn body_rows(terminal_rows: u16, mode: HeaderMode) -> u16 {
    terminal_rows
        .saturating_sub(header_height(mode))
        .saturating_sub(STATUS_HEIGHT)
        .saturating_sub(2)
}

pub(crate) fn draw_ui(frame: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(header_height(app.header_mode)),
                Constraint::Min(1),
                Constraint::Length(STATUS_HEIGHT),
            ]
            .as_ref(),
        )
        .split(frame.area());

    if app.header_mode != HeaderMode::Off {
        draw_header(frame, app, layout[0]);
    }

    match (app.mode, &app.session) {
        (Mode::Preview, Some(_)) => preview::draw_preview(frame, app, layout[1]),
        (Mode::Browse, Some(session)) => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(browser_columns().as_ref())
                .split(layout[1]);
            browser::draw_browser(frame, app, session, body[0]);
            browser::draw_marked_panel(frame, app, session, body[1]);
        }
        _ => draw_idle_panel(frame, app, layout[1]),
    }
    draw_status_bar(frame, app, layout[2]);

    if app.mode == Mode::Form {
        draw_connection_modal(frame, app);
    }
    let show_transfer = app.transfer.as_ref().is_some_and(|t| {
        t.step == TransferStep::Confirm || !app.transfer_hidden
    });
    if show_transfer {
        draw_transfer_modal(frame, app);
    }
    if app.notice.is_some() {
        draw_notice_modal(frame, app);
    }
}
