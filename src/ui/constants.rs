use ratatui::layout::Constraint;

use crate::model::Mode;

pub(crate) const HELP_FORM: &str = "Tab/Up/Down move | Left/Right auth | Enter connect | Esc quit";
pub(crate) const HELP_BROWSE: &str = "Enter open | Backspace up | Space mark | (v)iew | (d)ownload | (r)eload | (.) hidden | (l)ogs | (q)uit";
pub(crate) const HELP_PREVIEW: &str = "Up/Down/PgUp/PgDn scroll | Home/End | Esc close";

pub(crate) const LABEL_WIDTH: usize = 10;

pub(crate) const HEADER_HEIGHT: u16 = 3;
pub(crate) const LOGS_HEADER_HEIGHT: u16 = 8;
pub(crate) const STATUS_HEIGHT: u16 = 1;

pub(crate) const HEADER_COLUMN_PERCENTAGES: [u16; 2] = [30, 70];
pub(crate) const BROWSER_COLUMN_PERCENTAGES: [u16; 2] = [65, 35];

pub(crate) const MODAL_WIDTH_PERCENT: u16 = 70;
pub(crate) const MODAL_MAX_HEIGHT_PERCENT: u16 = 70;
pub(crate) const MODAL_MIN_WIDTH: u16 = 30;

pub(crate) const TRANSFER_MODAL_WIDTH_PERCENT: u16 = 70;
pub(crate) const NOTICE_WIDTH_PERCENT: u16 = 60;

pub(crate) const POPUP_MIN_WIDTH: u16 = 10;
pub(crate) const POPUP_MIN_HEIGHT: u16 = 5;

pub(crate) const MARK_ON: &str = "[x] ";
pub(crate) const MARK_OFF: &str = "[ ] ";

pub(crate) fn help_text(mode: Mode) -> &'static str {
    match mode {
        Mode::Form => HELP_FORM,
        Mode::Browse => HELP_BROWSE,
        Mode::Preview => HELP_PREVIEW,
    }
}

pub(crate) fn header_columns() -> [Constraint; 2] {
    HEADER_COLUMN_PERCENTAGES.map(Constraint::Percentage)
}

pub(crate) fn browser_columns() -> [Constraint; 2] {
    BROWSER_COLUMN_PERCENTAGES.map(Constraint::Percentage)
}
