use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, HeaderMode};
use crate::model::{AuthKind, Field, Mode, TransferStep};

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.notice = None;
            }
            return Ok(false);
        }
        if let Some(step) = self.transfer.as_ref().map(|t| t.step) {
            let hidden = step == TransferStep::Transferring && self.transfer_hidden;
            if !hidden {
                return self.handle_transfer_key(step, key);
            }
            // Typing `h` into the form must not bring the modal back.
            if key.code == KeyCode::Char('h') && self.mode != Mode::Form {
                self.transfer_hidden = false;
                return Ok(false);
            }
        }
        match self.mode {
            Mode::Form => self.handle_form_key(key),
            Mode::Browse => self.handle_browse_key(key),
            Mode::Preview => self.handle_preview_key(key),
        }
    }

    fn cycle_header_mode(&mut self) {
        self.header_mode = match self.header_mode {
            HeaderMode::Help => HeaderMode::Logs,
            HeaderMode::Logs => HeaderMode::Off,
            HeaderMode::Off => HeaderMode::Help,
        };
    }

    fn handle_transfer_key(&mut self, step: TransferStep, key: KeyEvent) -> Result<bool> {
        match step {
            TransferStep::Confirm => match key.code {
                KeyCode::Enter => self.start_transfer_job(),
                KeyCode::Esc => self.request_cancel(),
                _ => {}
            },
            TransferStep::Transferring => match key.code {
                KeyCode::Char('h') => self.transfer_hidden = true,
                KeyCode::Esc => self.request_cancel(),
                _ => {}
            },
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Tab | KeyCode::Down => self.advance_field(true),
            KeyCode::BackTab | KeyCode::Up => self.advance_field(false),
            KeyCode::Left | KeyCode::Right => {
                if self.form.active_field == Field::AuthType {
                    self.form.auth_kind = match self.form.auth_kind {
                        AuthKind::Password => AuthKind::PrivateKey,
                        AuthKind::PrivateKey => AuthKind::Password,
                    };
                }
            }
            KeyCode::Enter => match self.form.active_field {
                Field::ActionConnect => self.submit_form(),
                _ => self.advance_field(true),
            },
            KeyCode::Backspace => self.edit_active_field(EditAction::Backspace),
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(false);
                }
                self.edit_active_field(EditAction::Insert(ch));
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<bool> {
        let page = isize::try_from(self.page_size()).unwrap_or(isize::MAX);
        match key.code {
            KeyCode::Char('q') => {
                self.remember_remote_dir();
                return Ok(true);
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-page),
            KeyCode::PageDown => self.move_cursor(page),
            KeyCode::Home => self.move_cursor(isize::MIN),
            KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Enter | KeyCode::Right => self.open_highlighted(),
            KeyCode::Backspace | KeyCode::Left => self.go_up(),
            KeyCode::Char(' ') => self.toggle_highlighted(),
            KeyCode::Char('v') => self.preview_highlighted(),
            KeyCode::Char('d') => self.request_transfer(),
            KeyCode::Char('r') => self.refresh_listing(),
            KeyCode::Char('.') => self.toggle_hidden(),
            KeyCode::Char('l') => self.cycle_header_mode(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_preview_key(&mut self, key: KeyEvent) -> Result<bool> {
        let page = isize::try_from(self.page_size()).unwrap_or(isize::MAX);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('v') => self.close_preview(),
            KeyCode::Up => self.scroll_preview(-1),
            KeyCode::Down => self.scroll_preview(1),
            KeyCode::PageUp => self.scroll_preview(-page),
            KeyCode::PageDown => self.scroll_preview(page),
            KeyCode::Home => self.scroll_preview(isize::MIN),
            KeyCode::End => self.scroll_preview(isize::MAX),
            _ => {}
        }
        Ok(false)
    }

    fn advance_field(&mut self, forward: bool) {
        let fields = self.form.fields();
        let pos = fields
            .iter()
            .position(|field| *field == self.form.active_field)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % fields.len()
        } else if pos == 0 {
            fields.len() - 1
        } else {
            pos - 1
        };
        self.form.active_field = fields[next];
    }

    fn edit_active_field(&mut self, action: EditAction) {
        let target = match self.form.active_field {
            Field::Host => &mut self.form.host,
            Field::Port => &mut self.form.port,
            Field::User => &mut self.form.user,
            Field::KeyPath => &mut self.form.key_path,
            Field::Password => &mut self.form.password,
            Field::AuthType | Field::ActionConnect => return,
        };
        match action {
            EditAction::Insert(ch) => target.push(ch),
            EditAction::Backspace => {
                target.pop();
            }
        }
        self.form_feedback = None;
    }
}

enum EditAction {
    Insert(char),
    Backspace,
}
