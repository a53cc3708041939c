use crate::app::App;
use crate::app::constants::NOTICE_LIST_FAILED_TITLE;
use crate::engine::navigation::{Ascent, Descent};
use crate::engine::preview::PreviewOutcome;
use crate::model::{Mode, Notice, PreviewState, RemoteEntry};
use crate::ui::helpers::format_bytes;

impl App {
    pub(crate) fn highlighted_entry(&self) -> Option<RemoteEntry> {
        let session = self.session.as_ref()?;
        session
            .current()
            .highlighted(self.settings.show_hidden)
            .cloned()
    }

    pub(crate) fn move_cursor(&mut self, delta: isize) {
        let show_hidden = self.settings.show_hidden;
        if let Some(session) = &mut self.session {
            session.navigation.move_cursor(delta, show_hidden);
        }
    }

    pub(crate) fn open_highlighted(&mut self) {
        let Some(entry) = self.highlighted_entry() else {
            return;
        };
        let Some(session) = &mut self.session else {
            return;
        };
        match session.descend(&entry.name) {
            Ok(Descent::Entered) => {
                let path = session.current().path.clone();
                self.set_status(format!("Opened {path}"));
            }
            Ok(Descent::NotDirectory) => {
                self.set_status(format!("{} is not a directory (v to preview)", entry.name));
            }
            Ok(Descent::ProbeFailed(reason)) => {
                self.set_status(format!("Cannot tell whether {} is a directory: {reason}", entry.path));
            }
            Err(err) => {
                let message = format!("{err:#}");
                self.log_line(&format!("Listing failed: {message}"));
                self.notice = Some(Notice {
                    title: NOTICE_LIST_FAILED_TITLE.to_string(),
                    message,
                });
            }
        }
    }

    pub(crate) fn go_up(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        match session.ascend() {
            Ascent::Popped => {
                let show_hidden = self.settings.show_hidden;
                session.navigation.clamp_cursor(show_hidden);
                let path = session.current().path.clone();
                self.set_status(format!("Back in {path}"));
            }
            Ascent::ExitToForm => self.close_session(),
        }
    }

    pub(crate) fn toggle_highlighted(&mut self) {
        let Some(entry) = self.highlighted_entry() else {
            return;
        };
        let Some(session) = &mut self.session else {
            return;
        };
        let marked = session.toggle_selection(&entry.path);
        let total = session.selection.len();
        let verb = if marked { "Marked" } else { "Unmarked" };
        self.set_status(format!("{verb} {} ({total} marked)", entry.path));
        self.move_cursor(1);
    }

    pub(crate) fn preview_highlighted(&mut self) {
        let Some(entry) = self.highlighted_entry() else {
            return;
        };
        if entry.is_dir == Some(true) {
            self.set_status(format!("{} is a directory", entry.name));
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        let outcome = session.preview(&entry.path);
        match &outcome {
            PreviewOutcome::Content(bytes) => {
                self.set_status(format!("Previewing {} ({} bytes)", entry.path, bytes.len()));
            }
            PreviewOutcome::Empty => self.set_status(format!("{} is empty", entry.path)),
            PreviewOutcome::TooLarge(size) => self.set_status(format!(
                "{} is too large to preview ({})",
                entry.path,
                format_bytes(*size)
            )),
            PreviewOutcome::Failed(reason) => {
                self.set_status(format!("Preview of {} failed: {reason}", entry.path));
            }
        }
        self.preview = Some(PreviewState::new(entry.path, outcome));
        self.mode = Mode::Preview;
    }

    pub(crate) fn close_preview(&mut self) {
        self.preview = None;
        self.mode = Mode::Browse;
    }

    pub(crate) fn scroll_preview(&mut self, delta: isize) {
        let Some(preview) = &mut self.preview else {
            return;
        };
        let max = preview.lines.len().saturating_sub(1);
        let next = if delta.is_negative() {
            preview.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            preview.scroll.saturating_add(delta.unsigned_abs())
        };
        preview.scroll = next.min(max);
    }

    pub(crate) fn refresh_listing(&mut self) {
        let show_hidden = self.settings.show_hidden;
        let Some(session) = &mut self.session else {
            return;
        };
        match session.refresh() {
            Ok(()) => {
                session.navigation.clamp_cursor(show_hidden);
                let path = session.current().path.clone();
                self.set_status(format!("Reloaded {path}"));
            }
            Err(err) => self.report_error("Reload failed", &err),
        }
    }

    pub(crate) fn toggle_hidden(&mut self) {
        self.settings.show_hidden = !self.settings.show_hidden;
        let show_hidden = self.settings.show_hidden;
        if let Some(session) = &mut self.session {
            session.navigation.clamp_cursor(show_hidden);
        }
        self.persist_settings();
        self.set_status(if show_hidden {
            "Showing hidden files"
        } else {
            "Hiding hidden files"
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::gateway::{MockConnector, MockGateway};
    use crate::engine::preview::PREVIEW_MAX_BYTES;

    fn connected(dir: &std::path::Path, gateway: Arc<MockGateway>) -> App {
        let mut app = App::for_test(Arc::new(MockConnector::with_gateway(gateway)), dir);
        app.form.host = "host".to_string();
        app.form.user = "u".to_string();
        app.form.password = "pw".to_string();
        app.submit_form();
        app
    }

    fn tree() -> Arc<MockGateway> {
        let gateway = Arc::new(MockGateway::default());
        gateway.add_file("/home/u/.bashrc", b"alias ll='ls -l'");
        gateway.add_dir("/home/u/data");
        gateway.add_file("/home/u/data/x.csv", b"1,2");
        gateway.add_file("/home/u/empty.txt", b"");
        gateway
    }

    #[test]
    fn hidden_entries_are_skipped_until_toggled() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected(dir.path(), tree());
        assert_eq!(app.highlighted_entry().unwrap().name, "data");
        app.toggle_hidden();
        assert!(app.settings.show_hidden);
        assert_eq!(app.highlighted_entry().unwrap().name, ".bashrc");
    }

    #[test]
    fn listing_error_shows_notice_and_keeps_level() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = tree();
        gateway.fail_list("/home/u/data");
        let mut app = connected(dir.path(), gateway);
        app.open_highlighted();
        assert!(app.notice.is_some());
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.current().path, "/home/u");
        assert_eq!(session.navigation.depth(), 1);
    }

    #[test]
    fn ascend_from_first_level_returns_to_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected(dir.path(), tree());
        app.open_highlighted();
        assert_eq!(app.session.as_ref().unwrap().navigation.depth(), 2);
        app.go_up();
        assert_eq!(app.mode, Mode::Browse);
        app.go_up();
        assert_eq!(app.mode, Mode::Form);
        assert!(app.session.is_none());
    }

    #[test]
    fn preview_of_empty_file_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected(dir.path(), tree());
        app.move_cursor(1);
        assert_eq!(app.highlighted_entry().unwrap().name, "empty.txt");
        app.preview_highlighted();
        assert_eq!(app.mode, Mode::Preview);
        assert_eq!(
            app.preview.as_ref().unwrap().outcome,
            PreviewOutcome::Empty
        );
        app.close_preview();
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.highlighted_entry().unwrap().name, "empty.txt");
    }

    #[test]
    fn preview_scroll_stops_at_last_line() {
        let gateway = Arc::new(MockGateway::default());
        gateway.add_file("/home/u/notes.txt", b"one\ntwo\nthree");
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected(dir.path(), gateway);
        app.preview_highlighted();
        let preview = app.preview.as_ref().unwrap();
        assert!(!preview.binary);
        assert_eq!(preview.lines, vec!["one", "two", "three"]);
        app.scroll_preview(10);
        assert_eq!(app.preview.as_ref().unwrap().scroll, 2);
        app.scroll_preview(-1);
        assert_eq!(app.preview.as_ref().unwrap().scroll, 1);
    }

    #[test]
    fn oversized_file_opens_without_content() {
        let gateway = Arc::new(MockGateway::default());
        let size = PREVIEW_MAX_BYTES as usize + 10;
        gateway.add_file("/home/u/big.log", &vec![b'x'; size]);
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected(dir.path(), gateway.clone());
        app.preview_highlighted();
        let preview = app.preview.as_ref().unwrap();
        assert_eq!(preview.outcome, PreviewOutcome::TooLarge(size as u64));
        assert!(preview.lines.is_empty());
        assert!(app.status.contains("too large"));
        assert!(!gateway.calls().contains(&"read /home/u/big.log".to_string()));
    }

    #[test]
    fn preview_refuses_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected(dir.path(), tree());
        app.preview_highlighted();
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.preview.is_none());
    }

    #[test]
    fn toggle_marks_full_path_and_advances() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = connected(dir.path(), tree());
        app.toggle_highlighted();
        let session = app.session.as_ref().unwrap();
        assert!(session.is_selected("/home/u/data"));
        assert_eq!(app.highlighted_entry().unwrap().name, "empty.txt");
    }
}
