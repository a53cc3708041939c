use std::sync::mpsc;

use crate::app::App;
use crate::app::constants::{
    NOTHING_MARKED_MESSAGE, NOTICE_TRANSFER_DONE_TITLE, NOTICE_TRANSFER_FAILED_TITLE,
    STATUS_CANCELLED, TRANSFER_LOG_THRESHOLD_BYTES, TRANSFER_RUNNING_MESSAGE,
};
use crate::engine::transfer::{
    DATE_STAMP_FORMAT, TransferError, TransferSummary, prepare_destination, transfer_marked,
};
use crate::model::{Notice, TransferState, TransferStep, TransferUpdate};
use crate::storage::download_base;
use crate::ui::helpers::format_bytes;

impl App {
    /// Opens the confirmation step for everything marked so far.
    pub(crate) fn request_transfer(&mut self) {
        if self.transfer_running() {
            self.set_status(TRANSFER_RUNNING_MESSAGE);
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        if session.selection.is_empty() {
            self.set_status(NOTHING_MARKED_MESSAGE);
            return;
        }
        let marked = session.marked();
        let base = match download_base(&self.settings) {
            Ok(base) => base,
            Err(err) => {
                self.report_error("Cannot pick a download folder", &err);
                return;
            }
        };
        let stamp = chrono::Local::now().format(DATE_STAMP_FORMAT).to_string();
        self.transfer = Some(TransferState {
            marked,
            destination: base.join(stamp),
            step: TransferStep::Confirm,
            progress_bytes: 0,
            files_done: 0,
            current: None,
            cancel_requested: false,
        });
    }

    pub(crate) fn start_transfer_job(&mut self) {
        let Some(mut transfer) = self.transfer.take() else {
            return;
        };
        let Some(session) = &self.session else {
            return;
        };
        let config = session.config.clone();
        // Marks taken at confirm time; later toggles do not change the job.
        transfer.marked = session.marked();
        let base = match download_base(&self.settings) {
            Ok(base) => base,
            Err(err) => {
                self.report_error("Cannot pick a download folder", &err);
                return;
            }
        };
        let today = chrono::Local::now().date_naive();
        let destination = match prepare_destination(&base, today) {
            Ok(destination) => destination,
            Err(err) => {
                self.notice = Some(Notice {
                    title: NOTICE_TRANSFER_FAILED_TITLE.to_string(),
                    message: format!("{err:#}"),
                });
                self.log_line(&format!("Transfer not started: {err:#}"));
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        let (cancel_tx, cancel_rx) = mpsc::channel();
        let connector = self.connector.clone();
        let marked = transfer.marked.clone();
        let local_root = destination.clone();
        std::thread::spawn(move || {
            let result = match connector.connect(&config) {
                Ok(gateway) => {
                    transfer_marked(gateway.as_ref(), &marked, &local_root, &tx, &cancel_rx)
                }
                Err(err) => Err(TransferError::Connect {
                    host: config.label(),
                    message: format!("{err:#}"),
                }),
            };
            let _ = tx.send(TransferUpdate::Done(result));
        });

        self.log_line(&format!(
            "Transfer of {} marked entries into {} started",
            transfer.marked.len(),
            destination.display()
        ));
        transfer.destination = destination;
        transfer.step = TransferStep::Transferring;
        transfer.progress_bytes = 0;
        transfer.files_done = 0;
        self.transfer = Some(transfer);
        self.transfer_progress = Some(rx);
        self.transfer_cancel = Some(cancel_tx);
        self.transfer_hidden = false;
        self.transfer_last_logged = 0;
    }

    /// Drops a pending confirmation, or asks a running worker to stop.
    pub(crate) fn request_cancel(&mut self) {
        if !self.transfer_running() {
            self.transfer = None;
            self.set_status(STATUS_CANCELLED);
            return;
        }
        if let Some(cancel) = &self.transfer_cancel {
            let _ = cancel.send(());
        }
        if let Some(transfer) = &mut self.transfer {
            transfer.cancel_requested = true;
        }
        self.transfer_hidden = false;
        self.set_status("Cancelling transfer");
    }

    pub(crate) fn poll_transfer_progress(&mut self) {
        let Some(rx) = self.transfer_progress.take() else {
            return;
        };
        let mut done = false;
        while let Ok(update) = rx.try_recv() {
            match update {
                TransferUpdate::Started { remote, local } => {
                    self.log_line(&format!("Copying {remote} -> {}", local.display()));
                    if let Some(transfer) = &mut self.transfer {
                        transfer.current = Some(remote);
                    }
                }
                TransferUpdate::Bytes(amount) => {
                    let mut log_message = None;
                    if let Some(transfer) = &mut self.transfer {
                        transfer.progress_bytes = transfer.progress_bytes.saturating_add(amount);
                        transfer.files_done += 1;
                        if transfer
                            .progress_bytes
                            .saturating_sub(self.transfer_last_logged)
                            >= TRANSFER_LOG_THRESHOLD_BYTES
                        {
                            log_message = Some((
                                format!(
                                    "Transfer progress: {} in {} files",
                                    format_bytes(transfer.progress_bytes),
                                    transfer.files_done
                                ),
                                transfer.progress_bytes,
                            ));
                        }
                    }
                    if let Some((message, progress)) = log_message {
                        self.log_line(&message);
                        self.transfer_last_logged = progress;
                    }
                }
                TransferUpdate::Done(result) => {
                    self.finish_transfer(result);
                    done = true;
                }
            }
        }
        if !done {
            self.transfer_progress = Some(rx);
        }
    }

    fn finish_transfer(&mut self, result: Result<TransferSummary, TransferError>) {
        let destination = self
            .transfer
            .take()
            .map(|transfer| transfer.destination.display().to_string())
            .unwrap_or_default();
        self.transfer_cancel = None;
        self.transfer_hidden = false;
        match result {
            Ok(summary) => {
                if let Some(session) = &mut self.session {
                    session.selection.clear();
                }
                let message = format!(
                    "Copied {} files in {} folders ({}) into {destination}",
                    summary.files,
                    summary.dirs,
                    format_bytes(summary.bytes)
                );
                self.set_status(message.clone());
                self.notice = Some(Notice {
                    title: NOTICE_TRANSFER_DONE_TITLE.to_string(),
                    message,
                });
            }
            Err(err) => {
                self.set_status(format!("Transfer stopped at {}", err.path()));
                self.notice = Some(Notice {
                    title: NOTICE_TRANSFER_FAILED_TITLE.to_string(),
                    message: format!("{err}\nFiles copied before the failure were kept in {destination}."),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use super::*;
    use crate::engine::gateway::{MockConnector, MockGateway};

    fn connected(dir: &std::path::Path, gateway: Arc<MockGateway>) -> (App, Arc<MockConnector>) {
        let connector = Arc::new(MockConnector::with_gateway(gateway));
        let mut app = App::for_test(connector.clone(), dir);
        app.form.host = "host".to_string();
        app.form.user = "u".to_string();
        app.form.password = "pw".to_string();
        app.submit_form();
        (app, connector)
    }

    fn tree() -> Arc<MockGateway> {
        let gateway = Arc::new(MockGateway::default());
        gateway.add_file("/home/u/report.txt", b"quarterly");
        gateway.add_file("/home/u/data/x.csv", b"1,2");
        gateway.add_file("/home/u/data/y.csv", b"3,4");
        gateway
    }

    fn today_dir(dir: &std::path::Path) -> std::path::PathBuf {
        dir.join("downloads")
            .join(chrono::Local::now().format(DATE_STAMP_FORMAT).to_string())
    }

    #[test]
    fn nothing_marked_does_not_open_confirm() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = connected(dir.path(), tree());
        app.request_transfer();
        assert!(app.transfer.is_none());
        assert_eq!(app.status, NOTHING_MARKED_MESSAGE);
    }

    #[test]
    fn confirmed_transfer_copies_and_clears_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, connector) = connected(dir.path(), tree());
        if let Some(session) = app.session.as_mut() {
            session.toggle_selection("/home/u/report.txt");
            session.toggle_selection("/home/u/data");
        }
        app.request_transfer();
        let pending = app.transfer.as_ref().unwrap();
        assert_eq!(pending.step, TransferStep::Confirm);
        assert_eq!(pending.destination, today_dir(dir.path()));

        app.start_transfer_job();
        assert!(app.transfer_running());
        app.wait_for_transfer();

        let root = today_dir(dir.path());
        assert_eq!(fs::read(root.join("report.txt")).unwrap(), b"quarterly");
        assert_eq!(fs::read(root.join("data/x.csv")).unwrap(), b"1,2");
        assert_eq!(fs::read(root.join("data/y.csv")).unwrap(), b"3,4");
        assert!(app.session.as_ref().unwrap().selection.is_empty());
        assert_eq!(app.notice.as_ref().unwrap().title, NOTICE_TRANSFER_DONE_TITLE);
        assert!(app.transfer.is_none());
        // The worker opens its own connection next to the browsing one.
        assert_eq!(connector.connects(), 2);
    }

    #[test]
    fn failed_transfer_keeps_selection() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = tree();
        gateway.fail_read("/home/u/data/x.csv");
        let (mut app, _) = connected(dir.path(), gateway);
        if let Some(session) = app.session.as_mut() {
            session.toggle_selection("/home/u/data");
            session.toggle_selection("/home/u/report.txt");
        }
        app.request_transfer();
        app.start_transfer_job();
        app.wait_for_transfer();

        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.title, NOTICE_TRANSFER_FAILED_TITLE);
        assert!(notice.message.contains("/home/u/data/x.csv"));
        assert!(!today_dir(dir.path()).join("report.txt").exists());
        assert_eq!(app.session.as_ref().unwrap().selection.len(), 2);
    }

    #[test]
    fn worker_connect_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, connector) = connected(dir.path(), tree());
        if let Some(session) = app.session.as_mut() {
            session.toggle_selection("/home/u/report.txt");
        }
        app.request_transfer();
        connector.set_error(Some("connection refused"));
        app.start_transfer_job();
        app.wait_for_transfer();
        let notice = app.notice.as_ref().unwrap();
        assert!(notice.message.contains("connection refused"));
        assert_eq!(app.session.as_ref().unwrap().selection.len(), 1);
    }

    #[test]
    fn cancel_before_start_drops_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = connected(dir.path(), tree());
        if let Some(session) = app.session.as_mut() {
            session.toggle_selection("/home/u/report.txt");
        }
        app.request_transfer();
        app.request_cancel();
        assert!(app.transfer.is_none());
        assert_eq!(app.status, STATUS_CANCELLED);
        assert!(!today_dir(dir.path()).exists());
    }
}
