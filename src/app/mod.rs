use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use anyhow::Result;

use crate::app::constants::{LOG_NO_LOGS_MESSAGE, STATUS_READY};
use crate::app::logging::prune_log_file;
use crate::engine::gateway::RemoteConnector;
use crate::engine::session::Session;
use crate::model::{
    ConnectionForm, Mode, Notice, PreviewState, TransferState, TransferUpdate,
};
use crate::ssh::SshConnector;
use crate::storage::{Settings, config_path, load_settings, log_path};

mod browse;
mod connect;
mod constants;
mod handlers;
mod logging;
mod transfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderMode {
    Help,
    Logs,
    Off,
}

pub(crate) struct App {
    pub(crate) config_path: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) last_log: String,
    pub(crate) log_lines: VecDeque<String>,
    pub(crate) settings: Settings,
    pub(crate) connector: Arc<dyn RemoteConnector>,
    pub(crate) mode: Mode,
    pub(crate) form: ConnectionForm,
    pub(crate) form_feedback: Option<String>,
    pub(crate) session: Option<Session>,
    pub(crate) preview: Option<PreviewState>,
    pub(crate) transfer: Option<TransferState>,
    pub(crate) transfer_progress: Option<mpsc::Receiver<TransferUpdate>>,
    pub(crate) transfer_cancel: Option<mpsc::Sender<()>>,
    pub(crate) transfer_hidden: bool,
    pub(crate) transfer_last_logged: u64,
    pub(crate) notice: Option<Notice>,
    pub(crate) header_mode: HeaderMode,
    pub(crate) status: String,
    pub(crate) details_height: u16,
}

impl App {
    pub(crate) fn load() -> Result<Self> {
        let config_path = config_path()?;
        let log_path = log_path()?;
        prune_log_file(&log_path);
        let (settings, settings_error) = match load_settings(&config_path) {
            Ok(settings) => (settings, None),
            Err(err) => (Settings::default(), Some(format!("{err:#}"))),
        };
        let mut app = Self::new(config_path, log_path, settings, Arc::new(SshConnector));
        if let Some(err) = settings_error {
            app.log_line(&format!("Ignoring unreadable settings: {err}"));
        }
        app.set_status(STATUS_READY);
        Ok(app)
    }

    fn new(
        config_path: PathBuf,
        log_path: PathBuf,
        settings: Settings,
        connector: Arc<dyn RemoteConnector>,
    ) -> Self {
        let form = settings
            .last_connection
            .as_ref()
            .map(ConnectionForm::from_saved)
            .unwrap_or_default();
        Self {
            config_path,
            log_path,
            last_log: String::from(LOG_NO_LOGS_MESSAGE),
            log_lines: VecDeque::new(),
            settings,
            connector,
            mode: Mode::Form,
            form,
            form_feedback: None,
            session: None,
            preview: None,
            transfer: None,
            transfer_progress: None,
            transfer_cancel: None,
            transfer_hidden: false,
            transfer_last_logged: 0,
            notice: None,
            header_mode: HeaderMode::Help,
            status: STATUS_READY.to_string(),
            details_height: 0,
        }
    }

    pub(crate) fn set_details_height(&mut self, height: u16) {
        self.details_height = height;
    }

    pub(crate) fn page_size(&self) -> usize {
        usize::from(self.details_height.max(1))
    }

    pub(crate) fn transfer_running(&self) -> bool {
        self.transfer_progress.is_some()
    }
}

#[cfg(test)]
impl App {
    pub(crate) fn for_test(connector: Arc<dyn RemoteConnector>, dir: &std::path::Path) -> Self {
        let settings = Settings {
            download_root: Some(dir.join("downloads").to_string_lossy().into_owned()),
            ..Settings::default()
        };
        Self::new(
            dir.join("settings.json"),
            dir.join("sshfetch.log"),
            settings,
            connector,
        )
    }

    /// Polls the worker until the running transfer reports back.
    pub(crate) fn wait_for_transfer(&mut self) {
        for _ in 0..500 {
            self.poll_transfer_progress();
            if !self.transfer_running() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        panic!("transfer did not finish");
    }
}
