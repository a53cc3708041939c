use anyhow::Result;

use crate::app::App;
use crate::engine::session::{Session, resolve_start_dir};
use crate::model::{ConnectionConfig, Mode, SavedConnection};
use crate::storage::save_settings;

impl App {
    pub(crate) fn submit_form(&mut self) {
        let config = match self.form.validate() {
            Ok(config) => config,
            Err(err) => {
                self.form_feedback = Some(err.to_string());
                return;
            }
        };
        let label = config.label();
        self.set_status(format!("Connecting to {label}"));
        match self.open_session(config) {
            Ok(()) => {
                self.form.password.clear();
                self.form_feedback = None;
                self.mode = Mode::Browse;
                let path = self
                    .session
                    .as_ref()
                    .map(|session| session.current().path.clone())
                    .unwrap_or_default();
                self.set_status(format!("Connected to {label}, browsing {path}"));
            }
            Err(err) => {
                let message = format!("{err:#}");
                self.form_feedback = Some(message.clone());
                self.set_status(format!("Connection to {label} failed: {message}"));
            }
        }
    }

    fn open_session(&mut self, config: ConnectionConfig) -> Result<()> {
        let gateway = self.connector.connect(&config)?;
        let remembered = self
            .settings
            .last_connection
            .as_ref()
            .filter(|saved| saved.same_target(&config))
            .and_then(|saved| saved.last_remote_dir.clone());
        let start = resolve_start_dir(gateway.as_ref(), &config.user, remembered.as_deref());
        let mut saved = SavedConnection::from_config(&config);
        let session = Session::open(config, gateway, &start)?;
        saved.last_remote_dir = Some(start);
        self.settings.last_connection = Some(saved);
        self.session = Some(session);
        self.persist_settings();
        Ok(())
    }

    /// Leaves the browser for the connection form and drops the session.
    pub(crate) fn close_session(&mut self) {
        self.remember_remote_dir();
        if let Some(session) = self.session.take() {
            let dropped = session.selection.len();
            let mut message = format!("Disconnected from {}", session.config.label());
            if dropped > 0 {
                message.push_str(&format!(", {dropped} marked entries discarded"));
            }
            self.set_status(message);
        }
        self.preview = None;
        self.mode = Mode::Form;
    }

    pub(crate) fn remember_remote_dir(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let path = session.current().path.clone();
        let Some(saved) = self.settings.last_connection.as_mut() else {
            return;
        };
        if !saved.same_target(&session.config) || saved.last_remote_dir.as_deref() == Some(&path) {
            return;
        }
        saved.last_remote_dir = Some(path);
        self.persist_settings();
    }

    pub(crate) fn persist_settings(&mut self) {
        if let Err(err) = save_settings(&self.config_path, &self.settings) {
            self.report_error("Failed to save settings", &err);
        }
    }
}
