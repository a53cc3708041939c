use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::preview::PreviewOutcome;
use crate::engine::transfer::{TransferError, TransferSummary};

pub(crate) const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConnectionConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) user: String,
    pub(crate) auth: AuthConfig,
}

impl ConnectionConfig {
    pub(crate) fn label(&self) -> String {
        if self.port == DEFAULT_SSH_PORT {
            format!("{}@{}", self.user, self.host)
        } else {
            format!("{}@{}:{}", self.user, self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AuthConfig {
    Password {
        password: String,
    },
    PrivateKey {
        path: String,
        passphrase: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub(crate) enum AuthKind {
    #[default]
    Password,
    PrivateKey,
}

/// Connection details remembered between runs. Secrets are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SavedConnection {
    pub(crate) host: String,
    #[serde(default = "default_port")]
    pub(crate) port: u16,
    pub(crate) user: String,
    #[serde(default)]
    pub(crate) auth_kind: AuthKind,
    #[serde(default)]
    pub(crate) key_path: String,
    #[serde(default)]
    pub(crate) last_remote_dir: Option<String>,
}

impl SavedConnection {
    pub(crate) fn from_config(config: &ConnectionConfig) -> Self {
        let (auth_kind, key_path) = match &config.auth {
            AuthConfig::Password { .. } => (AuthKind::Password, String::new()),
            AuthConfig::PrivateKey { path, .. } => (AuthKind::PrivateKey, path.clone()),
        };
        Self {
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            auth_kind,
            key_path,
            last_remote_dir: None,
        }
    }

    pub(crate) fn same_target(&self, config: &ConnectionConfig) -> bool {
        self.host == config.host && self.port == config.port && self.user == config.user
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Host,
    Port,
    User,
    AuthType,
    KeyPath,
    Password,
    ActionConnect,
}

#[derive(Debug, Clone)]
pub(crate) struct ConnectionForm {
    pub(crate) host: String,
    pub(crate) port: String,
    pub(crate) user: String,
    pub(crate) auth_kind: AuthKind,
    pub(crate) key_path: String,
    pub(crate) password: String,
    pub(crate) active_field: Field,
}

impl Default for ConnectionForm {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_SSH_PORT.to_string(),
            user: String::new(),
            auth_kind: AuthKind::Password,
            key_path: String::new(),
            password: String::new(),
            active_field: Field::Host,
        }
    }
}

impl ConnectionForm {
    pub(crate) fn from_saved(saved: &SavedConnection) -> Self {
        Self {
            host: saved.host.clone(),
            port: saved.port.to_string(),
            user: saved.user.clone(),
            auth_kind: saved.auth_kind,
            key_path: saved.key_path.clone(),
            password: String::new(),
            active_field: Field::Password,
        }
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Host, Field::Port, Field::User, Field::AuthType];
        if self.auth_kind == AuthKind::PrivateKey {
            fields.push(Field::KeyPath);
        }
        fields.push(Field::Password);
        fields.push(Field::ActionConnect);
        fields
    }

    pub(crate) fn validate(&self) -> Result<ConnectionConfig> {
        let host = self.host.trim();
        if host.is_empty() {
            anyhow::bail!("Server address is required");
        }
        let user = self.user.trim();
        if user.is_empty() {
            anyhow::bail!("Username is required");
        }
        let port = parse_port(&self.port)?;
        let auth = match self.auth_kind {
            AuthKind::Password => {
                if self.password.is_empty() {
                    anyhow::bail!("Password is required");
                }
                AuthConfig::Password {
                    password: self.password.clone(),
                }
            }
            AuthKind::PrivateKey => {
                let path = self.key_path.trim();
                if path.is_empty() {
                    anyhow::bail!("Key file path is required");
                }
                AuthConfig::PrivateKey {
                    path: path.to_string(),
                    passphrase: if self.password.is_empty() {
                        None
                    } else {
                        Some(self.password.clone())
                    },
                }
            }
        };
        Ok(ConnectionConfig {
            host: host.to_string(),
            port,
            user: user.to_string(),
            auth,
        })
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_SSH_PORT);
    }
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => anyhow::bail!("Port must be a number between 1 and 65535"),
        Ok(port) => Ok(port),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemoteEntry {
    pub(crate) name: String,
    pub(crate) path: String,
    /// Listing hint only; `RemoteGateway::is_directory` is authoritative.
    pub(crate) is_dir: Option<bool>,
}

impl RemoteEntry {
    pub(crate) fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DirectoryLevel {
    pub(crate) path: String,
    pub(crate) entries: Vec<RemoteEntry>,
    pub(crate) cursor: usize,
}

impl DirectoryLevel {
    pub(crate) fn visible_entries(&self, show_hidden: bool) -> Vec<&RemoteEntry> {
        self.entries
            .iter()
            .filter(|entry| show_hidden || !entry.is_hidden())
            .collect()
    }

    pub(crate) fn highlighted(&self, show_hidden: bool) -> Option<&RemoteEntry> {
        self.visible_entries(show_hidden).get(self.cursor).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Form,
    Browse,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransferStep {
    Confirm,
    Transferring,
}

#[derive(Debug, Clone)]
pub(crate) struct TransferState {
    pub(crate) marked: Vec<String>,
    pub(crate) destination: PathBuf,
    pub(crate) step: TransferStep,
    pub(crate) progress_bytes: u64,
    pub(crate) files_done: usize,
    pub(crate) current: Option<String>,
    pub(crate) cancel_requested: bool,
}

pub(crate) enum TransferUpdate {
    Started { remote: String, local: PathBuf },
    Bytes(u64),
    Done(Result<TransferSummary, TransferError>),
}

/// An open preview. Text is decoded once when the preview opens.
#[derive(Debug, Clone)]
pub(crate) struct PreviewState {
    pub(crate) path: String,
    pub(crate) outcome: PreviewOutcome,
    pub(crate) binary: bool,
    pub(crate) lines: Vec<String>,
    pub(crate) scroll: usize,
}

impl PreviewState {
    pub(crate) fn new(path: String, outcome: PreviewOutcome) -> Self {
        let binary = outcome.is_binary();
        let lines = if binary { Vec::new() } else { outcome.lines() };
        Self {
            path,
            outcome,
            binary,
            lines,
            scroll: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Notice {
    pub(crate) title: String,
    pub(crate) message: String,
}
