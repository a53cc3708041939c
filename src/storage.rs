use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::SavedConnection;
use crate::ssh::expand_tilde;

const APP_DIR: &str = "sshfetch";
const DOWNLOAD_DIR: &str = "sshfetch";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Settings {
    #[serde(default)]
    pub(crate) last_connection: Option<SavedConnection>,
    /// Base folder for downloads; dated subfolders are created inside.
    #[serde(default)]
    pub(crate) download_root: Option<String>,
    #[serde(default)]
    pub(crate) show_hidden: bool,
}

fn app_dir() -> Result<PathBuf> {
    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_DIR);
        return Ok(dir);
    }
    let mut fallback = std::env::current_dir().context("current dir")?;
    fallback.push(format!(".{APP_DIR}"));
    Ok(fallback)
}

pub(crate) fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("settings.json"))
}

pub(crate) fn log_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(format!("{APP_DIR}.log")))
}

pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path).context("read settings file")?;
    let settings = serde_json::from_str(&content).context("parse settings file")?;
    Ok(settings)
}

pub(crate) fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create config dir")?;
    }
    let content = serde_json::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, content).context("write settings file")?;
    Ok(())
}

/// Folder that receives the dated download folders.
pub(crate) fn download_base(settings: &Settings) -> Result<PathBuf> {
    if let Some(root) = settings
        .download_root
        .as_deref()
        .filter(|root| !root.trim().is_empty())
    {
        return Ok(expand_tilde(root.trim()));
    }
    let home = dirs::home_dir().context("locate home directory")?;
    Ok(home.join(DOWNLOAD_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuthKind;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            last_connection: Some(SavedConnection {
                host: "h".to_string(),
                port: 2200,
                user: "u".to_string(),
                auth_kind: AuthKind::PrivateKey,
                key_path: "~/.ssh/id".to_string(),
                last_remote_dir: Some("/srv".to_string()),
            }),
            download_root: Some("/tmp/pulls".to_string()),
            show_hidden: true,
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn sparse_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "last_connection": { "host": "h", "user": "u" } }"#,
        )
        .unwrap();
        let settings = load_settings(&path).unwrap();
        let saved = settings.last_connection.unwrap();
        assert_eq!(saved.port, 22);
        assert_eq!(saved.auth_kind, AuthKind::Password);
        assert!(!settings.show_hidden);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn download_base_prefers_configured_root() {
        let settings = Settings {
            download_root: Some(" /data/inbox ".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            download_base(&settings).unwrap(),
            PathBuf::from("/data/inbox")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                download_base(&Settings::default()).unwrap(),
                home.join("sshfetch")
            );
        }
    }
}
