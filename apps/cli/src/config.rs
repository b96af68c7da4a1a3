use std::{collections::HashMap, fs, path::PathBuf};

use client_core::DEFAULT_API_BASE_URL;

const SETTINGS_FILE: &str = "kanban.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub session_path: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            session_path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanban")
        .join("session.json")
}

pub fn load_settings(api_url_flag: Option<String>) -> ClientSettings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    let mut settings = resolve_settings(file.as_deref(), |key| std::env::var(key).ok());
    if let Some(url) = api_url_flag {
        settings.api_base_url = url;
    }
    settings
}

/// Defaults, then `kanban.toml`, then environment.
pub(crate) fn resolve_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
                if let Some(v) = file_cfg.get("session_path") {
                    settings.session_path = PathBuf::from(v);
                }
            }
            Err(error) => tracing::warn!(%error, "ignoring malformed {SETTINGS_FILE}"),
        }
    }

    if let Some(v) = env("KANBAN_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("KANBAN_SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
