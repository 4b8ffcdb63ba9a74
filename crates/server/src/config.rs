use std::{collections::HashMap, fs, path::Path};

use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub log_filter: String,
    pub max_message_bytes: usize,
    pub page_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:4567".into(),
            log_filter: "info".into(),
            max_message_bytes: 64 * 1024,
            page_title: "Trellis".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_PATH), |key| std::env::var(key).ok())
}

/// Defaults, then the flat table in `path` if it exists, then the
/// environment as read through `env`.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable config file"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = env("APP__MAX_MESSAGE_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_message_bytes = parsed;
        }
    }

    if let Some(v) = env("APP__PAGE_TITLE") {
        settings.page_title = v;
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_text(file_cfg, "bind_addr") {
        settings.server_bind = v;
    }
    if let Some(v) = file_text(file_cfg, "log_filter") {
        settings.log_filter = v;
    }
    if let Some(parsed) = file_text(file_cfg, "max_message_bytes").and_then(|v| v.parse().ok()) {
        settings.max_message_bytes = parsed;
    }
    if let Some(v) = file_text(file_cfg, "page_title") {
        settings.page_title = v;
    }
}

/// Scalars are accepted either quoted or bare.
fn file_text(file_cfg: &HashMap<String, toml::Value>, key: &str) -> Option<String> {
    match file_cfg.get(key)? {
        toml::Value::String(v) => Some(v.clone()),
        toml::Value::Integer(v) => Some(v.to_string()),
        toml::Value::Float(v) => Some(v.to_string()),
        toml::Value::Boolean(v) => Some(v.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
