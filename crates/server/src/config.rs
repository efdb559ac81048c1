use std::{collections::HashMap, fs};

use serde::Deserialize;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            database_url: "sqlite://./data/books.db".into(),
        }
    }
}

/// Defaults, then `server.toml`, then environment variables; later sources win.
/// The database URL comes back already normalised.
pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    resolve_settings(file.as_deref(), |key| std::env::var(key).ok())
}

fn resolve_settings(file: Option<&str>, var: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();
    if let Some(raw) = file {
        apply_file(&mut settings, raw);
    }
    apply_env(&mut settings, var);
    settings.database_url = normalize_database_url(&settings.database_url);
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unreadable settings file");
        return;
    };
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = var(key) {
            settings.server_bind = v;
        }
    }
    for key in ["DATABASE_URL", "APP__DATABASE_URL"] {
        if let Some(v) = var(key) {
            settings.database_url = v;
        }
    }
}

/// Turns plain file paths into sqlite URLs. Windows drive paths use the
/// single-colon `sqlite:C:/...` form.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }
    if raw_database_url.starts_with("sqlite::memory:") {
        return raw_database_url.to_string();
    }

    if let Some(rest) = raw_database_url.strip_prefix("sqlite://") {
        if has_drive_prefix(rest) {
            return format!("sqlite:{}", rest.replace('\\', "/"));
        }
        return raw_database_url.to_string();
    }

    let path = match raw_database_url.strip_prefix("sqlite:") {
        Some(rest) => rest,
        None if raw_database_url.contains("://") => return raw_database_url.to_string(),
        None => raw_database_url,
    }
    .replace('\\', "/");

    if has_drive_prefix(&path) {
        format!("sqlite:{path}")
    } else {
        format!("sqlite://{path}")
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
