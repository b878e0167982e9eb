use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use puncher_client::{
    transport::DEFAULT_SERVER_URL, SyncOptions, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "puncher.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub reset_progress_on_idle: bool,
    pub download_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            reset_progress_on_idle: false,
            download_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            reset_progress_on_idle: self.reset_progress_on_idle,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.server_url)
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("server url must use http or https: '{}'", self.server_url);
        }
        if self.poll_interval_ms == 0 {
            bail!("poll interval must be greater than zero");
        }
        if self.request_timeout_ms == 0 {
            bail!("request timeout must be greater than zero");
        }
        Ok(())
    }

    fn apply_file_table(&mut self, table: &toml::Table) {
        for (key, value) in table {
            let raw = match value {
                toml::Value::String(v) => v.clone(),
                toml::Value::Integer(v) => v.to_string(),
                toml::Value::Boolean(v) => v.to_string(),
                other => {
                    warn!(key = %key, value = %other, "ignoring unsupported setting value");
                    continue;
                }
            };
            self.apply(key, &raw);
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("PUNCHER_SERVER_URL") {
            self.apply("server_url", &v);
        }
        for key in [
            "server_url",
            "poll_interval_ms",
            "request_timeout_ms",
            "reset_progress_on_idle",
            "download_dir",
        ] {
            if let Some(v) = lookup(&format!("APP__{}", key.to_ascii_uppercase())) {
                self.apply(key, &v);
            }
        }
    }

    fn apply(&mut self, key: &str, raw: &str) {
        match key {
            "server_url" => self.server_url = raw.trim().to_string(),
            "poll_interval_ms" => match raw.trim().parse::<u64>() {
                Ok(parsed) => self.poll_interval_ms = parsed,
                Err(err) => warn!(key, raw, error = %err, "ignoring invalid poll interval"),
            },
            "request_timeout_ms" => match raw.trim().parse::<u64>() {
                Ok(parsed) => self.request_timeout_ms = parsed,
                Err(err) => warn!(key, raw, error = %err, "ignoring invalid request timeout"),
            },
            "reset_progress_on_idle" => match parse_flag(raw) {
                Some(parsed) => self.reset_progress_on_idle = parsed,
                None => warn!(key, raw, "ignoring invalid boolean setting"),
            },
            "download_dir" => self.download_dir = PathBuf::from(raw.trim()),
            _ => warn!(key, "ignoring unknown setting"),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Defaults, then the settings file, then the environment. A missing default
/// file is fine; an explicitly requested one must exist.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(SETTINGS_FILE), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => {
            let table: toml::Table = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            settings.apply_file_table(&table);
        }
        Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
