use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "tiffin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub submit_endpoint: Option<String>,
    pub submit_timeout_ms: u64,
    pub default_plan: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub command_queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            submit_endpoint: None,
            submit_timeout_ms: 10_000,
            default_plan: Some("monthly".into()),
            catalog_path: None,
            command_queue_capacity: 64,
        }
    }
}

impl Settings {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(endpoint) = &self.submit_endpoint {
            let url = Url::parse(endpoint)
                .with_context(|| format!("submit endpoint '{endpoint}' is not a valid URL"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("submit endpoint '{endpoint}' must use http or https");
            }
        }
        if self.submit_timeout_ms == 0 {
            bail!("submit timeout must be greater than zero");
        }
        if self.command_queue_capacity == 0 {
            bail!("command queue capacity must be greater than zero");
        }
        Ok(())
    }
}

/// Keys accepted in `tiffin.toml`. Anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    submit_endpoint: Option<String>,
    submit_timeout_ms: Option<u64>,
    default_plan: Option<String>,
    catalog_path: Option<PathBuf>,
    command_queue_capacity: Option<usize>,
}

pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    let raw = match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(_) if config_path.is_none() => None,
        Err(error) => {
            warn!(path = %path.display(), %error, "config file unreadable; using defaults");
            None
        }
    };
    settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the config file contents, then environment overrides.
pub(crate) fn settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => warn!(%error, "ignoring malformed config file"),
        }
    }

    let var = |key: &str| env_override(&env, key);

    if let Some(v) = var("SUBMIT_ENDPOINT") {
        settings.submit_endpoint = non_blank(v);
    }

    if let Some(v) = var("SUBMIT_TIMEOUT_MS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.submit_timeout_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid SUBMIT_TIMEOUT_MS override"),
        }
    }

    if let Some(v) = var("DEFAULT_PLAN") {
        // an empty value means "no plan preselected"
        settings.default_plan = non_blank(v);
    }

    if let Some(v) = var("CATALOG_PATH") {
        settings.catalog_path = non_blank(v).map(PathBuf::from);
    }

    if let Some(v) = var("QUEUE_CAPACITY") {
        match v.trim().parse::<usize>() {
            Ok(parsed) => settings.command_queue_capacity = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid QUEUE_CAPACITY override"),
        }
    }

    settings
}

/// Every key is read as `TIFFIN_<KEY>` and `APP__<KEY>`; `APP__` wins when both are set.
fn env_override(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(&format!("APP__{key}")).or_else(|| env(&format!("TIFFIN_{key}")))
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.submit_endpoint {
        settings.submit_endpoint = non_blank(v);
    }
    if let Some(v) = file_cfg.submit_timeout_ms {
        settings.submit_timeout_ms = v;
    }
    if let Some(v) = file_cfg.default_plan {
        settings.default_plan = non_blank(v);
    }
    if let Some(v) = file_cfg.catalog_path {
        settings.catalog_path = Some(v);
    }
    if let Some(v) = file_cfg.command_queue_capacity {
        settings.command_queue_capacity = v;
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
