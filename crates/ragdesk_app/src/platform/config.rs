use std::fs;
use std::path::Path;
use std::time::Duration;

use ragdesk_engine::ClientSettings;
use ragdesk_logging::{rag_info, rag_warn};
use serde::Deserialize;

/// Values taken from the command line or the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub mode: Option<String>,
}

/// Optional settings file. Every field may be left out.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    mode: Option<String>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    /// `0` keeps polling through any number of failures.
    max_poll_failures: Option<u32>,
    max_backoff_ticks: Option<u32>,
    status_delays_ms: Option<Vec<u64>>,
}

/// Built-in defaults, then `path`, then `overrides`.
pub fn load_settings(path: &Path, overrides: &Overrides) -> ClientSettings {
    let mut settings = ClientSettings::default();
    if let Some(file) = read_file_config(path) {
        apply_file_config(&mut settings, file);
    }
    if let Some(api_url) = &overrides.api_url {
        settings.base_url = api_url.clone();
    }
    if let Some(mode) = &overrides.mode {
        settings.default_mode = mode.clone();
    }
    settings
}

fn read_file_config(path: &Path) -> Option<FileConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            rag_warn!("Failed to read settings from {:?}: {}", path, err);
            return None;
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            rag_info!("Loaded settings from {:?}", path);
            Some(config)
        }
        Err(err) => {
            rag_warn!("Ignoring malformed settings in {:?}: {}", path, err);
            None
        }
    }
}

fn apply_file_config(settings: &mut ClientSettings, file: FileConfig) {
    if let Some(api_url) = file.api_url {
        settings.base_url = api_url;
    }
    if let Some(mode) = file.mode {
        settings.default_mode = mode;
    }
    if let Some(ms) = file.connect_timeout_ms {
        settings.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = file.request_timeout_ms {
        settings.request_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = file.poll_interval_ms {
        settings.poll.interval = Duration::from_millis(ms.max(1));
    }
    if let Some(max) = file.max_poll_failures {
        settings.poll.policy.max_consecutive_failures = (max > 0).then_some(max);
    }
    if let Some(ticks) = file.max_backoff_ticks {
        settings.poll.policy.max_backoff_ticks = ticks;
    }
    if let Some(delays) = file.status_delays_ms {
        settings.status_delays = delays.into_iter().map(Duration::from_millis).collect();
    }
}
