use std::time::Duration;

use ragdesk_core::{PollPolicy, DEFAULT_RETRIEVAL_MODE};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Budget for a single call, including reading the body.
    pub request_timeout: Duration,
    pub default_mode: String,
    pub poll: PollSettings,
    /// Delays, from send, of the loading-status updates after the first one.
    pub status_delays: Vec<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            default_mode: DEFAULT_RETRIEVAL_MODE.to_string(),
            poll: PollSettings::default(),
            status_delays: vec![
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(12),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub policy: PollPolicy,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            policy: PollPolicy::default(),
        }
    }
}
