//! Browser engine configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Browser engine configuration (the `[browser]` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Whether the browser tier is tried at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Run in headless mode (default: true).
    /// Set to false for debugging or if headless detection is an issue.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// How long to wait for `<body>` after navigation, in seconds.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,

    /// Fixed wait after the document is ready, for client-side rendering.
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// How long to wait for an anti-bot interstitial to clear. Zero checks once.
    #[serde(default = "default_challenge_timeout")]
    pub challenge_timeout_secs: u64,

    /// Interval between challenge checks.
    #[serde(default = "default_challenge_poll")]
    pub challenge_poll_ms: u64,

    /// Explicit Chrome/Chromium executable. Auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            headless: default_headless(),
            ready_timeout_secs: default_ready_timeout(),
            settle_ms: default_settle(),
            challenge_timeout_secs: default_challenge_timeout(),
            challenge_poll_ms: default_challenge_poll(),
            chrome_path: None,
            chrome_args: Vec::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_headless() -> bool {
    true
}

fn default_ready_timeout() -> u64 {
    15
}

fn default_settle() -> u64 {
    3000
}

fn default_challenge_timeout() -> u64 {
    10
}

fn default_challenge_poll() -> u64 {
    500
}

impl BrowserEngineConfig {
    /// Apply `HEADSCOUT_BROWSER` and `CHROME_PATH` on top of file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with a custom lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup("HEADSCOUT_BROWSER").and_then(|v| parse_switch(&v)) {
            self.enabled = enabled;
        }
        if let Some(path) = lookup("CHROME_PATH").filter(|p| !p.trim().is_empty()) {
            self.chrome_path = Some(PathBuf::from(path.trim()));
        }
        self
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn challenge_timeout(&self) -> Duration {
        Duration::from_secs(self.challenge_timeout_secs)
    }

    pub fn challenge_poll(&self) -> Duration {
        Duration::from_millis(self.challenge_poll_ms.max(50))
    }
}

/// Interpret an on/off environment value. Unknown values are ignored.
fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
