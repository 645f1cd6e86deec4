//! Browser-based fetcher for anti-bot protected sites.
//!
//! Uses chromiumoxide (CDP) with stealth evasion techniques to get past
//! JavaScript challenges that the static tier cannot render.

mod config;
#[cfg(feature = "browser")]
mod fetch;
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
mod lifecycle;
mod stealth;

pub use config::BrowserEngineConfig;
pub use lifecycle::CHALLENGE_TIMEOUT_REASON;
pub use stealth::{FingerprintProfile, FINGERPRINT_PROFILES};

use std::path::{Path, PathBuf};
#[cfg(feature = "browser")]
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
#[cfg(feature = "browser")]
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
#[cfg(feature = "browser")]
use tracing::warn;

use super::block_detect::BlockDetector;
use super::PageFetcher;
use crate::models::{FetchOutcome, FetchTier};
use crate::utils::expand_path;

/// Consecutive launch failures after which the tier is disabled.
#[cfg(feature = "browser")]
const MAX_LAUNCH_FAILURES: u32 = 2;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Find a Chrome/Chromium executable.
///
/// An explicit path wins; otherwise well-known install locations and then
/// `PATH` are searched.
pub fn detect_chrome(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        let path = expand_path(path);
        if path.exists() {
            return Some(path);
        }
        debug!("Configured chrome_path {} does not exist", path.display());
        return which::which(&path).ok();
    }

    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            debug!("Found Chrome at: {}", path);
            return Some(p.to_path_buf());
        }
    }

    CHROME_COMMANDS.iter().find_map(|cmd| which::which(cmd).ok())
}

/// Browser-based fetcher with stealth capabilities.
///
/// Every call launches its own browser with a throwaway profile, so nothing
/// leaks between URLs. The only state kept across calls is the availability
/// bookkeeping.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    pub(crate) config: BrowserEngineConfig,
    pub(crate) detector: BlockDetector,
    pub(crate) navigation_timeout: Duration,
    pub(crate) accept_language: String,
    pub(crate) proxy: Option<String>,
    available: AtomicBool,
    launch_failures: AtomicU32,
    executable: OnceLock<Option<PathBuf>>,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    pub fn new(config: BrowserEngineConfig) -> Self {
        let available = AtomicBool::new(config.enabled);
        Self {
            config,
            detector: BlockDetector::default(),
            navigation_timeout: Duration::from_secs(25),
            accept_language: "en-US,en;q=0.9".to_string(),
            proxy: None,
            available,
            launch_failures: AtomicU32::new(0),
            executable: OnceLock::new(),
        }
    }

    pub fn with_detector(mut self, detector: BlockDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_accept_language(mut self, accept_language: &str) -> Self {
        self.accept_language = accept_language.to_string();
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn config(&self) -> &BrowserEngineConfig {
        &self.config
    }

    fn mark_unavailable(&self, reason: &str) {
        if self.available.swap(false, Ordering::SeqCst) {
            warn!("Browser tier disabled: {}", reason);
        }
    }

    /// Record a launch result. Returns true when the tier was just disabled.
    pub(crate) fn record_launch(&self, ok: bool) -> bool {
        if ok {
            self.launch_failures.store(0, Ordering::SeqCst);
            return false;
        }
        let failures = self.launch_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= MAX_LAUNCH_FAILURES {
            self.mark_unavailable(&format!("{} consecutive launch failures", failures));
            return true;
        }
        false
    }

    /// Chrome is looked up once per fetcher.
    pub(crate) fn resolve_executable(&self) -> Option<PathBuf> {
        let found = self
            .executable
            .get_or_init(|| detect_chrome(self.config.chrome_path.as_deref()))
            .clone();
        if found.is_none() {
            self.mark_unavailable(
                "Chrome/Chromium not found (install chromium or set CHROME_PATH)",
            );
        }
        found
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn tier(&self) -> FetchTier {
        FetchTier::Dynamic
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst) && self.resolve_executable().is_some()
    }

    async fn fetch(&self, url: &str) -> FetchOutcome {
        if !self.is_available() {
            return FetchOutcome::Unavailable("browser tier disabled".to_string());
        }
        self.fetch_page(url).await
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    pub fn with_detector(self, _detector: BlockDetector) -> Self {
        self
    }

    pub fn with_navigation_timeout(self, _timeout: Duration) -> Self {
        self
    }

    pub fn with_accept_language(self, _accept_language: &str) -> Self {
        self
    }

    pub fn with_proxy(self, _proxy: Option<String>) -> Self {
        self
    }

    pub fn config(&self) -> &BrowserEngineConfig {
        &self.config
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn tier(&self) -> FetchTier {
        FetchTier::Dynamic
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn fetch(&self, _url: &str) -> FetchOutcome {
        debug!("Browser support not compiled in");
        FetchOutcome::Unavailable(
            "browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        )
    }
}
