//! Configuration for headscout: TOML file, then environment overrides.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::extract::{HeadingExtractor, DEFAULT_NOISE_KEYWORDS};
use crate::pipeline::{BatchCoordinator, Pacing, RetrievalOrchestrator};
use crate::prompt::{PromptAssembler, PromptError};
use crate::scrapers::{
    BlockDetector, BrowserEngineConfig, BrowserFetcher, ClientBuildError, HttpFetcher,
    PageFetcher, RetryPolicy, DEFAULT_BLOCK_MARKERS,
};
use crate::utils::expand_path;

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "headscout.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "HEADSCOUT_CONFIG";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Static fetch settings (the `[fetch]` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts per URL, including the first.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Referer header. Empty string sends none.
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Fixed user agent. Unset or "impersonate" picks a real browser UA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Proxy for both tiers (e.g., "socks5://127.0.0.1:9050").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            backoff_factor: default_backoff_factor(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            referer: default_referer(),
            accept_language: default_accept_language(),
            user_agent: None,
            proxy: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    25
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_referer() -> String {
    "https://www.google.com/".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            backoff_factor: self.backoff_factor,
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

/// Delay between consecutive URLs (the `[pacing]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    2500
}

/// Marker and keyword lists (the `[filters]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Substrings that mark a response as a challenge or block page.
    #[serde(default = "default_block_markers")]
    pub block_markers: Vec<String>,
    /// Substrings that mark a heading as page chrome.
    #[serde(default = "default_noise_keywords")]
    pub noise_keywords: Vec<String>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            block_markers: default_block_markers(),
            noise_keywords: default_noise_keywords(),
        }
    }
}

fn default_block_markers() -> Vec<String> {
    DEFAULT_BLOCK_MARKERS.iter().map(|s| s.to_string()).collect()
}

fn default_noise_keywords() -> Vec<String> {
    DEFAULT_NOISE_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

/// Custom prompt templates (the `[prompt]` table).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Template using `{competitors}` and `{topic}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<PathBuf>,
    /// Template used when nothing was extracted. Supports `{topic}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_template_file: Option<PathBuf>,
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Skip environment overrides.
    pub ignore_env: bool,
}

impl Settings {
    /// Find the config file to load.
    ///
    /// Order: explicit path, `$HEADSCOUT_CONFIG`, `./headscout.toml`,
    /// `<config dir>/headscout/config.toml`. Explicit and environment paths
    /// are returned even when missing so the caller reports them.
    pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        Self::discover_with(explicit, |key| std::env::var(key).ok())
    }

    fn discover_with<F>(explicit: Option<&Path>, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Some(expand_path(path));
        }
        if let Some(path) = lookup(CONFIG_ENV_VAR).filter(|p| !p.trim().is_empty()) {
            return Some(expand_path(Path::new(path.trim())));
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("headscout").join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Load, apply environment overrides, and validate.
    pub fn load(options: &LoadOptions) -> Result<Self, ConfigError> {
        let settings = match Self::discover(options.config_path.as_deref()) {
            Some(path) => Self::load_from_path(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        let settings = if options.ignore_env {
            settings
        } else {
            settings.with_env_overrides()
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a TOML file without overrides or validation.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded config from {}", path.display());
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply `HEADSCOUT_*` and `CHROME_PATH` environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(proxy) = non_empty("HEADSCOUT_PROXY") {
            self.fetch.proxy = Some(proxy);
        }
        if let Some(ua) = non_empty("HEADSCOUT_USER_AGENT") {
            self.fetch.user_agent = Some(ua);
        }
        self.browser = self.browser.with_overrides_from(&lookup);
        self
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.retries == 0 {
            return Err(ConfigError::Invalid("fetch.retries must be at least 1".into()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch.timeout_secs must be at least 1".into()));
        }
        if !(self.fetch.backoff_factor.is_finite() && self.fetch.backoff_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fetch.backoff_factor must be positive (got {})",
                self.fetch.backoff_factor
            )));
        }
        if self.fetch.initial_backoff_ms > self.fetch.max_backoff_ms {
            return Err(ConfigError::Invalid(format!(
                "fetch.initial_backoff_ms ({}) exceeds fetch.max_backoff_ms ({})",
                self.fetch.initial_backoff_ms, self.fetch.max_backoff_ms
            )));
        }
        if self.pacing.min_delay_ms > self.pacing.max_delay_ms {
            return Err(ConfigError::Invalid(format!(
                "pacing.min_delay_ms ({}) exceeds pacing.max_delay_ms ({})",
                self.pacing.min_delay_ms, self.pacing.max_delay_ms
            )));
        }
        if self.browser.challenge_timeout_secs > 0 && self.browser.challenge_poll_ms == 0 {
            return Err(ConfigError::Invalid(
                "browser.challenge_poll_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::from_millis(self.pacing.min_delay_ms, self.pacing.max_delay_ms)
    }

    pub fn block_detector(&self) -> BlockDetector {
        BlockDetector::new(&self.filters.block_markers)
    }

    pub fn heading_extractor(&self) -> HeadingExtractor {
        HeadingExtractor::new(&self.filters.noise_keywords)
    }

    pub fn http_fetcher(&self) -> Result<HttpFetcher, ClientBuildError> {
        let mut builder = HttpFetcher::builder(self.fetch.timeout())
            .retry(self.fetch.retry_policy())
            .detector(self.block_detector())
            .accept_language(&self.fetch.accept_language)
            .referer(&self.fetch.referer);
        if let Some(ref ua) = self.fetch.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(ref proxy) = self.fetch.proxy {
            builder = builder.proxy(proxy);
        }
        builder.build()
    }

    /// The browser tier, or `None` when it is disabled.
    pub fn browser_fetcher(&self) -> Option<BrowserFetcher> {
        if !self.browser.enabled {
            return None;
        }
        Some(
            BrowserFetcher::new(self.browser.clone())
                .with_detector(self.block_detector())
                .with_navigation_timeout(self.fetch.timeout())
                .with_accept_language(&self.fetch.accept_language)
                .with_proxy(self.fetch.proxy.clone()),
        )
    }

    /// Wire both tiers into an orchestrator. `use_browser = false` leaves the
    /// browser tier out regardless of configuration.
    pub fn orchestrator(&self, use_browser: bool) -> Result<RetrievalOrchestrator, ClientBuildError> {
        let static_fetcher: Arc<dyn PageFetcher> = Arc::new(self.http_fetcher()?);
        let dynamic_fetcher = if use_browser {
            self.browser_fetcher()
                .map(|fetcher| Arc::new(fetcher) as Arc<dyn PageFetcher>)
        } else {
            None
        };
        Ok(RetrievalOrchestrator::new(static_fetcher, dynamic_fetcher)
            .with_detector(self.block_detector())
            .with_extractor(self.heading_extractor()))
    }

    pub fn batch_coordinator(&self, use_browser: bool) -> Result<BatchCoordinator, ClientBuildError> {
        Ok(BatchCoordinator::new(self.orchestrator(use_browser)?).with_pacing(self.pacing()))
    }

    pub fn prompt_assembler(&self) -> Result<PromptAssembler, PromptError> {
        PromptAssembler::from_files(
            self.prompt.template_file.as_deref(),
            self.prompt.default_template_file.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.fetch.retries, 3);
        assert_eq!(settings.fetch.timeout(), Duration::from_secs(25));
        assert_eq!(settings.pacing(), Pacing::from_millis(1000, 2500));
        assert!(settings.browser.enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [fetch]
            retries = 5

            [filters]
            noise_keywords = ["sponsored"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.fetch.retries, 5);
        assert_eq!(settings.fetch.backoff_factor, 2.0);
        assert_eq!(settings.filters.noise_keywords, vec!["sponsored"]);
        assert_eq!(settings.filters.block_markers.len(), DEFAULT_BLOCK_MARKERS.len());
    }

    #[test]
    fn test_validation_errors() {
        let mut settings = Settings::default();
        settings.fetch.retries = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));

        let mut settings = Settings::default();
        settings.pacing.min_delay_ms = 3000;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));

        let mut settings = Settings::default();
        settings.fetch.backoff_factor = 0.0;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::default().with_overrides_from(|key| match key {
            "HEADSCOUT_PROXY" => Some("socks5://127.0.0.1:9050".into()),
            "HEADSCOUT_USER_AGENT" => Some("  ".into()),
            "HEADSCOUT_BROWSER" => Some("false".into()),
            _ => None,
        });
        assert_eq!(settings.fetch.proxy.as_deref(), Some("socks5://127.0.0.1:9050"));
        assert_eq!(settings.fetch.user_agent, None);
        assert!(!settings.browser.enabled);
        assert!(settings.browser_fetcher().is_none());
    }

    #[test]
    fn test_discover_prefers_explicit_then_env() {
        let explicit = Path::new("/tmp/explicit.toml");
        assert_eq!(
            Settings::discover_with(Some(explicit), |_| Some("/tmp/env.toml".into())),
            Some(PathBuf::from("/tmp/explicit.toml"))
        );
        assert_eq!(
            Settings::discover_with(None, |key| (key == CONFIG_ENV_VAR).then(|| "/tmp/env.toml".into())),
            Some(PathBuf::from("/tmp/env.toml"))
        );
        let _ = Settings::discover_with(None, no_env);
    }

    #[test]
    fn test_retry_policy_from_fetch_config() {
        let policy = FetchConfig::default().retry_policy();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("[fetch]"));
        assert!(text.contains("[browser]"));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
