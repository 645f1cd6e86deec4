//! Page fetch for the browser tier: launch, navigate, wait out challenges.

use std::path::Path;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, NavigateParams,
};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::lifecycle::{shut_down, wait_out_challenge, BrowserProcess, PageState, Shutdown};
use super::stealth::{languages_from_accept, pick_profile, stealth_scripts, FingerprintProfile, STEALTH_ARGS};
use super::BrowserFetcher;
use crate::models::{FetchError, FetchOutcome, FetchTier, FetchedPage};
use crate::scrapers::validate_url;

const BODY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bound on each teardown step before the process is killed.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
impl BrowserProcess for Browser {
    async fn request_close(&mut self) -> Result<(), String> {
        self.close().await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn wait_exit(&mut self) {
        let _ = self.wait().await;
    }
}

/// One launched browser process and its CDP event loop.
///
/// Dropping the session aborts the handler task and drops the `Browser`,
/// which kills the child process, so a panic or a cancelled future never
/// leaves Chrome running. The profile directory is removed last.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile_dir: TempDir,
}

impl BrowserSession {
    async fn launch(
        fetcher: &BrowserFetcher,
        executable: &Path,
        profile: &FingerprintProfile,
    ) -> Result<Self, FetchError> {
        let profile_dir = tempfile::Builder::new()
            .prefix("headscout-chrome-")
            .tempdir()
            .map_err(|e| FetchError::Browser(format!("failed to create profile dir: {}", e)))?;

        info!(
            "Launching browser (headless={}, {})",
            fetcher.config.headless, profile.ua_platform
        );

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .user_data_dir(profile_dir.path())
            .request_timeout(fetcher.navigation_timeout);

        // Set headless mode (with_head means NOT headless, confusingly)
        if !fetcher.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = fetcher.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        for arg in STEALTH_ARGS {
            builder = builder.arg(*arg);
        }
        builder = builder.arg(format!(
            "--lang={}",
            languages_from_accept(&fetcher.accept_language)[0]
        ));

        for arg in &fetcher.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| FetchError::Browser(format!("invalid browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            _profile_dir: profile_dir,
        })
    }

    async fn close(mut self) {
        let state = shut_down(&mut self.browser, SHUTDOWN_TIMEOUT).await;
        if state != Shutdown::Exited {
            // Dropping the session drops the Browser, which kills the child.
            warn!("Browser did not exit cleanly ({:?}), killing it", state);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

impl BrowserFetcher {
    /// Launch a browser for `url`, fetch it, and always tear the browser down.
    pub(crate) async fn fetch_page(&self, url: &str) -> FetchOutcome {
        if let Err(e) = validate_url(url) {
            return FetchOutcome::FatalError(e);
        }

        let Some(executable) = self.resolve_executable() else {
            return FetchOutcome::Unavailable("Chrome/Chromium not found".to_string());
        };

        let profile = pick_profile();
        let session = match BrowserSession::launch(self, &executable, profile).await {
            Ok(session) => {
                self.record_launch(true);
                session
            }
            Err(e) => {
                warn!("{}", e);
                if self.record_launch(false) {
                    return FetchOutcome::Unavailable(e.to_string());
                }
                return FetchOutcome::TransientError(e);
            }
        };

        let outcome = match self.open_and_load(&session.browser, url, profile).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Browser fetch failed for {}: {}", url, e);
                FetchOutcome::TransientError(e)
            }
        };

        session.close().await;
        outcome
    }

    async fn open_and_load(
        &self,
        browser: &Browser,
        url: &str,
        profile: &FingerprintProfile,
    ) -> Result<FetchOutcome, FetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(format!("failed to open tab: {}", e)))?;

        // Use inner function to ensure page is always closed
        let result = self.load(&page, url, profile).await;
        let _ = page.close().await;
        result
    }

    async fn load(
        &self,
        page: &Page,
        url: &str,
        profile: &FingerprintProfile,
    ) -> Result<FetchOutcome, FetchError> {
        self.prepare(page, profile).await?;
        self.navigate_to_url(page, url).await?;
        self.wait_for_body(page).await?;

        let settle = self.config.settle();
        if !settle.is_zero() {
            debug!("Settling for {:?}", settle);
            tokio::time::sleep(settle).await;
        }

        let body = match self.wait_out_challenge(page, url).await? {
            PageState::Clear(body) => body,
            PageState::Blocked(reason) => return Ok(FetchOutcome::Blocked(reason)),
        };

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        Ok(FetchOutcome::Success(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            status: 200,
            body,
            tier: FetchTier::Dynamic,
        }))
    }

    /// User-agent override and new-document stealth scripts, before any navigation.
    async fn prepare(&self, page: &Page, profile: &FingerprintProfile) -> Result<(), FetchError> {
        let ua_override = SetUserAgentOverrideParams::builder()
            .user_agent(profile.user_agent)
            .accept_language(self.accept_language.clone())
            .platform(profile.platform)
            .build()
            .map_err(FetchError::Browser)?;
        page.execute(ua_override)
            .await
            .map_err(|e| FetchError::Browser(format!("user agent override failed: {}", e)))?;

        debug!("Applying stealth scripts");
        let languages = languages_from_accept(&self.accept_language);
        for script in stealth_scripts(profile, &languages) {
            let params = AddScriptToEvaluateOnNewDocumentParams::new(script);
            if let Err(e) = page.evaluate_on_new_document(params).await {
                debug!("Stealth script injection skipped: {}", e);
            }
        }
        Ok(())
    }

    /// Navigate to a URL with timeout handling.
    async fn navigate_to_url(&self, page: &Page, url: &str) -> Result<(), FetchError> {
        info!("Navigating to {} (browser)", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(FetchError::InvalidUrl)?;

        tokio::time::timeout(self.navigation_timeout, page.execute(nav_params))
            .await
            .map_err(|_| {
                FetchError::Navigation(format!(
                    "timed out after {}s",
                    self.navigation_timeout.as_secs()
                ))
            })?
            .map_err(|e| FetchError::Navigation(e.to_string()))?;

        Ok(())
    }

    async fn wait_for_body(&self, page: &Page) -> Result<(), FetchError> {
        let deadline = Instant::now() + self.config.ready_timeout();
        loop {
            if page.find_element("body").await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(FetchError::Navigation(format!(
                    "document not ready after {}s",
                    self.config.ready_timeout_secs
                )));
            }
            tokio::time::sleep(BODY_POLL_INTERVAL).await;
        }
    }

    /// Poll the rendered page until no block marker is present.
    async fn wait_out_challenge(&self, page: &Page, url: &str) -> Result<PageState, FetchError> {
        wait_out_challenge(
            move || async move {
                page.content()
                    .await
                    .map_err(|e| FetchError::Browser(format!("failed to read page: {}", e)))
            },
            &self.detector,
            self.config.challenge_timeout(),
            self.config.challenge_poll(),
            url,
        )
        .await
    }
}
