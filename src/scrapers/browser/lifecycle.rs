//! Challenge polling and process teardown for the browser tier.
//!
//! Both loops only see the browser through a content reader or the
//! [`BrowserProcess`] trait, so they carry their own time limits and run
//! without Chrome in tests.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::models::FetchError;
use crate::scrapers::block_detect::BlockDetector;

/// Reason reported when an interstitial never clears.
pub const CHALLENGE_TIMEOUT_REASON: &str = "challenge-timeout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageState {
    Clear(String),
    Blocked(String),
}

/// Re-read the page until no block marker is present.
///
/// A zero `timeout` checks once and reports the marker itself. Otherwise the
/// page is polled every `poll` until it clears or the deadline passes.
pub(crate) async fn wait_out_challenge<F, Fut>(
    mut read_content: F,
    detector: &BlockDetector,
    timeout: Duration,
    poll: Duration,
    url: &str,
) -> Result<PageState, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        let content = read_content().await?;

        let Some(marker) = detector.find_marker(&content) else {
            return Ok(PageState::Clear(content));
        };

        if timeout.is_zero() {
            warn!("Block page in browser for {} (marker '{}')", url, marker);
            return Ok(PageState::Blocked(marker.to_string()));
        }
        if Instant::now() >= deadline {
            warn!(
                "Challenge did not clear within {:?} for {} (marker '{}')",
                timeout, url, marker
            );
            return Ok(PageState::Blocked(CHALLENGE_TIMEOUT_REASON.to_string()));
        }

        debug!("Challenge marker '{}' still present, waiting", marker);
        tokio::time::sleep(poll).await;
    }
}

/// A launched browser process that can be asked to exit.
#[async_trait]
pub(crate) trait BrowserProcess: Send {
    async fn request_close(&mut self) -> Result<(), String>;
    async fn wait_exit(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shutdown {
    Exited,
    CloseFailed,
    CloseTimedOut,
    ExitTimedOut,
}

/// Ask the process to exit and wait for it, each step bounded by `limit`.
///
/// Anything but [`Shutdown::Exited`] means the process may still be running
/// and the caller has to kill it. A failed close request skips the wait
/// entirely: with the control channel gone the process would never exit.
pub(crate) async fn shut_down<P>(process: &mut P, limit: Duration) -> Shutdown
where
    P: BrowserProcess + ?Sized,
{
    match tokio::time::timeout(limit, process.request_close()).await {
        Err(_) => Shutdown::CloseTimedOut,
        Ok(Err(e)) => {
            debug!("Browser close failed: {}", e);
            Shutdown::CloseFailed
        }
        Ok(Ok(())) => match tokio::time::timeout(limit, process.wait_exit()).await {
            Ok(()) => Shutdown::Exited,
            Err(_) => Shutdown::ExitTimedOut,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    const POLL: Duration = Duration::from_millis(5);

    /// Serves bodies in order, repeating the last one.
    struct Script {
        bodies: VecDeque<&'static str>,
        reads: usize,
    }

    impl Script {
        fn new(bodies: &[&'static str]) -> Self {
            Self {
                bodies: bodies.iter().copied().collect(),
                reads: 0,
            }
        }

        fn next(&mut self) -> String {
            self.reads += 1;
            if self.bodies.len() > 1 {
                self.bodies.pop_front().unwrap_or_default().to_string()
            } else {
                self.bodies.front().copied().unwrap_or_default().to_string()
            }
        }
    }

    async fn run(script: &mut Script, timeout: Duration) -> Result<PageState, FetchError> {
        wait_out_challenge(
            || {
                let body = script.next();
                async move { Ok(body) }
            },
            &BlockDetector::default(),
            timeout,
            POLL,
            "https://example.com",
        )
        .await
    }

    #[tokio::test]
    async fn test_challenge_clears_after_polls() {
        let mut script = Script::new(&[
            "<title>Just a moment...</title>",
            "<title>Just a moment...</title>",
            "<h2>Real content</h2>",
        ]);

        let state = run(&mut script, Duration::from_secs(5)).await.unwrap();

        assert_eq!(state, PageState::Clear("<h2>Real content</h2>".to_string()));
        assert_eq!(script.reads, 3);
    }

    #[tokio::test]
    async fn test_challenge_times_out() {
        let mut script = Script::new(&["Checking your browser before accessing"]);

        let state = run(&mut script, Duration::from_millis(30)).await.unwrap();

        assert_eq!(state, PageState::Blocked(CHALLENGE_TIMEOUT_REASON.to_string()));
        assert!(script.reads > 1);
    }

    #[tokio::test]
    async fn test_zero_timeout_reports_marker() {
        let mut script = Script::new(&["<title>Just a moment...</title>", "<h2>Later</h2>"]);

        let state = run(&mut script, Duration::ZERO).await.unwrap();

        assert_eq!(state, PageState::Blocked("just a moment".to_string()));
        assert_eq!(script.reads, 1);
    }

    #[tokio::test]
    async fn test_clean_page_returns_at_once() {
        let mut script = Script::new(&["<h2>Pricing</h2>"]);

        let state = run(&mut script, Duration::ZERO).await.unwrap();

        assert_eq!(state, PageState::Clear("<h2>Pricing</h2>".to_string()));
    }

    #[tokio::test]
    async fn test_read_error_propagates() {
        let result = wait_out_challenge(
            || async { Err(FetchError::Browser("tab crashed".to_string())) },
            &BlockDetector::default(),
            Duration::from_secs(1),
            POLL,
            "https://example.com",
        )
        .await;

        assert!(matches!(result, Err(FetchError::Browser(_))));
    }

    struct FakeProcess {
        close: Result<(), String>,
        close_hangs: bool,
        exit_hangs: bool,
        waited: bool,
    }

    impl FakeProcess {
        fn new() -> Self {
            Self {
                close: Ok(()),
                close_hangs: false,
                exit_hangs: false,
                waited: false,
            }
        }
    }

    #[async_trait]
    impl BrowserProcess for FakeProcess {
        async fn request_close(&mut self) -> Result<(), String> {
            if self.close_hangs {
                std::future::pending::<()>().await;
            }
            self.close.clone()
        }

        async fn wait_exit(&mut self) {
            self.waited = true;
            if self.exit_hangs {
                std::future::pending::<()>().await;
            }
        }
    }

    const LIMIT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_clean_exit() {
        let mut process = FakeProcess::new();
        assert_eq!(shut_down(&mut process, LIMIT).await, Shutdown::Exited);
        assert!(process.waited);
    }

    #[tokio::test]
    async fn test_failed_close_skips_wait() {
        let mut process = FakeProcess {
            close: Err("channel closed".to_string()),
            exit_hangs: true,
            ..FakeProcess::new()
        };

        assert_eq!(shut_down(&mut process, LIMIT).await, Shutdown::CloseFailed);
        assert!(!process.waited);
    }

    #[tokio::test]
    async fn test_hanging_exit_is_bounded() {
        let mut process = FakeProcess {
            exit_hangs: true,
            ..FakeProcess::new()
        };
        assert_eq!(shut_down(&mut process, LIMIT).await, Shutdown::ExitTimedOut);
    }

    #[tokio::test]
    async fn test_hanging_close_is_bounded() {
        let mut process = FakeProcess {
            close_hangs: true,
            ..FakeProcess::new()
        };
        assert_eq!(shut_down(&mut process, LIMIT).await, Shutdown::CloseTimedOut);
        assert!(!process.waited);
    }
}
