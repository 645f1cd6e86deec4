//! Static tier: one GET over a shared reqwest client with browser-like
//! headers and bounded retries.

mod user_agent;

use user_agent::resolve_user_agent;
pub use user_agent::IMPERSONATE_USER_AGENTS;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::block_detect::BlockDetector;
use super::retry::{parse_retry_after, RetryPolicy};
use super::{validate_url, PageFetcher};
use crate::models::{FetchError, FetchOutcome, FetchTier, FetchedPage};

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DEFAULT_REFERER: &str = "https://www.google.com/";
const MAX_REDIRECTS: usize = 10;

/// Errors raised while constructing the reqwest client.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid value for header {0}")]
    Header(&'static str),
    #[error("invalid proxy URL: {0}")]
    Proxy(reqwest::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result of a single request before retry bookkeeping.
enum Attempt {
    Done(FetchOutcome),
    Retry {
        cause: FetchError,
        retry_after: Option<Duration>,
    },
}

/// Static HTTP fetcher.
///
/// The inner client keeps its connection pool and cookie jar for the life of
/// the fetcher, so a batch reuses TLS sessions and any cookies a site hands
/// out on the first request.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
    detector: BlockDetector,
    user_agent: String,
}

/// Builder for [`HttpFetcher`]. Obtain one with [`HttpFetcher::builder`].
pub struct HttpFetcherBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    detector: BlockDetector,
    user_agent: Option<String>,
    accept_language: Option<String>,
    referer: Option<String>,
    proxy: Option<String>,
}

impl HttpFetcherBuilder {
    /// Set the user agent string.
    /// - `"impersonate"` or not called: random real browser user agent
    /// - Any other string: used as-is
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }

    pub fn accept_language(mut self, value: &str) -> Self {
        self.accept_language = Some(value.to_string());
        self
    }

    /// Referer sent with every request. Empty string disables the header.
    pub fn referer(mut self, referer: &str) -> Self {
        self.referer = Some(referer.to_string());
        self
    }

    /// Route all requests through a proxy (`http://`, `https://`, `socks5://`).
    pub fn proxy(mut self, proxy: &str) -> Self {
        self.proxy = Some(proxy.to_string());
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn detector(mut self, detector: BlockDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn build(self) -> Result<HttpFetcher, ClientBuildError> {
        let user_agent = resolve_user_agent(self.user_agent.as_deref());
        let accept_language = self
            .accept_language
            .unwrap_or_else(|| DEFAULT_ACCEPT_LANGUAGE.to_string());
        let referer = self.referer.unwrap_or_else(|| DEFAULT_REFERER.to_string());

        let headers = navigation_headers(&accept_language, &referer)?;

        let mut builder = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .timeout(self.timeout)
            .connect_timeout(self.timeout.min(Duration::from_secs(10)))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .cookie_store(true)
            .gzip(true)
            .brotli(true);

        if let Some(ref proxy) = self.proxy {
            let proxy = Proxy::all(proxy).map_err(ClientBuildError::Proxy)?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        debug!(
            "Static fetcher ready (timeout {:?}, {} attempt(s), UA: {})",
            self.timeout, self.retry.max_attempts, user_agent
        );

        Ok(HttpFetcher {
            client,
            retry: self.retry,
            detector: self.detector,
            user_agent,
        })
    }
}

/// Headers a browser sends on a top-level navigation.
///
/// `Accept-Encoding` is left to reqwest so that it only advertises the
/// encodings it can decode.
fn navigation_headers(accept_language: &str, referer: &str) -> Result<HeaderMap, ClientBuildError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_str(accept_language)
            .map_err(|_| ClientBuildError::Header("Accept-Language"))?,
    );
    if !referer.is_empty() {
        headers.insert(
            header::REFERER,
            HeaderValue::from_str(referer).map_err(|_| ClientBuildError::Header("Referer"))?,
        );
    }
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static(if referer.is_empty() { "none" } else { "cross-site" }),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    Ok(headers)
}

impl HttpFetcher {
    /// Create a builder. `timeout` bounds each individual attempt.
    pub fn builder(timeout: Duration) -> HttpFetcherBuilder {
        HttpFetcherBuilder {
            timeout,
            retry: RetryPolicy::default(),
            detector: BlockDetector::default(),
            user_agent: None,
            accept_language: None,
            referer: None,
            proxy: None,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET `url`, retrying transient failures per the retry policy.
    pub async fn get(&self, url: &str) -> FetchOutcome {
        let parsed = match validate_url(url) {
            Ok(parsed) => parsed,
            Err(e) => return FetchOutcome::FatalError(e),
        };

        let mut attempt = 1;
        loop {
            match self.attempt(&parsed, url).await {
                Attempt::Done(outcome) => return outcome,
                Attempt::Retry { cause, retry_after } => {
                    if !self.retry.should_retry(attempt) {
                        warn!("Giving up on {} after {} attempt(s): {}", url, attempt, cause);
                        return FetchOutcome::TransientError(cause);
                    }
                    let delay = self.retry.delay_with_retry_after(attempt, retry_after);
                    debug!(
                        "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt, self.retry.max_attempts, url, cause, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, url: &Url, requested: &str) -> Attempt {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_send_error(e),
        };

        let status = response.status();
        let final_url = response.url().to_string();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let retryable = is_retryable_status(status);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() || retryable => {
                return Attempt::Retry {
                    cause: FetchError::Body(e.to_string()),
                    retry_after: None,
                };
            }
            Err(_) => String::new(),
        };

        // Challenge pages come back as 200, 403 and 503 alike. Retrying one
        // just hands the same interstitial back.
        if let Some(marker) = self.detector.find_marker(&body) {
            warn!("Block page detected for {} (HTTP {}, marker '{}')", requested, status, marker);
            return Attempt::Done(FetchOutcome::Blocked(marker.to_string()));
        }

        if retryable {
            return Attempt::Retry {
                cause: FetchError::HttpStatus(status.as_u16()),
                retry_after,
            };
        }

        if !status.is_success() {
            return Attempt::Done(FetchOutcome::TransientError(FetchError::HttpStatus(
                status.as_u16(),
            )));
        }

        Attempt::Done(FetchOutcome::Success(FetchedPage {
            requested_url: requested.to_string(),
            final_url,
            status: status.as_u16(),
            body,
            tier: FetchTier::Static,
        }))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn classify_send_error(e: reqwest::Error) -> Attempt {
    if e.is_builder() {
        return Attempt::Done(FetchOutcome::FatalError(FetchError::InvalidUrl(e.to_string())));
    }
    if e.is_redirect() {
        return Attempt::Done(FetchOutcome::TransientError(FetchError::Network(e.to_string())));
    }
    let cause = if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    };
    Attempt::Retry {
        cause,
        retry_after: None,
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn tier(&self) -> FetchTier {
        FetchTier::Static
    }

    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.get(url).await
    }
}
