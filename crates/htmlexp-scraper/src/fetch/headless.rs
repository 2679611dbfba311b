//! Headless Chromium fetch via the DevTools protocol.
//!
//! Every fetch launches its own browser with a throwaway profile directory.
//! The configured timeout covers teardown too: the session is closed
//! gracefully while time remains, otherwise it is dropped. `Drop` aborts the
//! CDP handler task, the browser kills its child process and the profile
//! directory is removed.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::direct::BROWSER_USER_AGENT;
use super::FetchedDocument;
use crate::error::ScraperError;
use crate::select;

/// Upper bound for closing the browser after the fetch itself has finished.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// How long to let client-side scripts run before reading the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStrategy {
    /// Always wait the full settle delay.
    Fixed,
    /// Re-read the page every `poll_interval` and stop as soon as the
    /// request's selector matches; the settle delay caps the wait.
    UntilMatch { poll_interval: Duration },
}

#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    /// Hard bound on launch, navigation, settle, extraction and teardown together.
    pub timeout: Duration,
    pub settle: Duration,
    pub strategy: SettleStrategy,
    /// Chromium binary; chromiumoxide's detection is used when `None`.
    pub chrome_executable: Option<PathBuf>,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            settle: Duration::from_secs(10),
            strategy: SettleStrategy::Fixed,
            chrome_executable: None,
        }
    }
}

pub struct HeadlessFetcher {
    options: HeadlessOptions,
}

impl HeadlessFetcher {
    #[must_use]
    pub fn new(options: HeadlessOptions) -> Self {
        Self { options }
    }

    /// Renders `url` in a fresh headless browser and returns the document's
    /// outer HTML.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Headless`]: launch, navigation or content read failed.
    /// - [`ScraperError::HeadlessTimeout`]: the whole operation exceeded
    ///   [`HeadlessOptions::timeout`].
    pub async fn fetch(
        &self,
        url: &str,
        ready_selector: Option<&str>,
    ) -> Result<FetchedDocument, ScraperError> {
        tracing::info!(url, "rendering page in headless browser");

        let deadline = Instant::now() + self.options.timeout;
        let mut session: Option<BrowserSession> = None;
        let outcome = bounded(url, self.options.timeout, async {
            let session = session.insert(BrowserSession::launch(url, &self.options).await?);
            session.render(url, &self.options, ready_selector).await
        })
        .await;

        if let Some(session) = session.take() {
            if !finish_before(deadline, session.close()).await {
                tracing::debug!(url, "no time left to close headless browser; dropping it");
            }
        }

        let html = outcome?;
        Ok(FetchedDocument {
            url: url.to_owned(),
            body: html.into_bytes(),
        })
    }
}

/// Runs `work`, turning an overrun of `limit` into [`ScraperError::HeadlessTimeout`].
async fn bounded<F, T>(url: &str, limit: Duration, work: F) -> Result<T, ScraperError>
where
    F: Future<Output = Result<T, ScraperError>>,
{
    tokio::time::timeout(limit, work).await.unwrap_or_else(|_| {
        Err(ScraperError::HeadlessTimeout {
            url: url.to_owned(),
            timeout_ms: limit.as_millis(),
        })
    })
}

/// Drives `work` until `deadline`; returns `false` if it had to be abandoned.
async fn finish_before<F: Future<Output = ()>>(deadline: Instant, work: F) -> bool {
    tokio::time::timeout_at(deadline, work).await.is_ok()
}

fn headless_error(url: &str, reason: String) -> ScraperError {
    ScraperError::Headless {
        url: url.to_owned(),
        reason,
    }
}

struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile_dir: TempDir,
}

impl BrowserSession {
    async fn launch(url: &str, options: &HeadlessOptions) -> Result<Self, ScraperError> {
        let profile_dir = TempDir::with_prefix("htmlexp-chromium-")
            .map_err(|e| headless_error(url, format!("failed to create profile directory: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir.path())
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-agent={BROWSER_USER_AGENT}"));
        if let Some(path) = &options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| headless_error(url, format!("invalid browser configuration: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| headless_error(url, format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self {
            browser,
            handler,
            _profile_dir: profile_dir,
        })
    }

    async fn render(
        &self,
        url: &str,
        options: &HeadlessOptions,
        ready_selector: Option<&str>,
    ) -> Result<String, ScraperError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| headless_error(url, format!("navigation failed: {e}")))?;

        let html = match (options.strategy, ready_selector) {
            (SettleStrategy::UntilMatch { poll_interval }, Some(selector)) => {
                wait_for_match(&page, url, selector, options.settle, poll_interval).await?
            }
            _ => {
                tokio::time::sleep(options.settle).await;
                page_content(&page, url).await?
            }
        };

        if let Err(e) = page.close().await {
            tracing::debug!(url, error = %e, "failed to close headless page");
        }

        Ok(html)
    }

    async fn close(mut self) {
        match tokio::time::timeout(CLOSE_GRACE, self.browser.close()).await {
            Ok(Ok(_)) => {
                if tokio::time::timeout(CLOSE_GRACE, self.browser.wait())
                    .await
                    .is_err()
                {
                    tracing::debug!("headless browser did not exit in time; killing it");
                }
            }
            Ok(Err(e)) => tracing::debug!(error = %e, "failed to close headless browser"),
            Err(_) => tracing::debug!("timed out closing headless browser"),
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

async fn page_content(page: &Page, url: &str) -> Result<String, ScraperError> {
    page.content()
        .await
        .map_err(|e| headless_error(url, format!("failed to read rendered HTML: {e}")))
}

async fn wait_for_match(
    page: &Page,
    url: &str,
    selector: &str,
    settle: Duration,
    poll_interval: Duration,
) -> Result<String, ScraperError> {
    let deadline = Instant::now() + settle;
    loop {
        let html = page_content(page, url).await?;
        if select::has_match(html.as_bytes(), selector) {
            tracing::debug!(url, selector, "selector matched before settle delay elapsed");
            return Ok(html);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(html);
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_turns_a_hang_into_a_timeout_error() {
        let started = std::time::Instant::now();
        let result: Result<(), ScraperError> = bounded(
            "https://hangs.example",
            Duration::from_millis(50),
            std::future::pending(),
        )
        .await;

        assert!(
            matches!(result, Err(ScraperError::HeadlessTimeout { timeout_ms: 50, .. })),
            "expected HeadlessTimeout, got: {result:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn bounded_passes_through_completed_work() {
        let result = bounded("https://fast.example", Duration::from_secs(1), async {
            Ok::<_, ScraperError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn missing_browser_binary_is_an_ordinary_error() {
        let fetcher = HeadlessFetcher::new(HeadlessOptions {
            chrome_executable: Some(PathBuf::from("/nonexistent/htmlexp/chromium")),
            ..HeadlessOptions::default()
        });

        let err = fetcher
            .fetch("https://example.com", None)
            .await
            .unwrap_err();

        assert!(
            matches!(err, ScraperError::Headless { .. } | ScraperError::HeadlessTimeout { .. }),
            "expected a headless fetch error, got: {err:?}"
        );
        assert_eq!(err.kind(), crate::error::ErrorKind::Fetch);
    }

    #[tokio::test]
    async fn teardown_is_abandoned_at_the_deadline() {
        let started = Instant::now();
        let finished = finish_before(
            started + Duration::from_millis(50),
            std::future::pending::<()>(),
        )
        .await;

        assert!(!finished);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn teardown_with_time_left_completes() {
        let finished = finish_before(Instant::now() + Duration::from_secs(1), async {}).await;
        assert!(finished);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_browser_launch_returns_within_the_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let fake_chrome = dir.path().join("chrome");
        std::fs::write(&fake_chrome, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&fake_chrome, std::fs::Permissions::from_mode(0o755)).unwrap();

        let fetcher = HeadlessFetcher::new(HeadlessOptions {
            timeout: Duration::from_secs(1),
            settle: Duration::from_millis(100),
            chrome_executable: Some(fake_chrome),
            ..HeadlessOptions::default()
        });

        let started = std::time::Instant::now();
        let err = fetcher
            .fetch("https://example.com", None)
            .await
            .unwrap_err();

        assert!(
            matches!(err, ScraperError::HeadlessTimeout { timeout_ms: 1000, .. } | ScraperError::Headless { .. }),
            "expected a headless fetch error, got: {err:?}"
        );
        assert!(
            started.elapsed() < Duration::from_secs(3),
            "fetch took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn default_options_match_documented_bounds() {
        let options = HeadlessOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(15));
        assert_eq!(options.settle, Duration::from_secs(10));
        assert_eq!(options.strategy, SettleStrategy::Fixed);
        assert!(options.settle < options.timeout);
    }
}
