//! Fetch → select → normalize, with no branching back and no retries.

use std::time::Duration;

use htmlexp_core::{AppConfig, ScrapeRequest};

use crate::error::ScraperError;
use crate::fetch::{FetchStrategy, Fetcher, HeadlessOptions, SettleStrategy};
use crate::normalize::normalize_number;
use crate::select;

/// Poll interval used when the headless strategy waits for the selector.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default)]
pub struct ScraperOptions {
    /// Direct-mode request timeout; `None` means no timeout.
    pub request_timeout: Option<Duration>,
    pub headless: HeadlessOptions,
}

impl ScraperOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let strategy = if config.headless_wait_for_selector {
            SettleStrategy::UntilMatch {
                poll_interval: SELECTOR_POLL_INTERVAL,
            }
        } else {
            SettleStrategy::Fixed
        };

        Self {
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
            headless: HeadlessOptions {
                timeout: Duration::from_secs(config.headless_timeout_secs),
                settle: Duration::from_millis(config.headless_settle_ms),
                strategy,
                chrome_executable: config.chrome_path.clone(),
            },
        }
    }
}

/// Turns a [`ScrapeRequest`] into a number.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of concurrent callers. Each call is independent: nothing is cached and
/// the first failing stage ends the call.
pub struct Scraper {
    fetcher: Fetcher,
}

impl Scraper {
    /// # Errors
    ///
    /// Returns [`ScraperError::Client`] if the HTTP client cannot be built.
    pub fn new(options: ScraperOptions) -> Result<Self, ScraperError> {
        Ok(Self {
            fetcher: Fetcher::new(options.request_timeout, options.headless)?,
        })
    }

    /// Fetches the page, evaluates the selector and parses the matched text.
    ///
    /// Dropping the returned future cancels in-flight work and releases the
    /// HTTP connection or headless browser.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; see [`ScraperError::kind`].
    #[tracing::instrument(skip_all, fields(url = %request.address, headless = request.headless))]
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<f64, ScraperError> {
        tracing::debug!("requesting URL");
        let strategy = FetchStrategy::for_request(request.headless);
        let document = self
            .fetcher
            .fetch(&request.address, strategy, Some(&request.selector))
            .await?;
        tracing::debug!(
            served_from = %document.url,
            bytes = document.body.len(),
            "page fetched"
        );

        tracing::debug!(selector = %request.selector, "scraping value with XPath selector");
        let matched = select::query(
            &document.body,
            &request.selector,
            request.attribute.as_deref(),
        )?;

        let value = normalize_number(
            &matched.text,
            &request.thousands_separator,
            &request.decimal_point_separator,
        )?;

        tracing::debug!(value, "scraped value");
        Ok(value)
    }
}

/// One-off scrape with default options.
///
/// Long-running callers should build a [`Scraper`] once and reuse it.
///
/// # Errors
///
/// See [`Scraper::scrape`].
pub async fn scrape(request: &ScrapeRequest) -> Result<f64, ScraperError> {
    Scraper::new(ScraperOptions::default())?
        .scrape(request)
        .await
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn app_config() -> AppConfig {
        AppConfig {
            targets_path: PathBuf::from("targets.yaml"),
            log_level: "info".to_string(),
            request_timeout_secs: Some(20),
            headless_timeout_secs: 30,
            headless_settle_ms: 1500,
            headless_wait_for_selector: false,
            chrome_path: Some(PathBuf::from("/opt/chromium/chrome")),
            max_concurrent_targets: 2,
        }
    }

    #[test]
    fn options_from_app_config() {
        let options = ScraperOptions::from_app_config(&app_config());
        assert_eq!(options.request_timeout, Some(Duration::from_secs(20)));
        assert_eq!(options.headless.timeout, Duration::from_secs(30));
        assert_eq!(options.headless.settle, Duration::from_millis(1500));
        assert_eq!(options.headless.strategy, SettleStrategy::Fixed);
        assert_eq!(
            options.headless.chrome_executable,
            Some(PathBuf::from("/opt/chromium/chrome"))
        );
    }

    #[test]
    fn wait_for_selector_switches_to_polling() {
        let mut config = app_config();
        config.headless_wait_for_selector = true;
        let options = ScraperOptions::from_app_config(&config);
        assert_eq!(
            options.headless.strategy,
            SettleStrategy::UntilMatch {
                poll_interval: SELECTOR_POLL_INTERVAL
            }
        );
    }

    #[test]
    fn strategy_follows_headless_flag() {
        assert_eq!(FetchStrategy::for_request(true), FetchStrategy::Headless);
        assert_eq!(FetchStrategy::for_request(false), FetchStrategy::Direct);
    }

    #[test]
    fn scraper_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Scraper>();
    }
}
