//! Page retrieval: a plain HTTP GET or a headless Chromium render.

mod direct;
mod headless;

pub use direct::{browser_headers, DirectFetcher, BROWSER_USER_AGENT, SESSION_COOKIE};
pub use headless::{HeadlessFetcher, HeadlessOptions, SettleStrategy};

use std::time::Duration;

use crate::error::ScraperError;

/// Exactly one strategy serves a request; there is no fallback between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Direct,
    Headless,
}

impl FetchStrategy {
    #[must_use]
    pub fn for_request(headless: bool) -> Self {
        if headless {
            FetchStrategy::Headless
        } else {
            FetchStrategy::Direct
        }
    }
}

/// Raw page content for a single scrape call.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Address the body was served from, after any redirects.
    pub url: String,
    pub body: Vec<u8>,
}

/// Dispatches a fetch to the strategy chosen for the request.
pub struct Fetcher {
    direct: DirectFetcher,
    headless: HeadlessFetcher,
}

impl Fetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Client`] if the HTTP client cannot be built.
    pub fn new(
        request_timeout: Option<Duration>,
        headless: HeadlessOptions,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            direct: DirectFetcher::new(request_timeout)?,
            headless: HeadlessFetcher::new(headless),
        })
    }

    /// Fetches `address` with `strategy`.
    ///
    /// `ready_selector` is only consulted by the headless strategy when it is
    /// configured to settle as soon as the selector matches.
    ///
    /// # Errors
    ///
    /// Propagates the fetch-class error of the selected strategy.
    pub async fn fetch(
        &self,
        address: &str,
        strategy: FetchStrategy,
        ready_selector: Option<&str>,
    ) -> Result<FetchedDocument, ScraperError> {
        match strategy {
            FetchStrategy::Direct => self.direct.fetch(address).await,
            FetchStrategy::Headless => self.headless.fetch(address, ready_selector).await,
        }
    }
}
