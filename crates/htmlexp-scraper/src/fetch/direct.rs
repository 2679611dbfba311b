use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use super::FetchedDocument;
use crate::error::ScraperError;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

pub const SESSION_COOKIE: &str = "ASP.NET_SessionId=0unkgypizygltszqicuwwpln";

/// The fixed header set sent with every direct request.
///
/// Some targets gate on browser fingerprinting, so this mirrors a desktop
/// Chrome navigation from a search result.
#[must_use]
pub fn browser_headers() -> HeaderMap {
    let fixed: [(HeaderName, &'static str); 13] = [
        (header::USER_AGENT, BROWSER_USER_AGENT),
        (
            header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
        (header::ACCEPT_ENCODING, "gzip, deflate, br"),
        (header::ACCEPT_LANGUAGE, "en-GB,en;q=0.9"),
        (header::CACHE_CONTROL, "max-age=0"),
        (HeaderName::from_static("sec-fetch-dest"), "document"),
        (HeaderName::from_static("sec-fetch-mode"), "navigate"),
        (HeaderName::from_static("sec-fetch-site"), "cross-site"),
        (HeaderName::from_static("sec-fetch-user"), "?1"),
        (HeaderName::from_static("sec-gpc"), "1"),
        (header::UPGRADE_INSECURE_REQUESTS, "1"),
        (header::REFERER, "https://www.google.com/"),
        (header::COOKIE, SESSION_COOKIE),
    ];

    fixed
        .into_iter()
        .map(|(name, value)| (name, HeaderValue::from_static(value)))
        .collect()
}

/// Plain HTTP GET with browser-mimicking headers.
///
/// One request per call: no retries, default redirect policy, and no timeout
/// unless one is configured.
pub struct DirectFetcher {
    client: Client,
}

impl DirectFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Client`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout: Option<Duration>) -> Result<Self, ScraperError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ScraperError::Client)?;
        Ok(Self { client })
    }

    /// Issues a single GET for `url` and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` cannot be parsed.
    /// - [`ScraperError::Request`]: DNS, connection, TLS or body read failure.
    /// - [`ScraperError::UnexpectedStatus`]: any status outside 200–299.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, ScraperError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        tracing::info!(url, "scraping page");

        let request_error = |source| ScraperError::Request {
            url: url.to_owned(),
            source,
        };

        let response = self
            .client
            .get(parsed)
            .headers(browser_headers())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                url: url.to_owned(),
                status: status.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.bytes().await.map_err(request_error)?;

        Ok(FetchedDocument {
            url: final_url,
            body: body.to_vec(),
        })
    }
}
