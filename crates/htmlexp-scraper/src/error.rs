use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("unable to create request for {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unable to request URL {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status {status}")]
    UnexpectedStatus { url: String, status: String },

    #[error("headless browser failed for {url}: {reason}")]
    Headless { url: String, reason: String },

    #[error("headless fetch of {url} did not finish within {timeout_ms}ms")]
    HeadlessTimeout { url: String, timeout_ms: u128 },

    #[error("error loading the document into XPath nodes: {reason}")]
    Parse { reason: String },

    #[error("invalid XPath expression `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no elements returned by the XPath expression `{selector}`")]
    NoMatch { selector: String },

    #[error("first element returned by `{selector}` has no attribute `{attribute}`")]
    MissingAttribute { selector: String, attribute: String },

    #[error(
        "unable to parse \"{value}\" as a number \
         (thousands separator \"{thousands_separator}\", decimal separator \"{decimal_separator}\"): {source}"
    )]
    Normalization {
        value: String,
        thousands_separator: String,
        decimal_separator: String,
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Parse,
    Selector,
    Normalization,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Fetch => write!(f, "fetch"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Selector => write!(f, "selector"),
            ErrorKind::Normalization => write!(f, "normalization"),
        }
    }
}

impl ScraperError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScraperError::Client(_)
            | ScraperError::InvalidUrl { .. }
            | ScraperError::Request { .. }
            | ScraperError::UnexpectedStatus { .. }
            | ScraperError::Headless { .. }
            | ScraperError::HeadlessTimeout { .. } => ErrorKind::Fetch,
            ScraperError::Parse { .. } => ErrorKind::Parse,
            ScraperError::InvalidSelector { .. }
            | ScraperError::NoMatch { .. }
            | ScraperError::MissingAttribute { .. } => ErrorKind::Selector,
            ScraperError::Normalization { .. } => ErrorKind::Normalization,
        }
    }
}
