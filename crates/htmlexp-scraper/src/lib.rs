pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod select;

pub use error::{ErrorKind, ScraperError};
pub use fetch::{FetchStrategy, FetchedDocument, Fetcher, HeadlessOptions, SettleStrategy};
pub use htmlexp_core::ScrapeRequest;
pub use normalize::normalize_number;
pub use pipeline::{scrape, Scraper, ScraperOptions};
pub use select::{query, Match};
