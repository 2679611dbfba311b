use serde::{Deserialize, Serialize};

/// Everything needed to turn one page into one number.
///
/// Built once per invocation by the caller and never mutated by the
/// pipeline. `thousands_separator` may be empty; separators are always
/// caller-supplied and never inferred from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub address: String,
    pub selector: String,
    #[serde(default)]
    pub headless: bool,
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: String,
    #[serde(default = "default_decimal_point_separator")]
    pub decimal_point_separator: String,
    /// Extract this attribute of the first matched element instead of its text.
    #[serde(default)]
    pub attribute: Option<String>,
}

fn default_thousands_separator() -> String {
    ",".to_string()
}

fn default_decimal_point_separator() -> String {
    ".".to_string()
}

impl ScrapeRequest {
    /// A direct-mode request using `,` for thousands and `.` for decimals.
    #[must_use]
    pub fn new(address: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            selector: selector.into(),
            headless: false,
            thousands_separator: default_thousands_separator(),
            decimal_point_separator: default_decimal_point_separator(),
            attribute: None,
        }
    }

    #[must_use]
    pub fn with_separators(
        mut self,
        thousands_separator: impl Into<String>,
        decimal_point_separator: impl Into<String>,
    ) -> Self {
        self.thousands_separator = thousands_separator.into();
        self.decimal_point_separator = decimal_point_separator.into();
        self
    }

    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}
