//! XPath evaluation over fetched HTML.
//!
//! Documents are parsed with html5ever (via `sxd_html`) into an
//! `sxd_document` tree, then queried with XPath 1.0 through `sxd_xpath`.
//! Parsed packages are not `Send`; everything here is synchronous and never
//! held across an await point.

use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};

use crate::error::ScraperError;

/// First node selected by an expression, plus how many nodes matched in total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub text: String,
    pub total: usize,
}

/// Evaluates `selector` against `content` and returns the first match in
/// document order.
///
/// With `attribute` set, the value of that attribute on the first matched
/// element is returned instead of its text content. More than one match is
/// logged as a warning and is not an error.
///
/// # Errors
///
/// - [`ScraperError::Parse`]: content is empty or has no root element.
/// - [`ScraperError::InvalidSelector`]: the expression is malformed or does not select nodes.
/// - [`ScraperError::NoMatch`]: the expression selected nothing.
/// - [`ScraperError::MissingAttribute`]: the first match lacks `attribute`.
pub fn query(
    content: &[u8],
    selector: &str,
    attribute: Option<&str>,
) -> Result<Match, ScraperError> {
    let package = parse_document(content)?;
    let document = package.as_document();
    let xpath = compile(selector)?;

    let value = xpath
        .evaluate(&Context::new(), document.root())
        .map_err(|e| ScraperError::InvalidSelector {
            selector: selector.to_owned(),
            reason: e.to_string(),
        })?;

    let Value::Nodeset(nodeset) = value else {
        return Err(ScraperError::InvalidSelector {
            selector: selector.to_owned(),
            reason: "expression does not select nodes".to_string(),
        });
    };

    let nodes = nodeset.document_order();
    let Some(first) = nodes.first() else {
        return Err(ScraperError::NoMatch {
            selector: selector.to_owned(),
        });
    };

    if nodes.len() > 1 {
        tracing::warn!(
            selector,
            matches = nodes.len(),
            "more than one element was returned by the XPath expression; only the first is used"
        );
    }

    let text = match attribute {
        None => first.string_value(),
        Some(name) => attribute_value(*first, name).ok_or_else(|| {
            ScraperError::MissingAttribute {
                selector: selector.to_owned(),
                attribute: name.to_owned(),
            }
        })?,
    };

    Ok(Match {
        text,
        total: nodes.len(),
    })
}

/// Returns whether `selector` selects at least one node in `content`.
///
/// Never fails: unparseable content or expressions count as "no match".
#[must_use]
pub fn has_match(content: &[u8], selector: &str) -> bool {
    let Ok(package) = parse_document(content) else {
        return false;
    };
    let Ok(xpath) = compile(selector) else {
        return false;
    };
    let document = package.as_document();
    matches!(
        xpath.evaluate(&Context::new(), document.root()),
        Ok(Value::Nodeset(nodes)) if nodes.size() > 0
    )
}

fn parse_document(content: &[u8]) -> Result<Package, ScraperError> {
    // Bytes that are not UTF-8 (Latin-1 pages, stray Windows-1252 quotes)
    // become U+FFFD instead of failing the whole document.
    let html = String::from_utf8_lossy(content);

    if html.trim().is_empty() {
        return Err(ScraperError::Parse {
            reason: "document is empty".to_string(),
        });
    }

    let package = sxd_html::parse_html(&html);
    let has_root_element = package
        .as_document()
        .root()
        .children()
        .into_iter()
        .any(|child| child.element().is_some());
    if !has_root_element {
        return Err(ScraperError::Parse {
            reason: "document has no root element".to_string(),
        });
    }

    Ok(package)
}

fn compile(selector: &str) -> Result<XPath, ScraperError> {
    Factory::new()
        .build(selector)
        .map_err(|e| ScraperError::InvalidSelector {
            selector: selector.to_owned(),
            reason: e.to_string(),
        })?
        .ok_or_else(|| ScraperError::InvalidSelector {
            selector: selector.to_owned(),
            reason: "expression is empty".to_string(),
        })
}

fn attribute_value(node: Node<'_>, name: &str) -> Option<String> {
    match node {
        Node::Element(element) => element.attribute_value(name).map(str::to_owned),
        Node::Attribute(attr) => Some(attr.value().to_owned()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "select_test.rs"]
mod tests;
