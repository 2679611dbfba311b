//! One collection pass over the configured targets.
//!
//! Per-target failures are logged and skipped rather than propagated so a
//! single bad target does not abort the others.

use std::path::Path;

use futures::stream::{self, StreamExt};

use htmlexp_core::{AppConfig, TargetConfig};
use htmlexp_scraper::{Scraper, ScraperError, ScraperOptions};

use crate::exposition::render_gauge;

/// Scrapes the targets in `targets_path` and prints one gauge sample per
/// successful target to stdout.
///
/// # Errors
///
/// Fails if the targets file is invalid, `target_filter` names an unknown
/// target, or every selected target failed.
pub(crate) async fn run_collect(
    config: &AppConfig,
    targets_path: &Path,
    target_filter: Option<&str>,
) -> anyhow::Result<()> {
    let targets_file = htmlexp_core::load_targets(targets_path)?;
    let targets = select_targets(targets_file.targets, target_filter)?;

    if targets.is_empty() {
        tracing::warn!(path = %targets_path.display(), "no targets configured");
        return Ok(());
    }

    let scraper = Scraper::new(ScraperOptions::from_app_config(config))?;
    let max_concurrent = config.max_concurrent_targets.max(1);

    let results: Vec<(&TargetConfig, Result<f64, ScraperError>)> = stream::iter(&targets)
        .map(|target| {
            let scraper = &scraper;
            async move { (target, scraper.scrape(&target.request).await) }
        })
        .buffered(max_concurrent)
        .collect()
        .await;

    let mut output = String::new();
    let mut failed = 0usize;
    for (target, result) in &results {
        match result {
            Ok(value) => {
                output.push_str(&render_gauge(&target.name, target.help.as_deref(), *value));
            }
            Err(e) => {
                failed += 1;
                tracing::error!(
                    name = %target.name,
                    url = %target.request.address,
                    stage = %e.kind(),
                    error = %e,
                    "scrape failed"
                );
            }
        }
    }
    print!("{output}");

    tracing::info!(targets = results.len(), failed, "collection pass finished");

    if failed == results.len() {
        anyhow::bail!("all {failed} targets failed");
    }
    Ok(())
}

fn select_targets(
    targets: Vec<TargetConfig>,
    target_filter: Option<&str>,
) -> anyhow::Result<Vec<TargetConfig>> {
    let Some(name) = target_filter else {
        return Ok(targets);
    };

    let selected: Vec<TargetConfig> = targets.into_iter().filter(|t| t.name == name).collect();
    if selected.is_empty() {
        anyhow::bail!("target '{name}' not found");
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use htmlexp_core::ScrapeRequest;

    use super::*;

    fn target(name: &str) -> TargetConfig {
        TargetConfig {
            name: name.to_string(),
            help: None,
            request: ScrapeRequest::new("https://example.com", "//b"),
        }
    }

    #[test]
    fn select_targets_without_filter_keeps_all() {
        let selected = select_targets(vec![target("a"), target("b")], None).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn select_targets_by_name() {
        let selected = select_targets(vec![target("a"), target("b")], Some("b")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "b");
    }

    #[test]
    fn select_targets_unknown_name_fails() {
        let err = select_targets(vec![target("a")], Some("zzz")).unwrap_err();
        assert!(err.to_string().contains("'zzz' not found"));
    }
}
