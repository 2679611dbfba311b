//! Prometheus text-format rendering for scraped values.

/// Renders a single unlabeled gauge sample with its `HELP` and `TYPE` lines.
pub(crate) fn render_gauge(name: &str, help: Option<&str>, value: f64) -> String {
    let help = help.map_or_else(|| format!("Value scraped for {name}"), escape_help);
    format!(
        "# HELP {name} {help}\n# TYPE {name} gauge\n{name} {}\n",
        format_value(value)
    )
}

fn escape_help(help: &str) -> String {
    help.replace('\\', r"\\").replace('\n', r"\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value.is_sign_positive() { '+' } else { '-' };
        format!("{sign}Inf")
    } else {
        value.to_string()
    }
}
