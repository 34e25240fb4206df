use std::sync::LazyLock;

use regex::Regex;

static TRACE_ID_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-f0-9]{32}$").expect("static regex"));
static TRACE_ID_LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:traceid[=:\s]+|trace\s*id[=:\s]+)?([a-f0-9]{32})").expect("static regex")
});

/// Whole text, trimmed, is a 32-character hex trace identifier
pub fn is_trace_id(text: &str) -> bool {
    TRACE_ID_EXACT.is_match(text.trim())
}

/// First trace identifier found anywhere in `text`
pub fn find_trace_id(text: &str) -> Option<&str> {
    TRACE_ID_LABELLED
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Error-bearing text carries a trace identifier somewhere
pub fn is_error_text(text: &str) -> bool {
    find_trace_id(text).is_some()
}

/// Environment tag: hostname up to the first hyphen
pub fn env_from_hostname(hostname: &str) -> &str {
    hostname.split('-').next().unwrap_or(hostname)
}

pub fn tracking_url(base: &str, trace_id: &str, env: &str) -> String {
    format!(
        "{}/?traceid={}&env={}",
        base.trim_end_matches('/'),
        trace_id,
        env
    )
}
