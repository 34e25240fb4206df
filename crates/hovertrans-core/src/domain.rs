use regex::Regex;

/// Whitelist gate. An empty whitelist allows every hostname; otherwise the
/// hostname must fully match one glob pattern, case-insensitively, where `*`
/// stands for any substring.
pub fn is_domain_allowed(whitelist: &[String], hostname: &str) -> bool {
    whitelist.is_empty() || whitelist.iter().any(|p| glob_matches(p, hostname))
}

fn glob_matches(pattern: &str, hostname: &str) -> bool {
    let escaped = regex::escape(pattern.trim()).replace(r"\*", ".*");
    match Regex::new(&format!("(?i)^{escaped}$")) {
        Ok(re) => re.is_match(hostname),
        Err(e) => {
            tracing::warn!("Ignoring whitelist pattern {pattern:?}: {e}");
            false
        }
    }
}
