/// Strips a leading `http://` or `https://` and any trailing slashes.
///
/// Used for both exclusion-set keys and candidate hosts, so the two sides
/// always compare in the same form. Case and inner whitespace are untouched.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let stripped = raw
        .strip_prefix("http://")
        .or_else(|| raw.strip_prefix("https://"))
        .unwrap_or(raw);

    stripped.trim_end_matches('/').to_string()
}

/// Prepends the scheme matching `protocol` unless the host already carries it.
///
/// Only the matching scheme is checked: a host already tagged with the other
/// scheme is not corrected and gets the expected one prepended in front.
pub fn with_scheme(host: &str, protocol: &str) -> String {
    match protocol {
        "http" if !host.starts_with("http://") => format!("http://{host}"),
        "https" if !host.starts_with("https://") => format!("https://{host}"),
        _ => host.to_string(),
    }
}

/// Host part of a `host:port` string, split at the first colon.
pub fn without_port(host: &str) -> Option<&str> {
    host.split_once(':').map(|(host_only, _)| host_only)
}
