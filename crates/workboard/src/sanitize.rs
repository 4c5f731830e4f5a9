//! Helpers for keeping credentials and local paths out of log lines.

use std::path::Path;

/// Returns only the filename component of a path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Strips userinfo and the query string from a URL.
///
/// - `https://user:pw@x.supabase.co/rest` → `https://****@x.supabase.co/rest`
/// - `https://x.supabase.co/rest?apikey=abc` → `https://x.supabase.co/rest?****`
pub fn redact_url(url: &str) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, _)) => (base, Some("****")),
        None => (url, None),
    };

    let mut out = match base.find("://") {
        Some(scheme_end) => {
            let after_scheme = &base[scheme_end + 3..];
            let host_end = after_scheme.find('/').unwrap_or(after_scheme.len());
            match after_scheme[..host_end].rfind('@') {
                Some(at_pos) => format!(
                    "{}****@{}",
                    &base[..scheme_end + 3],
                    &after_scheme[at_pos + 1..]
                ),
                None => base.to_string(),
            }
        }
        None => base.to_string(),
    };

    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    out
}

/// Shows the first four characters of a key and masks the rest.
pub fn redact_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}
