//! URL detection, validation and normalization for shared portfolio links.

use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>]+").expect("valid url regex"));

/// First `http(s)://` link in a message body.
#[must_use]
pub fn find_url(text: &str) -> Option<&str> {
    URL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', '>', '!', '?']))
}

/// Prepend `https://` when the input carries no http(s) scheme.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    }
}

/// Whether `raw` (scheme optional) names a fetchable web page.
#[must_use]
pub fn is_valid_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Ok(parsed) = Url::parse(&normalize_url(raw)) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    match parsed.host() {
        Some(Host::Domain(domain)) => is_public_domain(domain),
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        None => false,
    }
}

fn is_public_domain(domain: &str) -> bool {
    let mut labels = domain.trim_end_matches('.').split('.');
    let Some(tld) = labels.next_back() else {
        return false;
    };
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let rest: Vec<&str> = labels.collect();
    !rest.is_empty()
        && rest.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
