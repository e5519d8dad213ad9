use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Tried in order; the first pattern that matches wins.
static IMAGE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)<img[^>]+src="([^"]+)""#,
        r#"(?i)<img[^>]+src='([^']+)'"#,
        r#"(?i)background-image:\s*url\(['"]?([^'")\s]+)['"]?\)"#,
        r#"(?i)<meta[^>]+property="og:image"[^>]+content="([^"]+)""#,
        r#"(?i)<meta[^>]+name="twitter:image"[^>]+content="([^"]+)""#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid image regex"))
    .collect()
});

/// Find a representative image in an item's markup.
///
/// A candidate that does not resolve to an absolute http(s) URL is logged
/// and skipped rather than reported as an error.
pub fn extract_image_url(content: &str) -> Option<Url> {
    let candidate = find_candidate(content)?;
    let cleaned = clean_candidate(candidate);

    match Url::parse(&cleaned) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            tracing::warn!(image_url = %cleaned, scheme = url.scheme(), "Unsupported image URL scheme, skipping");
            None
        }
        Err(e) => {
            tracing::warn!(image_url = %cleaned, error = %e, "Invalid image URL, skipping");
            None
        }
    }
}

fn find_candidate(content: &str) -> Option<&str> {
    IMAGE_PATTERNS
        .iter()
        .find_map(|re| re.captures(content).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str())
}

/// Un-escape encoded ampersands, then drop the query string.
fn clean_candidate(raw: &str) -> String {
    let unescaped = raw.replace("&#038;", "&").replace("&amp;", "&");
    match unescaped.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => unescaped,
    }
}
