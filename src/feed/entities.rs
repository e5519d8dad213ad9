use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:amp|lt|gt|quot|#39|apos);").expect("valid entity regex")
});
static CDATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!\[CDATA\[|\]\]>").expect("valid cdata regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Replace the fixed XML entity set with literal characters.
///
/// Runs as a single pass over the input, so `&amp;lt;` becomes `&lt;` and is
/// not expanded a second time.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| match &caps[0] {
            "&amp;" => "&",
            "&lt;" => "<",
            "&gt;" => ">",
            "&quot;" => "\"",
            _ => "'",
        })
        .into_owned()
}

/// Text meant for display: CDATA markers and markup removed, whitespace
/// collapsed to single spaces.
///
/// Tags are stripped before decoding, so encoded `&lt;`/`&gt;` survive as
/// literal characters.
pub fn display_text(text: &str) -> String {
    let unwrapped = CDATA_RE.replace_all(text, "");
    let stripped = TAG_RE.replace_all(&unwrapped, " ");
    let decoded = decode_entities(&stripped);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Text meant for pattern search: CDATA markers removed, markup kept.
pub fn markup_text(text: &str) -> String {
    let unwrapped = CDATA_RE.replace_all(text, "");
    decode_entities(&unwrapped).trim().to_string()
}
