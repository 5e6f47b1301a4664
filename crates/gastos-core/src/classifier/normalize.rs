//! Description normalization shared by every matcher

use std::sync::OnceLock;

use regex::Regex;

fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Anything that is not a letter, digit or whitespace (underscore included)
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Lowercase, replace punctuation with spaces, collapse whitespace and trim.
///
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let spaced = punctuation_re().replace_all(&lowered, " ");
    whitespace_re().replace_all(&spaced, " ").trim().to_string()
}
