//! Free-text input scrubbing.
//!
//! Company names and additional context are user-controlled text that ends up
//! verbatim in the generation prompt. Only letters, digits, whitespace and
//! hyphens survive.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9\s-]").expect("static sanitizer pattern"));

/// Strip every character outside `[A-Za-z0-9]`, whitespace and `-`, then trim.
///
/// Internal spacing is preserved. Never fails; empty input yields empty output.
pub fn sanitize(text: &str) -> String {
    DISALLOWED.replace_all(text, "").trim().to_string()
}
