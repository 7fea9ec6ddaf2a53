//! Regex cleanup passes over extracted chapter text.
//!
//! Each pass is a function `&str -> String` applied in sequence by
//! [`crate::Sanitizer::sanitize`].

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Pass: strip residual markup
// ---------------------------------------------------------------------------

/// Remove leftover tags and orphaned attribute fragments.
pub(crate) fn strip_markup(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?i)\b(?:href|class|id|style|src|alt|title)=["'][^"']*["']"#)
            .expect("valid regex")
    });

    let without_tags = TAG_RE.replace_all(text, "");
    ATTR_RE.replace_all(&without_tags, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass: strip noise fragments
// ---------------------------------------------------------------------------

/// Remove widget residue: "powered by" credits, counters, URLs, noscript
/// tokens, empty brackets and number runs.
pub(crate) fn strip_noise(text: &str) -> String {
    static NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            // "powered by Disqus." up to the next period
            r"(?i)powered\s+by\s+[^.]*\.?",
            // "3 left", "3 left3"
            r"(?i)\b\d+\s*left\d*",
            r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+"#,
            r#"(?i)www\.[^\s<>"{}|\\^`\[\]]+"#,
            // ".com/ref=..." tracking residue
            r"(?i)\.[a-z]{2,4}/?ref\S*",
            r"(?i)ref[_-]?noscript",
            r"\(\s*\)",
            r"\[\s*\]",
            r"\{\s*\}",
            // "3 3 12"; last, so numbers brought together above are caught
            r"(?:\b\d+\s*){2,}",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    });

    let mut result = text.to_string();
    for re in NOISE_RES.iter() {
        if re.is_match(&result) {
            result = re.replace_all(&result, "").into_owned();
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Pass: normalize lines
// ---------------------------------------------------------------------------

/// Collapse horizontal whitespace and drop lines made only of digits and
/// punctuation.
pub(crate) fn normalize_lines(text: &str) -> String {
    static INLINE_WS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));
    static SYMBOL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"^[\d\s\-_=+*#@!.,;:'"<>/\\|(){}\[\]]+$"#).expect("valid regex")
    });

    text.lines()
        .map(|line| INLINE_WS_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty() && !SYMBOL_LINE_RE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Pass: collapse whitespace
// ---------------------------------------------------------------------------

/// Collapse every whitespace run to one space and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
