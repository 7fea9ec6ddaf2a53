//! Duplicate chapter-heading collapse.
//!
//! Reader pages usually repeat the series name and chapter heading
//! (breadcrumb, page header, then the heading inside the text). Only the
//! beginning of a chapter is affected, so the pass is limited to a fixed
//! token window and leaves the body untouched.

use std::sync::LazyLock;

use regex::Regex;

/// Number of leading whitespace tokens inspected.
pub const TITLE_WINDOW_TOKENS: usize = 200;

/// Minimum length of a capitalized run treated as a series name.
const SERIES_TITLE_MIN_WORDS: usize = 3;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bchapter\s+(\d+)\b").expect("valid regex"));

/// Collapse repeated headings and a leading series name inside the window.
///
/// A collapse shortens the window's head, which pulls later tokens into it,
/// so the pass repeats until the text stops changing.
pub(crate) fn collapse_repeated_titles(text: &str) -> String {
    let mut current = collapse_window(text);
    loop {
        let next = collapse_window(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn collapse_window(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let split = tokens.len().min(TITLE_WINDOW_TOKENS);
    let window = tokens[..split].join(" ");
    let rest = tokens[split..].join(" ");

    let mut head = collapse_duplicate_headings(&window);
    head = strip_series_title(&head);

    match (head.is_empty(), rest.is_empty()) {
        (_, true) => head,
        (true, false) => rest,
        (false, false) => format!("{head} {rest}"),
    }
}

/// Rewrite every "Chapter N ... Chapter N" span to a single "Chapter N".
///
/// Repeats until no pair is left, so three copies of a heading end up as one.
fn collapse_duplicate_headings(window: &str) -> String {
    let mut current = window.to_string();
    loop {
        let next = collapse_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One left-to-right pass: each heading is paired with the nearest later
/// heading carrying the same number; pairs never overlap.
fn collapse_once(window: &str) -> String {
    let headings: Vec<(usize, usize, &str)> = HEADING_RE
        .captures_iter(window)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str();
            Some((whole.start(), whole.end(), number))
        })
        .collect();

    let mut out = String::with_capacity(window.len());
    let mut cursor = 0;
    let mut i = 0;

    while i < headings.len() {
        let (start, _, number) = headings[i];
        let partner = headings[i + 1..]
            .iter()
            .position(|(_, _, n)| *n == number)
            .map(|offset| i + 1 + offset);

        match partner {
            Some(j) => {
                out.push_str(&window[cursor..start]);
                out.push_str("Chapter ");
                out.push_str(number);
                cursor = headings[j].1;
                i = j + 1;
            }
            None => i += 1,
        }
    }

    out.push_str(&window[cursor..]);
    out
}

/// Drop a leading run of capitalized words when it directly precedes a
/// chapter heading ("Da Xuan Martial Saint Chapter 12 ...").
fn strip_series_title(window: &str) -> String {
    let tokens: Vec<&str> = window.split(' ').collect();
    let run = tokens
        .iter()
        .take_while(|t| !is_chapter_keyword(t) && is_capitalized_word(t))
        .count();

    let followed_by_heading = tokens.get(run).is_some_and(|t| is_chapter_keyword(t));
    if run >= SERIES_TITLE_MIN_WORDS && followed_by_heading {
        tokens[run..].join(" ")
    } else {
        window.to_string()
    }
}

fn is_chapter_keyword(token: &str) -> bool {
    token.eq_ignore_ascii_case("chapter") || token.eq_ignore_ascii_case("chapitre")
}

/// `Xxxx`: one uppercase letter followed by at least one lowercase letter.
fn is_capitalized_word(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = chars.collect();
            !rest.is_empty() && rest.iter().all(|c| c.is_lowercase())
        }
        _ => false,
    }
}
