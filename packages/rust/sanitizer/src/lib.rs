//! Chapter text sanitization.
//!
//! Turns the raw text located on a chapter page into clean prose by running a
//! fixed sequence of passes:
//!
//! 1. blacklist / auto filter removal (literal, case-insensitive)
//! 2. residual markup stripping
//! 3. noise fragment removal
//! 4. line normalization
//! 5. duplicate chapter-heading collapse in the first
//!    [`TITLE_WINDOW_TOKENS`] tokens
//! 6. final whitespace collapse
//!
//! A pass can expose work for an earlier one (removing a URL leaves two
//! numbers adjacent, stripping a tag joins a filter literal), so the sequence
//! repeats until the text stops changing. Sanitizing sanitized text is a no-op.

mod cleanup;
mod filters;
mod titles;

use regex::Regex;
use tracing::trace;

use novelfetch_shared::{NovelFetchError, Result};

pub use filters::{AUTO_FILTERS, FilterSet};
pub use titles::TITLE_WINDOW_TOKENS;

/// Every pass only removes text, so real input settles in a few rounds.
const MAX_ROUNDS: usize = 32;

/// A compiled filter list plus the cleanup passes.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    filters: Vec<Regex>,
}

impl Sanitizer {
    /// Compile the active filter list.
    ///
    /// With `use_auto_filters`, the list is `auto` followed by
    /// `user_blacklist`; otherwise `user_blacklist` alone. Blank entries are
    /// skipped and every entry is matched literally.
    pub fn new(auto: &FilterSet, user_blacklist: &[String], use_auto_filters: bool) -> Result<Self> {
        let auto_literals: &[String] = if use_auto_filters { auto.literals() } else { &[] };

        let filters = auto_literals
            .iter()
            .chain(user_blacklist)
            .filter(|f| !f.trim().is_empty())
            .map(|f| {
                Regex::new(&format!("(?i){}", regex::escape(f))).map_err(|e| {
                    NovelFetchError::validation(format!("unusable filter '{f}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { filters })
    }

    /// Number of non-blank filters that [`Self::sanitize`] applies.
    pub fn active_filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Run the full pipeline until its output is stable.
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = self.run_passes(text);
        for round in 1..MAX_ROUNDS {
            let next = self.run_passes(&current);
            if next == current {
                trace!(rounds = round, "sanitizer settled");
                return current;
            }
            current = next;
        }
        current
    }

    fn run_passes(&self, text: &str) -> String {
        let mut result = self.apply_filters(text);

        result = cleanup::strip_markup(&result);
        result = cleanup::strip_noise(&result);
        result = cleanup::normalize_lines(&result);
        result = titles::collapse_repeated_titles(&result);
        result = cleanup::collapse_whitespace(&result);

        result
    }

    fn apply_filters(&self, text: &str) -> String {
        let mut result = text.to_string();
        for re in &self.filters {
            if re.is_match(&result) {
                trace!(filter = re.as_str(), "filter matched");
                result = re.replace_all(&result, "").into_owned();
            }
        }
        result
    }
}

/// One-shot helper: build a [`Sanitizer`] over the built-in auto filters and
/// run it on `text`.
pub fn sanitize(text: &str, user_blacklist: &[String], use_auto_filters: bool) -> Result<String> {
    let sanitizer = Sanitizer::new(&FilterSet::builtin(), user_blacklist, use_auto_filters)?;
    Ok(sanitizer.sanitize(text))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
