//! Chapter fetching, content location, and pagination crawling.
//!
//! This crate provides:
//! - [`Fetcher`]: single-attempt HTTP page fetcher
//! - [`ProfileRegistry`]: per-domain extraction rules
//! - [`ContentLocator`]: profile, readability, heuristic and body strategies
//! - [`resolve_next`]: next-chapter link resolution with loop guards
//! - [`Crawler`]: the sequential chapter crawl loop

pub mod chapter;
mod dom;
pub mod engine;
pub mod fetcher;
pub mod locator;
pub mod next_link;
pub mod profiles;

pub use chapter::{DIVIDER, build_combined_text, clean_title, display_number, extract_title};
pub use engine::{CrawlProgress, Crawler, MIN_CHAPTER_CHARS, SilentProgress};
pub use fetcher::Fetcher;
pub use locator::{ContentLocator, Located, MIN_CONTENT_CHARS};
pub use next_link::{is_chapter_one_link, normalize_url, resolve_next};
pub use profiles::{CompiledProfile, ProfileRegistry, builtin_profiles};
