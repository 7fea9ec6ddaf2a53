//! Shared types, error model, and configuration for novelfetch.
//!
//! This crate is the foundation depended on by all other novelfetch crates.
//! It provides:
//! - [`NovelFetchError`]: the unified error type
//! - Domain types ([`CrawlRequest`], [`SiteProfile`], [`ChapterRecord`], [`CrawlResult`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, DEFAULT_USER_AGENT, DefaultsConfig, ExtractionConfig, FetchConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{NovelFetchError, Result};
pub use types::{
    ChapterRecord, CrawlRequest, CrawlResult, DEFAULT_MAX_CHAPTERS, ExtractionMethod,
    SiteProfile, StopReason, normalize_domain,
};
