//! Extract pipeline for novelfetch.
//!
//! This crate wires the configuration file into the crawler and exposes the
//! single `crawl` entry point, plus the JSON request/response adapter used by
//! the CLI's `request` command.

pub mod api;
pub mod pipeline;

pub use api::{ChapterSummary, ExtractFailure, ExtractRequest, ExtractResponse, ExtractSuccess};
pub use novelfetch_crawler::{CrawlProgress, SilentProgress};
pub use pipeline::{build_crawler, crawl, default_request, extract, extract_json};
