//! JSON request/response shapes for the extract operation.
//!
//! Transport-agnostic: the CLI `request` command reads an [`ExtractRequest`]
//! from a file or stdin and prints the [`ExtractResponse`]; any other
//! transport can do the same.

use serde::{Deserialize, Serialize};

use novelfetch_shared::{
    CrawlRequest, CrawlResult, DEFAULT_MAX_CHAPTERS, ExtractionMethod, NovelFetchError, Result,
    StopReason,
};

/// Incoming extract request (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// First chapter URL. Required; kept optional so a missing value is
    /// reported as a validation error rather than a decode error.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_num_chapters")]
    pub num_chapters: usize,

    #[serde(default)]
    pub blacklist: Vec<String>,

    #[serde(default = "default_true")]
    pub use_auto_filters: bool,

    /// Include each chapter's text in the response, not just the combined text.
    #[serde(default)]
    pub include_content: bool,
}

fn default_num_chapters() -> usize {
    DEFAULT_MAX_CHAPTERS
}
fn default_true() -> bool {
    true
}

impl ExtractRequest {
    /// Request for `url` with every other field at its default.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            num_chapters: DEFAULT_MAX_CHAPTERS,
            blacklist: Vec::new(),
            use_auto_filters: true,
            include_content: false,
        }
    }

    /// Validate and convert into a crawl request.
    pub fn to_crawl_request(&self) -> Result<CrawlRequest> {
        let url = self
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| NovelFetchError::validation("missing url"))?;

        Ok(CrawlRequest::parse(url)?
            .with_max_chapters(self.num_chapters)?
            .with_blacklist(self.blacklist.clone())
            .with_auto_filters(self.use_auto_filters))
    }
}

/// One chapter entry in a success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    /// Display number (from the title or URL).
    pub number: usize,
    pub title: String,
    pub url: String,
    pub method: ExtractionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractSuccess {
    /// Always `true`.
    pub success: bool,
    pub chapters_found: usize,
    pub chapters: Vec<ChapterSummary>,
    pub combined_text: String,
    pub filters_applied: usize,
    pub auto_filters_enabled: bool,
    pub stop_reason: StopReason,
}

/// Body of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractFailure {
    pub error: String,
}

/// Extract response: either a success body or `{ "error": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractResponse {
    Success(ExtractSuccess),
    Failure(ExtractFailure),
}

impl ExtractResponse {
    /// Build a success response from a crawl result.
    pub fn success(result: CrawlResult, request: &ExtractRequest) -> Self {
        let chapters = result
            .chapters
            .into_iter()
            .map(|ch| ChapterSummary {
                number: ch.display_number,
                title: ch.title,
                url: ch.url,
                method: ch.method,
                content: request.include_content.then_some(ch.content),
            })
            .collect::<Vec<_>>();

        Self::Success(ExtractSuccess {
            success: true,
            chapters_found: chapters.len(),
            chapters,
            combined_text: result.combined_text,
            filters_applied: result.filters_applied_count,
            auto_filters_enabled: request.use_auto_filters,
            stop_reason: result.stop_reason,
        })
    }

    /// Build a failure response from an error.
    pub fn failure(error: &NovelFetchError) -> Self {
        Self::Failure(ExtractFailure {
            error: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
