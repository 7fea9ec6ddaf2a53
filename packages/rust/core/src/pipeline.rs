//! End-to-end extract pipeline: config → crawler → crawl → response.

use std::time::Instant;

use tracing::{info, instrument, warn};

use novelfetch_crawler::{CrawlProgress, Crawler, ProfileRegistry};
use novelfetch_sanitizer::FilterSet;
use novelfetch_shared::{AppConfig, CrawlConfig, CrawlRequest, CrawlResult, NovelFetchError, Result};

use crate::api::{ExtractRequest, ExtractResponse};

/// Build a crawler from the application config: configured profiles merged
/// over the built-ins, configured extra auto filters appended to the table.
pub fn build_crawler(config: &AppConfig) -> Result<Crawler> {
    let profiles = ProfileRegistry::new(config.profiles.clone())?;
    let filters =
        FilterSet::builtin().with_extra(config.extraction.extra_auto_filters.iter().cloned());
    Crawler::new(CrawlConfig::from(config), profiles, filters)
}

/// A crawl request for `url` carrying the config file's `[defaults]`.
pub fn default_request(config: &AppConfig, url: &str) -> Result<CrawlRequest> {
    Ok(CrawlRequest::parse(url)?
        .with_max_chapters(config.defaults.max_chapters)?
        .with_blacklist(config.defaults.blacklist.clone())
        .with_auto_filters(config.defaults.use_auto_filters))
}

/// Run one crawl.
#[instrument(skip_all, fields(url = %request.start_url))]
pub async fn crawl(
    config: &AppConfig,
    request: &CrawlRequest,
    progress: &dyn CrawlProgress,
) -> Result<CrawlResult> {
    let start = Instant::now();
    let crawler = build_crawler(config)?;
    let result = crawler.crawl(request, progress).await?;

    info!(
        chapters = result.chapters.len(),
        filters = result.filters_applied_count,
        elapsed_ms = start.elapsed().as_millis(),
        "extract pipeline complete"
    );

    Ok(result)
}

/// Serve one JSON extract request. Every error becomes a failure response.
pub async fn extract(
    config: &AppConfig,
    request: &ExtractRequest,
    progress: &dyn CrawlProgress,
) -> ExtractResponse {
    let crawl_request = match request.to_crawl_request() {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "rejected extract request");
            return ExtractResponse::failure(&e);
        }
    };

    match crawl(config, &crawl_request, progress).await {
        Ok(result) => ExtractResponse::success(result, request),
        Err(e) => {
            warn!(error = %e, "extract failed");
            ExtractResponse::failure(&e)
        }
    }
}

/// Decode a raw JSON body and serve it; malformed JSON is a failure response.
pub async fn extract_json(
    config: &AppConfig,
    body: &str,
    progress: &dyn CrawlProgress,
) -> ExtractResponse {
    match serde_json::from_str::<ExtractRequest>(body) {
        Ok(request) => extract(config, &request, progress).await,
        Err(e) => ExtractResponse::failure(&NovelFetchError::validation(format!(
            "invalid request body: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novelfetch_crawler::SilentProgress;
    use novelfetch_shared::SiteProfile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::ExtractSuccess;

    const PROSE: &str = "The caravan reached the pass at dawn and the guide pointed at the valley below. \
                         Nobody spoke while the mules picked their way down the narrow trail.";

    fn fast_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.fetch.delay_ms = 0;
        config.extraction.readability = false;
        config
    }

    async fn mount(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn page(n: usize, next: Option<&str>) -> String {
        let nav = next
            .map(|h| format!(r#"<a class="next" href="{h}">Next</a>"#))
            .unwrap_or_default();
        format!(
            r#"<html><body><h1>Chapter {n}</h1><div class="entry-content"><p>{PROSE}</p></div>{nav}</body></html>"#
        )
    }

    fn unwrap_success(resp: ExtractResponse) -> ExtractSuccess {
        match resp {
            ExtractResponse::Success(s) => s,
            ExtractResponse::Failure(f) => panic!("unexpected failure: {}", f.error),
        }
    }

    #[test]
    fn build_crawler_merges_config() {
        let mut config = AppConfig::default();
        config.extraction.extra_auto_filters = vec!["Support the translator".into()];
        config.profiles.push(SiteProfile {
            domain: "reader.example.org".into(),
            content_selectors: vec!["#text".into()],
            title_selectors: vec![],
            removal_selectors: vec![],
        });

        let crawler = build_crawler(&config).unwrap();
        assert_eq!(crawler.auto_filters().len(), FilterSet::builtin().len() + 1);
        assert_eq!(
            crawler.profiles().len(),
            novelfetch_crawler::builtin_profiles().len() + 1
        );
    }

    #[test]
    fn build_crawler_rejects_bad_profile() {
        let mut config = AppConfig::default();
        config.profiles.push(SiteProfile {
            domain: "broken.example".into(),
            content_selectors: vec!["p[".into()],
            title_selectors: vec![],
            removal_selectors: vec![],
        });
        assert!(matches!(build_crawler(&config), Err(NovelFetchError::Config { .. })));
    }

    #[test]
    fn default_request_uses_config_defaults() {
        let mut config = AppConfig::default();
        config.defaults.max_chapters = 4;
        config.defaults.use_auto_filters = false;
        config.defaults.blacklist = vec!["Translator: Lin".into()];

        let req = default_request(&config, "https://x.example/c1").unwrap();
        assert_eq!(req.max_chapters, 4);
        assert!(!req.use_auto_filters);
        assert_eq!(req.user_blacklist.len(), 1);
    }

    #[tokio::test]
    async fn extract_success_omits_content_by_default() {
        let server = MockServer::start().await;
        mount(&server, "/s/chapter-1", page(1, Some("/s/chapter-2"))).await;
        mount(&server, "/s/chapter-2", page(2, None)).await;

        let request = ExtractRequest::new(format!("{}/s/chapter-1", server.uri()));
        let resp = unwrap_success(extract(&fast_config(), &request, &SilentProgress).await);

        assert!(resp.success);
        assert_eq!(resp.chapters_found, 2);
        assert_eq!(resp.chapters[1].number, 2);
        assert!(resp.chapters.iter().all(|c| c.content.is_none()));
        assert_eq!(resp.combined_text.matches("CHAPTER ").count(), 2);
        assert!(resp.auto_filters_enabled);
    }

    #[tokio::test]
    async fn extract_json_includes_content_when_asked() {
        let server = MockServer::start().await;
        mount(&server, "/s/chapter-1", page(1, None)).await;

        let body = format!(
            r#"{{"url":"{}/s/chapter-1","numChapters":1,"includeContent":true}}"#,
            server.uri()
        );
        let resp = unwrap_success(extract_json(&fast_config(), &body, &SilentProgress).await);

        assert_eq!(resp.chapters[0].content.as_deref(), Some(PROSE));
        let json = serde_json::to_value(ExtractResponse::Success(resp)).unwrap();
        assert_eq!(json["chaptersFound"], 1);
        assert_eq!(json["stopReason"]["reason"], "chapter_limit");
    }

    #[tokio::test]
    async fn unreachable_start_is_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let request = ExtractRequest::new(format!("{}/s/chapter-1", server.uri()));
        let resp = extract(&fast_config(), &request, &SilentProgress).await;
        match resp {
            ExtractResponse::Failure(f) => assert!(f.error.contains("no chapter")),
            ExtractResponse::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_error_response() {
        let resp = extract_json(&fast_config(), "{not json", &SilentProgress).await;
        assert!(!resp.is_success());

        let resp = extract_json(&fast_config(), r#"{"numChapters":2}"#, &SilentProgress).await;
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"], "validation error: missing url");
    }
}
