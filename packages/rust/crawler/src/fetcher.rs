//! HTTP page fetcher.

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use novelfetch_shared::{CrawlConfig, NovelFetchError, Result};

/// Single-attempt HTML fetcher with a bounded timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build the underlying client from the runtime config.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .build()
            .map_err(|e| NovelFetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch `url` and return the body as text. Timeouts, transport errors
    /// and non-success statuses are all network errors; nothing is retried.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| NovelFetchError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NovelFetchError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NovelFetchError::Network(format!("{url}: body read failed: {e}")))?;

        debug!(status = status.as_u16(), bytes = body.len(), "page fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/c1"))
            .and(header("user-agent", "novelfetch-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let config = CrawlConfig {
            user_agent: "novelfetch-test/1.0".into(),
            ..CrawlConfig::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        let url = Url::parse(&format!("{}/c1", server.uri())).unwrap();
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn non_success_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&CrawlConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, NovelFetchError::Network(ref m) if m.contains("404")));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = CrawlConfig {
            timeout: Duration::from_millis(50),
            ..CrawlConfig::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(NovelFetchError::Network(_))
        ));
    }
}
