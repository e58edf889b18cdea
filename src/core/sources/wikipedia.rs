use async_trait::async_trait;
use serde::Deserialize;

use super::{encode, non_empty, ExplanationSource, HttpContext};
use crate::shared::types::{Explanation, SourceId};

pub(crate) const ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";

// -- REST page summary (shared with Wiktionary) --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PageSummary {
    pub title: Option<String>,
    pub extract: Option<String>,
    pub content_urls: Option<ContentUrls>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ContentUrls {
    pub desktop: Option<PageUrls>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PageUrls {
    pub page: Option<String>,
}

impl PageSummary {
    pub fn desktop_page(&self) -> Option<String> {
        non_empty(
            self.content_urls
                .as_ref()
                .and_then(|urls| urls.desktop.as_ref())
                .and_then(|desktop| desktop.page.clone()),
        )
    }
}

/// Encyclopedic summary from the Wikipedia REST API.
pub struct WikipediaSource {
    http: HttpContext,
}

impl WikipediaSource {
    pub fn new(http: HttpContext) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ExplanationSource for WikipediaSource {
    fn id(&self) -> SourceId {
        SourceId::Wikipedia
    }

    async fn fetch(&self, query: &str) -> Explanation {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.http.endpoints().wikipedia,
            encode(query)
        );

        match self.http.get_json::<PageSummary>(&url).await {
            Ok(Some(summary)) => {
                let title = non_empty(summary.title.clone()).unwrap_or_else(|| query.to_string());
                let page = summary
                    .desktop_page()
                    .unwrap_or_else(|| format!("{}{}", ARTICLE_BASE, encode(&title)));
                let extract = non_empty(summary.extract).unwrap_or_else(|| "No summary available.".to_string());
                Explanation::found(extract, Some(page), title)
            }
            Ok(None) => Explanation::not_found("No Wikipedia article found.", None, query),
            Err(e) => {
                tracing::warn!(query, error = %e, "Wikipedia request failed");
                Explanation::failed("Error fetching Wikipedia data.", None, query)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sources::test_support;
    use crate::shared::types::ExplanationOutcome;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_summary_is_normalized() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/rest_v1/page/summary/Quantum");
                then.status(200).json_body(serde_json::json!({
                    "title": "Quantum",
                    "extract": "In physics, a quantum is the minimum amount of any physical entity.",
                    "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Quantum" } }
                }));
            })
            .await;

        let source = WikipediaSource::new(test_support::context(&server.base_url()));
        let explanation = source.fetch("Quantum").await;

        mock.assert_async().await;
        assert_eq!(explanation.title, "Quantum");
        assert!(explanation.extract.starts_with("In physics"));
        assert_eq!(explanation.url.as_deref(), Some("https://en.wikipedia.org/wiki/Quantum"));
        assert!(explanation.is_found());
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/rest_v1/page/summary/Rust");
                then.status(200).json_body(serde_json::json!({ "extract": "" }));
            })
            .await;

        let source = WikipediaSource::new(test_support::context(&server.base_url()));
        let explanation = source.fetch("Rust").await;

        assert_eq!(explanation.extract, "No summary available.");
        assert_eq!(explanation.title, "Rust");
        assert_eq!(explanation.url.as_deref(), Some("https://en.wikipedia.org/wiki/Rust"));
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/rest_v1/page/summary/Zzyzx");
                then.status(404);
            })
            .await;

        let source = WikipediaSource::new(test_support::context(&server.base_url()));
        let explanation = source.fetch("Zzyzx").await;

        assert_eq!(explanation.extract, "No Wikipedia article found.");
        assert_eq!(explanation.url, None);
        assert_eq!(explanation.outcome, ExplanationOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_network_error() {
        let source = WikipediaSource::new(test_support::unreachable());
        let explanation = source.fetch("Quantum").await;

        assert_eq!(explanation.extract, "Error fetching Wikipedia data.");
        assert_eq!(explanation.title, "Quantum");
        assert_eq!(explanation.outcome, ExplanationOutcome::Failed);
    }
}
