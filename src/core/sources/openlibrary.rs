use async_trait::async_trait;
use serde::Deserialize;

use super::{encode, non_empty, ExplanationSource, HttpContext};
use crate::shared::types::{Explanation, SourceId};

const CATALOG_BASE: &str = "https://openlibrary.org";
const MAX_SUBJECTS: usize = 3;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    docs: Vec<BookDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookDoc {
    key: String,
    title: Option<String>,
    author_name: Option<Vec<String>>,
    first_publish_year: Option<i64>,
    publisher: Vec<String>,
    subject: Vec<String>,
}

/// Bibliographic record for the first Open Library search hit.
pub struct OpenLibrarySource {
    http: HttpContext,
}

impl OpenLibrarySource {
    pub fn new(http: HttpContext) -> Self {
        Self { http }
    }
}

fn search_page(query: &str) -> Option<String> {
    Some(format!("{}/search?q={}", CATALOG_BASE, encode(query)))
}

fn compose(book: BookDoc, query: &str) -> Explanation {
    let title = non_empty(book.title).unwrap_or_else(|| query.to_string());
    let authors = book
        .author_name
        .map(|names| names.join(", "))
        .unwrap_or_else(|| "Unknown author".to_string());
    let year = book
        .first_publish_year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "Unknown year".to_string());

    let mut extract = format!("\"{}\" by {} ({}).", title, authors, year);
    if let Some(publisher) = book.publisher.first().filter(|p| !p.is_empty()) {
        extract.push_str(&format!(" Publisher: {}.", publisher));
    }
    if !book.subject.is_empty() {
        let subjects: Vec<&str> = book.subject.iter().take(MAX_SUBJECTS).map(String::as_str).collect();
        extract.push_str(&format!(" Topics: {}.", subjects.join(", ")));
    }

    Explanation::found(extract, Some(format!("{}{}", CATALOG_BASE, book.key)), title)
}

#[async_trait]
impl ExplanationSource for OpenLibrarySource {
    fn id(&self) -> SourceId {
        SourceId::Openlibrary
    }

    async fn fetch(&self, query: &str) -> Explanation {
        let url = format!(
            "{}/search.json?q={}&limit=1",
            self.http.endpoints().openlibrary,
            encode(query)
        );

        match self.http.get_json::<SearchResponse>(&url).await {
            Ok(Some(response)) => match response.docs.into_iter().next() {
                Some(book) => compose(book, query),
                None => Explanation::not_found(
                    format!("No books or authors found for \"{}\" in Open Library.", query),
                    search_page(query),
                    query,
                ),
            },
            Ok(None) => Explanation::not_found(
                format!("No Open Library results found for \"{}\".", query),
                search_page(query),
                query,
            ),
            Err(e) => {
                tracing::warn!(query, error = %e, "Open Library request failed");
                Explanation::failed(
                    format!("Error fetching Open Library data for \"{}\".", query),
                    search_page(query),
                    query,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sources::test_support;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_full_record() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search.json")
                    .query_param("q", "Dune")
                    .query_param("limit", "1");
                then.status(200).json_body(json!({
                    "numFound": 1,
                    "docs": [{
                        "key": "/works/OL893415W",
                        "title": "Dune",
                        "author_name": ["Frank Herbert"],
                        "first_publish_year": 1965,
                        "publisher": ["Chilton Books", "Ace"],
                        "subject": ["Science fiction", "Deserts", "Ecology", "Politics"]
                    }]
                }));
            })
            .await;

        let source = OpenLibrarySource::new(test_support::context(&server.base_url()));
        let explanation = source.fetch("Dune").await;

        mock.assert_async().await;
        assert_eq!(
            explanation.extract,
            "\"Dune\" by Frank Herbert (1965). Publisher: Chilton Books. Topics: Science fiction, Deserts, Ecology."
        );
        assert_eq!(explanation.url.as_deref(), Some("https://openlibrary.org/works/OL893415W"));
        assert_eq!(explanation.title, "Dune");
    }

    #[tokio::test]
    async fn test_sparse_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search.json");
                then.status(200).json_body(json!({
                    "docs": [{ "key": "/works/OL1W", "author_name": ["A", "B"] }]
                }));
            })
            .await;

        let source = OpenLibrarySource::new(test_support::context(&server.base_url()));
        let explanation = source.fetch("mystery").await;
        assert_eq!(explanation.extract, "\"mystery\" by A, B (Unknown year).");
    }

    #[tokio::test]
    async fn test_no_docs() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search.json");
                then.status(200).json_body(json!({ "docs": [] }));
            })
            .await;

        let source = OpenLibrarySource::new(test_support::context(&server.base_url()));
        let explanation = source.fetch("zzz").await;
        assert_eq!(explanation.extract, "No books or authors found for \"zzz\" in Open Library.");
        assert_eq!(explanation.url.as_deref(), Some("https://openlibrary.org/search?q=zzz"));
    }

    #[tokio::test]
    async fn test_failures() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search.json");
                then.status(502);
            })
            .await;

        let source = OpenLibrarySource::new(test_support::context(&server.base_url()));
        assert_eq!(source.fetch("zzz").await.extract, "No Open Library results found for \"zzz\".");

        let source = OpenLibrarySource::new(test_support::unreachable());
        assert_eq!(source.fetch("zzz").await.extract, "Error fetching Open Library data for \"zzz\".");
    }
}
