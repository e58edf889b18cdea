//! Source router
//!
//! Every reference provider implements [`ExplanationSource`] and is registered
//! in a lookup table keyed by [`SourceId`]. Strategies never fail outward:
//! network errors, non-success statuses and missing fields all become a
//! fallback [`Explanation`] with prose describing what went wrong.

pub mod wikipedia;
pub mod wikidata;
pub mod dbpedia;
pub mod dictionary;
pub mod wiktionary;
pub mod openlibrary;
pub mod trivia;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::shared::error::AppResult;
use crate::shared::settings::NetworkSettings;
use crate::shared::types::{Explanation, SourceId};

pub use dbpedia::DbpediaSource;
pub use dictionary::DictionarySource;
pub use openlibrary::OpenLibrarySource;
pub use trivia::TriviaSource;
pub use wikidata::WikidataSource;
pub use wikipedia::WikipediaSource;
pub use wiktionary::WiktionarySource;

/// One reference provider.
#[async_trait]
pub trait ExplanationSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Always resolves to a well-formed explanation.
    async fn fetch(&self, query: &str) -> Explanation;
}

/// API base URLs. Human-facing "read more" links are fixed per provider and
/// do not follow these.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub wikipedia: String,
    pub wikidata: String,
    pub dbpedia: String,
    pub dictionary: String,
    pub wiktionary: String,
    pub openlibrary: String,
    pub numbers: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            wikipedia: "https://en.wikipedia.org".to_string(),
            wikidata: "https://www.wikidata.org".to_string(),
            dbpedia: "https://dbpedia.org".to_string(),
            dictionary: "https://api.dictionaryapi.dev".to_string(),
            wiktionary: "https://en.wiktionary.org".to_string(),
            openlibrary: "https://openlibrary.org".to_string(),
            numbers: "http://numbersapi.com".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every provider at the same base URL.
    pub fn uniform(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            wikipedia: base.clone(),
            wikidata: base.clone(),
            dbpedia: base.clone(),
            dictionary: base.clone(),
            wiktionary: base.clone(),
            openlibrary: base.clone(),
            numbers: base,
        }
    }
}

/// Pooled HTTP client plus the endpoints it talks to.
#[derive(Clone)]
pub struct HttpContext {
    client: Client,
    endpoints: Arc<Endpoints>,
}

impl HttpContext {
    pub fn new(settings: &NetworkSettings, endpoints: Endpoints) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoints: Arc::new(endpoints),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET a JSON document. `Ok(None)` means the provider answered with a
    /// non-success status.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<Option<T>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "provider returned non-success status");
            return Ok(None);
        }

        Ok(Some(response.json::<T>().await?))
    }

    /// GET a plain-text body, same status convention as [`Self::get_json`].
    pub async fn get_text(&self, url: &str) -> AppResult<Option<String>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "provider returned non-success status");
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

/// Percent-encode a query for embedding in a URL path or query string.
pub(crate) fn encode(query: &str) -> String {
    urlencoding::encode(query).into_owned()
}

/// Treat blank strings like missing fields.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct SourceRouter {
    table: HashMap<SourceId, Arc<dyn ExplanationSource>>,
}

impl SourceRouter {
    /// Router with all built-in providers. `auto` is an alias for Wikipedia.
    pub fn new(http: HttpContext) -> Self {
        let wikipedia: Arc<dyn ExplanationSource> = Arc::new(WikipediaSource::new(http.clone()));

        let mut table: HashMap<SourceId, Arc<dyn ExplanationSource>> = HashMap::new();
        table.insert(SourceId::Auto, wikipedia.clone());
        table.insert(SourceId::Wikipedia, wikipedia);
        table.insert(SourceId::Wikidata, Arc::new(WikidataSource::new(http.clone())));
        table.insert(SourceId::Dbpedia, Arc::new(DbpediaSource::new(http.clone())));
        table.insert(SourceId::Dictionary, Arc::new(DictionarySource::new(http.clone())));
        table.insert(SourceId::Wiktionary, Arc::new(WiktionarySource::new(http.clone())));
        table.insert(SourceId::Openlibrary, Arc::new(OpenLibrarySource::new(http.clone())));
        table.insert(SourceId::Trivia, Arc::new(TriviaSource::new(http)));

        Self { table }
    }

    /// Replace or add the provider behind `id`.
    pub fn with_source(mut self, id: SourceId, source: Arc<dyn ExplanationSource>) -> Self {
        self.table.insert(id, source);
        self
    }

    /// Provider that serves `id`; unknown ids fall back to the `auto` entry.
    pub fn resolve(&self, id: SourceId) -> Option<&Arc<dyn ExplanationSource>> {
        self.table.get(&id).or_else(|| self.table.get(&SourceId::Auto))
    }

    pub async fn fetch(&self, source: SourceId, query: &str) -> Explanation {
        let Some(provider) = self.resolve(source) else {
            tracing::warn!(%source, "no explanation source registered");
            return Explanation::failed(
                format!("No explanation source available for \"{}\".", query),
                None,
                query,
            );
        };

        tracing::debug!(requested = %source, provider = %provider.id(), query, "fetching explanation");
        let explanation = provider.fetch(query).await;

        if explanation.extract.trim().is_empty() {
            return Explanation::not_found(
                format!("No explanation available for \"{}\".", query),
                explanation.url,
                explanation.title,
            );
        }

        tracing::debug!(provider = %provider.id(), outcome = ?explanation.outcome, "explanation ready");
        explanation
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn context(base: &str) -> HttpContext {
        HttpContext::new(&NetworkSettings::default(), Endpoints::uniform(base)).unwrap()
    }

    /// Endpoints nothing listens on, for exercising transport failures.
    pub fn unreachable() -> HttpContext {
        context("http://127.0.0.1:9")
    }
}
