use async_trait::async_trait;

use super::wikipedia::PageSummary;
use super::{encode, non_empty, ExplanationSource, HttpContext};
use crate::shared::types::{Explanation, SourceId};

const ENTRY_BASE: &str = "https://en.wiktionary.org/wiki/";

/// Language-origin definition from the Wiktionary REST summary endpoint.
pub struct WiktionarySource {
    http: HttpContext,
}

impl WiktionarySource {
    pub fn new(http: HttpContext) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ExplanationSource for WiktionarySource {
    fn id(&self) -> SourceId {
        SourceId::Wiktionary
    }

    async fn fetch(&self, query: &str) -> Explanation {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.http.endpoints().wiktionary,
            encode(query)
        );
        let entry = format!("{}{}", ENTRY_BASE, encode(query));

        match self.http.get_json::<PageSummary>(&url).await {
            Ok(Some(summary)) => {
                let page = summary.desktop_page().unwrap_or(entry);
                let title = non_empty(summary.title).unwrap_or_else(|| query.to_string());
                let extract = non_empty(summary.extract)
                    .unwrap_or_else(|| format!("No definition available for \"{}\".", query));
                Explanation::found(extract, Some(page), title)
            }
            Ok(None) => Explanation::not_found(
                format!("No Wiktionary entry found for \"{}\".", query),
                Some(entry),
                query,
            ),
            Err(e) => {
                tracing::warn!(query, error = %e, "Wiktionary request failed");
                Explanation::failed(
                    format!("Error fetching Wiktionary data for \"{}\".", query),
                    Some(entry),
                    query,
                )
            }
        }
    }
}
