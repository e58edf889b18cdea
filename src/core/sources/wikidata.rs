use async_trait::async_trait;
use serde::Deserialize;

use super::{encode, non_empty, ExplanationSource, HttpContext};
use crate::shared::types::{Explanation, SourceId};

const ENTITY_BASE: &str = "https://www.wikidata.org/wiki/";
const MAX_ALIASES: usize = 3;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    search: Vec<EntityHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EntityHit {
    id: String,
    label: Option<String>,
    description: Option<String>,
    aliases: Vec<String>,
}

/// Key facts for the first entity whose label matches the query.
pub struct WikidataSource {
    http: HttpContext,
}

impl WikidataSource {
    pub fn new(http: HttpContext) -> Self {
        Self { http }
    }
}

fn search_page(query: &str) -> Option<String> {
    Some(format!("{}Special:Search?search={}", ENTITY_BASE, encode(query)))
}

fn compose(hit: EntityHit, query: &str) -> Explanation {
    let label = non_empty(hit.label).unwrap_or_else(|| query.to_string());
    let description = non_empty(hit.description).unwrap_or_else(|| "No description available.".to_string());

    let mut extract = format!("{}: {}", label, description);
    if !hit.aliases.is_empty() {
        let aliases: Vec<&str> = hit.aliases.iter().take(MAX_ALIASES).map(String::as_str).collect();
        extract.push_str(&format!(" Also known as: {}.", aliases.join(", ")));
    }

    Explanation::found(extract, Some(format!("{}{}", ENTITY_BASE, hit.id)), label)
}

#[async_trait]
impl ExplanationSource for WikidataSource {
    fn id(&self) -> SourceId {
        SourceId::Wikidata
    }

    async fn fetch(&self, query: &str) -> Explanation {
        let url = format!(
            "{}/w/api.php?action=wbsearchentities&search={}&language=en&format=json&origin=*",
            self.http.endpoints().wikidata,
            encode(query)
        );
        let not_found = || {
            Explanation::not_found(
                format!("No Wikidata entity found for \"{}\".", query),
                search_page(query),
                query,
            )
        };

        match self.http.get_json::<SearchResponse>(&url).await {
            Ok(Some(response)) => match response.search.into_iter().next() {
                Some(hit) => compose(hit, query),
                None => not_found(),
            },
            Ok(None) => not_found(),
            Err(e) => {
                tracing::warn!(query, error = %e, "Wikidata request failed");
                Explanation::failed(
                    format!("Error fetching Wikidata for \"{}\".", query),
                    search_page(query),
                    query,
                )
            }
        }
    }
}
