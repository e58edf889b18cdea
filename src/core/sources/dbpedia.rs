use async_trait::async_trait;
use serde_json::Value;

use super::{encode, ExplanationSource, HttpContext};
use crate::shared::types::{Explanation, SourceId};

const PAGE_BASE: &str = "https://dbpedia.org/page/";
const RESOURCE_BASE: &str = "http://dbpedia.org/resource/";
const ABSTRACT: &str = "http://dbpedia.org/ontology/abstract";
const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

/// Linked-data abstract for the resource named by the query.
pub struct DbpediaSource {
    http: HttpContext,
}

impl DbpediaSource {
    pub fn new(http: HttpContext) -> Self {
        Self { http }
    }
}

/// DBpedia resource names use underscores for whitespace.
fn resource_name(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join("_")
}

/// The English literal of `predicate`, if the resource has one.
fn english_literal<'a>(resource: &'a Value, predicate: &str) -> Option<&'a str> {
    resource
        .get(predicate)?
        .as_array()?
        .iter()
        .find(|item| item.get("lang").and_then(Value::as_str) == Some("en"))?
        .get("value")?
        .as_str()
        .filter(|value| !value.trim().is_empty())
}

#[async_trait]
impl ExplanationSource for DbpediaSource {
    fn id(&self) -> SourceId {
        SourceId::Dbpedia
    }

    async fn fetch(&self, query: &str) -> Explanation {
        let resource = resource_name(query);
        let url = format!("{}/data/{}.json", self.http.endpoints().dbpedia, encode(&resource));
        let page = Some(format!("{}{}", PAGE_BASE, encode(&resource)));

        match self.http.get_json::<Value>(&url).await {
            Ok(Some(data)) => {
                let key = format!("{}{}", RESOURCE_BASE, resource);
                let text = data.get(&key).and_then(|entry| {
                    english_literal(entry, ABSTRACT).or_else(|| english_literal(entry, COMMENT))
                });

                match text {
                    Some(text) => Explanation::found(text, page, query),
                    None => Explanation::not_found(
                        format!("No abstract available for \"{}\" in DBpedia.", query),
                        page,
                        query,
                    ),
                }
            }
            Ok(None) => Explanation::not_found(
                format!("No DBpedia resource found for \"{}\".", query),
                page,
                query,
            ),
            Err(e) => {
                tracing::warn!(query, error = %e, "DBpedia request failed");
                Explanation::failed(format!("Error fetching DBpedia data for \"{}\".", query), page, query)
            }
        }
    }
}
