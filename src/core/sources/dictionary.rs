use async_trait::async_trait;
use serde::Deserialize;

use super::{encode, non_empty, ExplanationSource, HttpContext};
use crate::shared::types::{Explanation, SourceId};

const LOOKUP_BASE: &str = "https://www.merriam-webster.com/dictionary/";

// -- Serde structs for the Free Dictionary API --

#[derive(Debug, Deserialize)]
pub struct FreeDictEntry {
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Deserialize)]
pub struct Meaning {
    #[serde(rename = "partOfSpeech", default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<DefinitionDetail>,
}

#[derive(Debug, Deserialize)]
pub struct DefinitionDetail {
    #[serde(default)]
    pub definition: String,
    pub example: Option<String>,
}

/// First definition of the word from the Free Dictionary API.
pub struct DictionarySource {
    http: HttpContext,
}

impl DictionarySource {
    pub fn new(http: HttpContext) -> Self {
        Self { http }
    }
}

fn compose(query: &str, meaning: &Meaning) -> String {
    let first = meaning.definitions.first();
    let definition = non_empty(first.map(|d| d.definition.clone()))
        .unwrap_or_else(|| "No definition available.".to_string());

    let mut extract = format!("{} ({}): {}", query, meaning.part_of_speech, definition);
    if let Some(example) = non_empty(first.and_then(|d| d.example.clone())) {
        extract.push_str(&format!(" Example: \"{}\"", example));
    }
    extract
}

#[async_trait]
impl ExplanationSource for DictionarySource {
    fn id(&self) -> SourceId {
        SourceId::Dictionary
    }

    async fn fetch(&self, query: &str) -> Explanation {
        let url = format!(
            "{}/api/v2/entries/en/{}",
            self.http.endpoints().dictionary,
            encode(query)
        );
        let lookup = Some(format!("{}{}", LOOKUP_BASE, encode(query)));

        match self.http.get_json::<Vec<FreeDictEntry>>(&url).await {
            Ok(Some(entries)) => {
                let meaning = entries.first().and_then(|entry| entry.meanings.first());
                match meaning {
                    Some(meaning) => Explanation::found(compose(query, meaning), lookup, query),
                    None => Explanation::not_found(
                        format!("No definition available for \"{}\".", query),
                        lookup,
                        query,
                    ),
                }
            }
            Ok(None) => Explanation::not_found(
                format!("No dictionary definition found for \"{}\".", query),
                lookup,
                query,
            ),
            Err(e) => {
                tracing::warn!(query, error = %e, "Dictionary API request failed");
                Explanation::failed(
                    format!("Error fetching dictionary data for \"{}\".", query),
                    lookup,
                    query,
                )
            }
        }
    }
}
