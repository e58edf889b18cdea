use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use super::wikipedia::WikipediaSource;
use super::{encode, non_empty, ExplanationSource, HttpContext};
use crate::shared::types::{Explanation, ExplanationOutcome, SourceId};

const NUMBERS_PAGE: &str = "http://numbersapi.com/";

static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

/// First run of ASCII digits in the query.
fn digit_run(query: &str) -> Option<&str> {
    let re = DIGIT_RUN.get_or_init(|| Regex::new(r"[0-9]+").unwrap());
    re.find(query).map(|m| m.as_str())
}

/// Number facts for numeric selections, encyclopedia summaries otherwise.
pub struct TriviaSource {
    http: HttpContext,
    wikipedia: WikipediaSource,
}

impl TriviaSource {
    pub fn new(http: HttpContext) -> Self {
        let wikipedia = WikipediaSource::new(http.clone());
        Self { http, wikipedia }
    }

    async fn number_fact(&self, number: &str) -> Option<Explanation> {
        let url = format!("{}/{}/trivia", self.http.endpoints().numbers, number);

        match self.http.get_text(&url).await {
            Ok(Some(body)) => non_empty(Some(body)).map(|fact| {
                Explanation::found(fact, Some(format!("{}{}", NUMBERS_PAGE, number)), number)
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(number, error = %e, "numbers API request failed, falling back");
                None
            }
        }
    }
}

#[async_trait]
impl ExplanationSource for TriviaSource {
    fn id(&self) -> SourceId {
        SourceId::Trivia
    }

    async fn fetch(&self, query: &str) -> Explanation {
        if let Some(number) = digit_run(query) {
            if let Some(fact) = self.number_fact(number).await {
                return fact;
            }
        }

        let summary = self.wikipedia.fetch(query).await;
        if summary.outcome != ExplanationOutcome::NotFound {
            return summary;
        }

        Explanation::not_found(
            format!("No trivia available for \"{}\". Try a number or notable topic.", query),
            Some(format!("https://www.google.com/search?q={}+fun+facts", encode(query))),
            query,
        )
    }
}
