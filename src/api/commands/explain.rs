//! Explain command module
//!
//! Runs a piece of text through the same validation a selection gets, then
//! fetches it from the stored (or overridden) source.

use serde::Serialize;
use tokio::time::Instant;

use crate::api::{AppState, CommandResult};
use crate::core::popup::truncate;
use crate::core::selection::{DismissReason, SelectionMonitor, SelectionOutcome, TextSelection};
use crate::shared::types::{Explanation, SourceId};
use crate::shared::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct ExplainOutput {
    pub query: String,
    pub source: SourceId,
    pub explanation: Explanation,
}

pub async fn explain_text(state: &AppState, text: &str, source: Option<SourceId>) -> CommandResult<ExplainOutput> {
    let mut monitor = SelectionMonitor::new(state.settings.selection.clone());
    let query = match monitor.evaluate_from(&TextSelection(text.to_string()), Instant::now()) {
        SelectionOutcome::Accepted { query, .. } => query,
        SelectionOutcome::Dismiss(DismissReason::TooLong { words, chars }) => {
            return Err(AppError::Validation(format!(
                "Text is too long to explain ({} words, {} characters; limit {} words, {} characters)",
                words, chars, state.settings.selection.max_words, state.settings.selection.max_chars
            )));
        }
        _ => return Err(AppError::Validation("Nothing to explain".to_string())),
    };

    let source = source.unwrap_or_else(|| state.prefs.source());
    let mut explanation = state.router.fetch(source, &query).await;
    explanation.extract = truncate(&explanation.extract, state.settings.popup.truncate_len);

    Ok(ExplainOutput {
        query,
        source,
        explanation,
    })
}
