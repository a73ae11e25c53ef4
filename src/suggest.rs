//! Completion service protocol.
//!
//! A lookup is two HTTP calls: a `POST` that queues the job and returns an
//! `event_id`, then a `GET` on that id whose server-sent-events body carries
//! the candidates on a `data:` line.

use cg_ui::{SuggestionItem, SuggestionRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::SUGGEST_CALL_PATH;

/// Completion lookup failures.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("{stage} request failed with status {status}")]
    Http { stage: &'static str, status: u16 },

    #[error("request failed: {0}")]
    Network(String),

    #[error("no event_id in response")]
    MissingEventId,

    #[error("no data line in response")]
    NoDataLine,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Issues lookups and reports the result back to
/// [`crate::app::Frontend::on_suggestions`].
pub trait SuggestionService {
    fn request(&self, input: &str, request: SuggestionRequest);
}

#[derive(Serialize)]
struct CallBody<'a> {
    fn_index: u32,
    data: [&'a str; 1],
}

#[derive(Deserialize)]
struct CallResponse {
    event_id: Option<String>,
}

/// URL of the queueing call.
pub fn call_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), SUGGEST_CALL_PATH)
}

/// URL of the result stream for `event_id`.
pub fn result_url(base_url: &str, event_id: &str) -> String {
    format!("{}/{}", call_url(base_url), event_id)
}

/// JSON body of the queueing call.
pub fn request_body(word: &str) -> Result<String, SuggestError> {
    Ok(serde_json::to_string(&CallBody {
        fn_index: 0,
        data: [word],
    })?)
}

/// Extract the `event_id` from the queueing call's response.
pub fn parse_event_id(body: &str) -> Result<String, SuggestError> {
    let response: CallResponse = serde_json::from_str(body)?;
    response
        .event_id
        .filter(|id| !id.is_empty())
        .ok_or(SuggestError::MissingEventId)
}

/// Extract the candidate list from the result stream.
///
/// The last `data:` line holds a JSON array whose first element is the list;
/// each candidate is an array whose first element is the display markup.
pub fn parse_candidates(body: &str) -> Result<Vec<SuggestionItem>, SuggestError> {
    let line = body
        .lines()
        .rev()
        .find(|line| line.starts_with("data:"))
        .ok_or(SuggestError::NoDataLine)?;
    let payload: Value = serde_json::from_str(line["data:".len()..].trim())?;

    let Some(candidates) = payload.get(0).and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut items = Vec::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        match candidate.get(0).and_then(Value::as_str) {
            Some(markup) => items.push(SuggestionItem::from_markup(markup)),
            None => log::warn!("[suggest] invalid candidate at {}: {}", index, candidate),
        }
    }
    Ok(items)
}
