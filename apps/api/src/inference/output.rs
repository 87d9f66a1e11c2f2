//! Decoding of the `output` field of a completed job.
//!
//! The queue returns generated text in several shapes depending on the worker image.
//! Each shape is its own variant with its own decoder.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JobOutput {
    /// Plain generated text.
    Text(String),
    /// `{"text": ...}`, falling back to `{"output": ...}`.
    Record(Map<String, Value>),
    /// Batched results; only the first element is used.
    List(Vec<Value>),
    /// Anything else (numbers, booleans). Never carries usable text.
    Other(Value),
}

impl JobOutput {
    /// Extracted text, untrimmed. Empty when the shape carries nothing usable.
    pub fn text(&self) -> String {
        match self {
            JobOutput::Text(text) => text.clone(),
            JobOutput::Record(record) => record_text(record),
            JobOutput::List(items) => list_text(items),
            JobOutput::Other(_) => String::new(),
        }
    }
}

fn record_text(record: &Map<String, Value>) -> String {
    if let Some(text) = record.get("text").and_then(Value::as_str) {
        if !text.is_empty() {
            return text.to_string();
        }
    }

    match record.get("output") {
        Some(Value::Null) | None => String::new(),
        Some(nested) => serde_json::from_value::<JobOutput>(nested.clone())
            .map(|output| output.text())
            .unwrap_or_default(),
    }
}

fn list_text(items: &[Value]) -> String {
    let Some(first) = items.first() else {
        return String::new();
    };

    if let Some(tokens) = token_list(first) {
        return tokens.concat();
    }

    match first {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Finds a list of string tokens in either a bare array or the
/// `{"choices": [{"tokens": [...]}]}` / `{"tokens": [...]}` wrappers.
fn token_list(value: &Value) -> Option<Vec<&str>> {
    let tokens = match value {
        Value::Array(_) => value,
        Value::Object(record) => record
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("tokens"))
            .or_else(|| record.get("tokens"))?,
        _ => return None,
    };

    tokens
        .as_array()?
        .iter()
        .map(Value::as_str)
        .collect::<Option<Vec<&str>>>()
}
