use serde::{Deserialize, Serialize};

/// One entry of the resume example index. Optional fields are simply skipped when scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeExample {
    pub filename: String,
    pub title: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub domain: Vec<String>,
}

/// Outcome of scoring a query against the corpus.
/// `example` is `None` when the best score falls below the acceptance threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    pub example: Option<&'a ResumeExample>,
    pub score: f64,
}
