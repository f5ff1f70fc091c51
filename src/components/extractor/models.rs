use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// Most suggestions of one kind handed to the host
pub const MAX_SUGGESTIONS: usize = 5;

/// A candidate start/end pair found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeSuggestion {
    pub start: String,
    pub end: Option<String>,
    pub label: String,
    /// The page gave calendar dates without a time of day
    #[serde(default)]
    pub date_only: bool,
}

impl DateTimeSuggestion {
    /// Identity used for de-duplication: `start|end`
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.start, self.end.as_deref().unwrap_or(""))
    }
}

/// A candidate description text and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionSuggestion {
    pub text: String,
    pub source: String,
}

/// A candidate event title and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleSuggestion {
    pub text: String,
    pub source: String,
}

/// How the host identifies the anchor of the user's text selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selection {
    /// Selected text; the anchor is the deepest element containing it
    Quote(String),
    /// CSS selector of the anchor element
    Selector(String),
}

/// Request sent across the page boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractionRequest {
    Dates,
    Descriptions,
    Titles,
    SelectionContext { selection: Selection },
}

/// Response returned across the page boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "items", rename_all = "snake_case")]
pub enum ExtractionResponse {
    Dates(Vec<DateTimeSuggestion>),
    Descriptions(Vec<DescriptionSuggestion>),
    Titles(Vec<TitleSuggestion>),
    SelectionContext(Option<String>),
}

/// Outcome of reading one candidate from one source
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate<T> {
    Found(T),
    Skipped { source: &'static str, reason: String },
}

impl<T> Candidate<T> {
    pub fn skipped(source: &'static str, reason: impl Into<String>) -> Self {
        Candidate::Skipped {
            source,
            reason: reason.into(),
        }
    }
}

/// Keep the found values, logging why the rest were dropped
pub fn collect_found<T>(candidates: Vec<Candidate<T>>) -> Vec<T> {
    candidates
        .into_iter()
        .filter_map(|candidate| match candidate {
            Candidate::Found(value) => Some(value),
            Candidate::Skipped { source, reason } => {
                debug!("Skipped {} candidate: {}", source, reason);
                None
            }
        })
        .collect()
}

/// Drop later duplicates by `key`, keeping first-seen order, then cap at `limit`
pub fn dedup_capped<T, K, F>(items: Vec<T>, key: F, limit: usize) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .take(limit)
        .collect()
}
