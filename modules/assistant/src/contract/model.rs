use serde::{Deserialize, Serialize};

/// Where a suggestion came from. The degraded path is a first-class,
/// observable branch, not an exception handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// Produced by the external completion service.
    Model,
    /// Produced by the local heuristic (or the fixed all-complete result).
    Fallback,
}

/// Ephemeral recommendation of what to work on. Computed fresh per request,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion: String,
    pub reasoning: String,
    pub source: SuggestionSource,
}

impl Suggestion {
    /// Fixed result for an empty incomplete-task set.
    pub fn all_complete() -> Self {
        Self {
            suggestion: "Great job! All your tasks are complete.".to_string(),
            reasoning: "Consider planning new tasks or take a well-deserved break.".to_string(),
            source: SuggestionSource::Fallback,
        }
    }
}
