use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{Suggestion, SuggestionSource};

/// REST DTO for the daily-focus suggestion
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuggestionDto {
    pub suggestion: String,
    pub reasoning: String,
    /// "model" when the completion service answered, "fallback" otherwise.
    pub source: String,
}

impl From<Suggestion> for SuggestionDto {
    fn from(s: Suggestion) -> Self {
        let source = match s.source {
            SuggestionSource::Model => "model",
            SuggestionSource::Fallback => "fallback",
        };
        Self {
            suggestion: s.suggestion,
            reasoning: s.reasoning,
            source: source.to_string(),
        }
    }
}
