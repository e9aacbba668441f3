//! Daily-focus suggestion engine.
//!
//! The caller-visible contract never fails: either the completion service
//! answers with the required JSON shape, or the engine derives a
//! recommendation from a fixed priority of rules. No retries; one failed
//! call falls through to the heuristic once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use tasks::contract::model::{Priority, Task};

use crate::contract::model::{Suggestion, SuggestionSource};
use crate::domain::ports::CompletionPort;

const OVERDUE_REASONING: &str = "Overdue tasks should be prioritized to prevent further delays.";
const HIGH_PRIORITY_REASONING: &str = "High-priority tasks have the most impact on your goals.";
const MOMENTUM_REASONING: &str = "Beginning with your next scheduled task maintains good momentum.";

#[derive(Clone)]
pub struct SuggestionEngine {
    completion: Arc<dyn CompletionPort>,
}

/// The exact reply shape the service is instructed to produce.
#[derive(Debug, Deserialize)]
struct ModelReply {
    suggestion: String,
    reasoning: String,
}

/// Per-task slice embedded in the prompt: title, priority, and the due date
/// as a plain calendar date.
#[derive(Serialize)]
struct TaskBrief<'a> {
    title: &'a str,
    priority: &'a str,
    #[serde(rename = "dueDate")]
    due_date: String,
}

impl SuggestionEngine {
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    /// Recommend what to work on, given the caller's current tasks.
    ///
    /// `now` is explicit so the overdue rule is deterministic under test.
    /// Input order is preserved throughout; the snapshot feeding this is
    /// due-date-ordered, which makes the non-overdue rules pick the
    /// earliest-due match.
    #[instrument(name = "assistant.engine.suggest", skip_all, fields(task_count = tasks.len()))]
    pub async fn suggest(&self, tasks: &[Task], now: DateTime<Utc>) -> Suggestion {
        let incomplete: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();

        if incomplete.is_empty() {
            debug!("no incomplete tasks, skipping completion call");
            return Suggestion::all_complete();
        }

        let prompt = build_prompt(&incomplete);
        match self.completion.complete(&prompt).await {
            Ok(content) => match serde_json::from_str::<ModelReply>(content.trim()) {
                Ok(reply) => {
                    return Suggestion {
                        suggestion: reply.suggestion,
                        reasoning: reply.reasoning,
                        source: SuggestionSource::Model,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "completion reply was not the required JSON shape, falling back");
                }
            },
            Err(e) => {
                warn!(error = %e, "completion call failed, falling back");
            }
        }

        fallback(&incomplete, now)
    }
}

/// Build the prompt sent to the completion service.
pub fn build_prompt(incomplete: &[&Task]) -> String {
    let briefs: Vec<TaskBrief<'_>> = incomplete
        .iter()
        .map(|t| TaskBrief {
            title: &t.title,
            priority: t.priority.as_str(),
            due_date: t.due_date.format("%Y-%m-%d").to_string(),
        })
        .collect();

    // serializing a vec of string fields cannot fail
    let summary = serde_json::to_string_pretty(&briefs).unwrap_or_default();

    format!(
        "Based on these tasks, what should I focus on today? Please provide a specific recommendation and brief reasoning.\n\n\
         Tasks:\n{summary}\n\n\
         Please respond in this exact JSON format:\n\
         {{\n  \"suggestion\": \"Your specific recommendation here\",\n  \"reasoning\": \"Brief explanation of why this is the best focus\"\n}}"
    )
}

/// Rule-based recommendation, first matching rule wins:
/// overdue → high priority → next scheduled → all complete.
fn fallback(incomplete: &[&Task], now: DateTime<Utc>) -> Suggestion {
    if let Some(overdue) = incomplete.iter().find(|t| t.due_date < now) {
        return Suggestion {
            suggestion: format!(
                "Focus on completing your overdue task: \"{}\"",
                overdue.title
            ),
            reasoning: OVERDUE_REASONING.to_string(),
            source: SuggestionSource::Fallback,
        };
    }

    if let Some(high) = incomplete.iter().find(|t| t.priority == Priority::High) {
        return Suggestion {
            suggestion: format!("Focus on your high-priority task: \"{}\"", high.title),
            reasoning: HIGH_PRIORITY_REASONING.to_string(),
            source: SuggestionSource::Fallback,
        };
    }

    if let Some(first) = incomplete.first() {
        return Suggestion {
            suggestion: format!("Start with: \"{}\"", first.title),
            reasoning: MOMENTUM_REASONING.to_string(),
            source: SuggestionSource::Fallback,
        };
    }

    Suggestion::all_complete()
}
