pub mod model;

pub use model::{Suggestion, SuggestionSource};
