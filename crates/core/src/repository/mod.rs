//! Question dataset loading and normalisation.

/// Source resolution, fetching and parsing of question datasets.
pub mod loader;

pub use loader::{list_categories, parse_questions, LoadError, QuestionRepository, QuestionSource};
