//! Shared domain models.

/// Category label assigned to questions that arrive without one.
pub const DEFAULT_CATEGORY: &str = "General Knowledge";

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Question text shown to the players.
    pub text: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Zero-based index of the correct entry in `options`.
    pub correct_index: usize,
    /// Category label used to group questions.
    pub category: String,
}

impl Question {
    /// Text of the correct answer.
    ///
    /// Always present for questions produced by the repository, which rejects
    /// records whose index falls outside their options.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// A registered contestant and their running score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Display name as entered at registration.
    pub name: String,
    /// Points collected so far.
    pub score: u32,
}

impl Player {
    /// Create a player with a zero score.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
        }
    }

    /// Create a player with an explicit score.
    pub fn with_score(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}
