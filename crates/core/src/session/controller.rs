use thiserror::Error;
use tracing::{debug, info};

use crate::models::Question;

use super::random::{RandomSource, ThreadRandom};

/// Recoverable outcomes of session navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no category has been selected")]
    NoActiveSession,
    #[error("no questions in category '{0}'")]
    UnknownCategory(String),
    #[error("all questions in '{category}' have been asked")]
    Exhausted { category: String },
    #[error("there is no previous question")]
    NoPreviousQuestion,
}

/// Pool and navigation state for the category currently being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    category: String,
    master: Vec<Question>,
    // Positions into `master` not drawn yet, in master order.
    available: Vec<usize>,
    history: Vec<usize>,
}

impl SessionState {
    fn new(category: &str, master: Vec<Question>) -> Self {
        let available = (0..master.len()).collect();
        Self {
            category: category.to_string(),
            master,
            available,
            history: Vec::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn master_list(&self) -> &[Question] {
        &self.master
    }

    /// Master-list positions that can still be drawn.
    pub fn available(&self) -> &[usize] {
        &self.available
    }

    /// Master-list positions in the order they were shown.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    fn current(&self) -> Option<&Question> {
        self.history
            .last()
            .and_then(|position| self.master.get(*position))
    }
}

/// Draws questions without replacement and replays already-seen ones.
#[derive(Debug, Clone)]
pub struct SessionController<R = ThreadRandom> {
    random: R,
    state: Option<SessionState>,
}

impl Default for SessionController<ThreadRandom> {
    fn default() -> Self {
        Self::new(ThreadRandom::new())
    }
}

impl<R: RandomSource> SessionController<R> {
    pub fn new(random: R) -> Self {
        Self {
            random,
            state: None,
        }
    }

    /// Start a session over every question whose category equals `category`.
    ///
    /// Returns the number of questions in the new session. Any previous
    /// session is discarded, including its history.
    pub fn select_category(
        &mut self,
        category: &str,
        all_questions: &[Question],
    ) -> Result<usize, SessionError> {
        let master: Vec<Question> = all_questions
            .iter()
            .filter(|question| question.category == category)
            .cloned()
            .collect();
        if master.is_empty() {
            return Err(SessionError::UnknownCategory(category.to_string()));
        }

        let total = master.len();
        self.state = Some(SessionState::new(category, master));
        info!(category, total, "Category session started");
        Ok(total)
    }

    /// Draw an unseen question at random and make it current.
    pub fn draw_next(&mut self) -> Result<&Question, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveSession)?;
        if state.available.is_empty() {
            info!(category = %state.category, "Category exhausted");
            return Err(SessionError::Exhausted {
                category: state.category.clone(),
            });
        }

        let pick = self.random.index_below(state.available.len());
        let position = state.available.remove(pick);
        state.history.push(position);
        debug!(position, remaining = state.available.len(), "Question drawn");
        Ok(&state.master[position])
    }

    /// Step back to the question shown before the current one.
    ///
    /// Nothing is returned to the pool, and a later [`draw_next`] keeps
    /// drawing unseen questions rather than redoing the step.
    ///
    /// [`draw_next`]: Self::draw_next
    pub fn go_to_previous(&mut self) -> Result<&Question, SessionError> {
        let state = self.state.as_mut().ok_or(SessionError::NoActiveSession)?;
        if state.history.len() < 2 {
            return Err(SessionError::NoPreviousQuestion);
        }

        state.history.pop();
        let position = state.history[state.history.len() - 1];
        Ok(&state.master[position])
    }

    /// Question currently on display, if any.
    pub fn current(&self) -> Option<&Question> {
        self.state.as_ref().and_then(SessionState::current)
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.state.as_ref().map(SessionState::category)
    }

    pub fn remaining(&self) -> usize {
        self.state
            .as_ref()
            .map(|state| state.available.len())
            .unwrap_or(0)
    }

    pub fn history_len(&self) -> usize {
        self.state
            .as_ref()
            .map(|state| state.history.len())
            .unwrap_or(0)
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    /// Drop the active session.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::random::ScriptedRandom;
    use std::collections::HashSet;

    fn question(text: &str, category: &str) -> Question {
        Question {
            text: text.to_string(),
            options: vec!["yes".to_string(), "no".to_string()],
            correct_index: 0,
            category: category.to_string(),
        }
    }

    fn dataset() -> Vec<Question> {
        vec![
            question("h1", "History"),
            question("s1", "Science"),
            question("h2", "History"),
            question("h3", "History"),
            question("s2", "Science"),
            question("h4", "History"),
            question("h5", "History"),
        ]
    }

    fn history_session(picks: Vec<usize>) -> SessionController<ScriptedRandom> {
        let mut controller = SessionController::new(ScriptedRandom::new(picks));
        controller
            .select_category("History", &dataset())
            .expect("history exists");
        controller
    }

    #[test]
    fn select_category_filters_exact_matches() {
        let mut controller = SessionController::new(ScriptedRandom::default());
        assert_eq!(controller.select_category("History", &dataset()), Ok(5));

        let state = controller.state().expect("session");
        assert_eq!(state.category(), "History");
        assert!(state
            .master_list()
            .iter()
            .all(|question| question.category == "History"));
        assert_eq!(state.available().len(), 5);
        assert!(state.history().is_empty());
        assert_eq!(controller.current(), None);
    }

    #[test]
    fn unknown_category_leaves_previous_session_untouched() {
        let mut controller = history_session(vec![0]);
        controller.draw_next().expect("draw");
        assert_eq!(
            controller.select_category("history", &dataset()),
            Err(SessionError::UnknownCategory("history".to_string()))
        );
        assert_eq!(controller.selected_category(), Some("History"));
        assert_eq!(controller.history_len(), 1);
    }

    #[test]
    fn draws_without_repeats_until_exhausted() {
        let mut controller = history_session(vec![3, 1, 4, 1, 5, 9, 2, 6]);
        let mut seen = HashSet::new();

        for drawn in 1..=5 {
            let text = controller.draw_next().expect("unseen question").text.clone();
            assert!(seen.insert(text), "question repeated");
            assert_eq!(controller.history_len(), drawn);
        }

        let state = controller.state().expect("session");
        let positions: HashSet<_> = state.history().iter().copied().collect();
        assert_eq!(positions.len(), 5);
        assert!(state.available().is_empty());

        assert_eq!(
            controller.draw_next(),
            Err(SessionError::Exhausted {
                category: "History".to_string()
            })
        );
        assert_eq!(controller.history_len(), 5);
    }

    #[test]
    fn seeded_runs_never_repeat() {
        for seed in 0..20 {
            let mut controller = SessionController::new(ThreadRandom::seeded(seed));
            controller
                .select_category("History", &dataset())
                .expect("history exists");
            let mut texts = HashSet::new();
            while let Ok(question) = controller.draw_next() {
                assert!(texts.insert(question.text.clone()));
            }
            assert_eq!(texts.len(), 5);
        }
    }

    #[test]
    fn draw_removes_the_picked_pool_entry() {
        // Pool starts as [h1, h2, h3, h4, h5]; picking index 2 takes h3.
        let mut controller = history_session(vec![2, 0]);
        assert_eq!(controller.draw_next().map(|q| q.text.as_str()), Ok("h3"));
        assert_eq!(controller.draw_next().map(|q| q.text.as_str()), Ok("h1"));
        assert_eq!(controller.state().expect("session").available(), &[1, 3, 4]);
        assert_eq!(controller.state().expect("session").history(), &[2, 0]);
    }

    #[test]
    fn previous_requires_two_history_entries() {
        let mut controller = history_session(vec![0]);
        assert_eq!(
            controller.go_to_previous(),
            Err(SessionError::NoPreviousQuestion)
        );

        controller.draw_next().expect("draw");
        assert_eq!(
            controller.go_to_previous(),
            Err(SessionError::NoPreviousQuestion)
        );
        assert_eq!(controller.history_len(), 1);
        assert_eq!(controller.remaining(), 4);
    }

    #[test]
    fn previous_replays_history_without_refilling_pool() {
        let mut controller = history_session(vec![0, 0, 0]);
        let first = controller.draw_next().expect("draw").text.clone();
        let second = controller.draw_next().expect("draw").text.clone();
        assert_eq!(controller.current().map(|q| q.text.clone()), Some(second));

        let replayed = controller.go_to_previous().expect("previous").text.clone();
        assert_eq!(replayed, first);
        assert_eq!(controller.current().map(|q| q.text.clone()), Some(first));
        assert_eq!(controller.history_len(), 1);
        assert_eq!(controller.remaining(), 3);
    }

    #[test]
    fn draw_after_previous_yields_fresh_question() {
        let mut controller = history_session(vec![1, 0, 2, 0, 0]);
        let mut shown = Vec::new();
        for _ in 0..3 {
            shown.push(controller.draw_next().expect("draw").text.clone());
        }
        controller.go_to_previous().expect("previous");

        let fresh = controller.draw_next().expect("draw").text.clone();
        assert!(!shown.contains(&fresh));
        assert_eq!(controller.history_len(), 3);
    }

    #[test]
    fn operations_without_session_are_rejected() {
        let mut controller = SessionController::new(ScriptedRandom::default());
        assert_eq!(controller.draw_next(), Err(SessionError::NoActiveSession));
        assert_eq!(
            controller.go_to_previous(),
            Err(SessionError::NoActiveSession)
        );
        assert_eq!(controller.remaining(), 0);
    }

    #[test]
    fn reselecting_and_reset_clear_state() {
        let mut controller = history_session(vec![0]);
        controller.draw_next().expect("draw");
        controller.draw_next().expect("draw");

        assert_eq!(controller.select_category("Science", &dataset()), Ok(2));
        assert_eq!(controller.history_len(), 0);
        assert_eq!(controller.remaining(), 2);

        controller.reset();
        assert!(controller.state().is_none());
        assert_eq!(controller.selected_category(), None);
    }

    #[test]
    fn duplicate_texts_are_tracked_by_position() {
        let questions = vec![question("same", "Dup"), question("same", "Dup")];
        let mut controller = SessionController::new(ScriptedRandom::new(vec![1, 0]));
        controller.select_category("Dup", &questions).expect("dup");
        controller.draw_next().expect("draw");
        controller.draw_next().expect("draw");
        assert_eq!(controller.state().expect("session").history(), &[1, 0]);
        assert!(matches!(
            controller.draw_next(),
            Err(SessionError::Exhausted { .. })
        ));
    }
}
