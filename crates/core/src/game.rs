//! Game flow from registration to the winner announcement.

use thiserror::Error;
use tracing::info;

use crate::{
    config::AppConfig,
    models::{Player, Question},
    repository::list_categories,
    scoring::{ScoreError, ScoreUpdate, Scoreboard, WinnerResult},
    session::{RandomSource, SessionController, SessionError, ThreadRandom},
};

/// Stage of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Collecting player names and loading questions.
    Registration,
    /// Waiting for a category to be picked.
    CategorySelection,
    /// A question is on display.
    Playing,
    /// Someone reached the winning score.
    Finished(WinnerResult),
}

/// Errors raised by game transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The operation does not apply to the current phase.
    #[error("cannot {action} right now")]
    WrongPhase {
        /// Short description of the rejected operation.
        action: &'static str,
    },
    /// Questions arrived before any player registered.
    #[error("register players before loading questions")]
    NoPlayers,
    /// The question set was empty.
    #[error("no questions are available")]
    NoQuestions,
    /// Scoreboard rejected the change.
    #[error(transparent)]
    Score(#[from] ScoreError),
    /// Session navigation signal.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Players, questions and the active category session.
#[derive(Debug, Clone)]
pub struct Game<R = ThreadRandom> {
    phase: Phase,
    scoreboard: Scoreboard,
    questions: Vec<Question>,
    categories: Vec<String>,
    session: SessionController<R>,
}

impl Game<ThreadRandom> {
    /// Game using the configured threshold and an entropy-seeded source.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ThreadRandom::new(), config.winning_score)
    }
}

impl<R: RandomSource> Game<R> {
    /// Fresh game in the registration phase.
    pub fn new(random: R, winning_score: u32) -> Self {
        Self {
            phase: Phase::Registration,
            scoreboard: Scoreboard::new(winning_score),
            questions: Vec::new(),
            categories: Vec::new(),
            session: SessionController::new(random),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Registered players in registration order.
    pub fn players(&self) -> &[Player] {
        self.scoreboard.players()
    }

    /// Score that ends the round.
    pub fn winning_score(&self) -> u32 {
        self.scoreboard.threshold()
    }

    /// Categories of the loaded questions.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Read access to the category session.
    pub fn session(&self) -> &SessionController<R> {
        &self.session
    }

    /// Question on display, if any.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Playing => self.session.current(),
            _ => None,
        }
    }

    /// Register players from a comma-separated list of names.
    pub fn register_players(&mut self, input: &str) -> Result<usize, GameError> {
        self.expect_phase(Phase::Registration, "register players")?;
        Ok(self.scoreboard.register(input)?)
    }

    /// Provide the loaded question set and move on to category selection.
    pub fn attach_questions(&mut self, questions: Vec<Question>) -> Result<usize, GameError> {
        self.expect_phase(Phase::Registration, "load questions")?;
        if self.scoreboard.players().is_empty() {
            return Err(GameError::NoPlayers);
        }
        if questions.is_empty() {
            return Err(GameError::NoQuestions);
        }

        self.categories = list_categories(&questions);
        self.questions = questions;
        self.phase = Phase::CategorySelection;
        info!(
            questions = self.questions.len(),
            categories = self.categories.len(),
            "Game ready for category selection"
        );
        Ok(self.categories.len())
    }

    /// Start a session for `category` and show its first question.
    pub fn choose_category(&mut self, category: &str) -> Result<&Question, GameError> {
        if !matches!(self.phase, Phase::CategorySelection | Phase::Playing) {
            return Err(GameError::WrongPhase {
                action: "choose a category",
            });
        }
        self.session.select_category(category, &self.questions)?;
        self.phase = Phase::Playing;
        self.draw()
    }

    /// Draw the next unseen question of the current category.
    ///
    /// Exhaustion sends the game back to category selection.
    pub fn next_question(&mut self) -> Result<&Question, GameError> {
        self.expect_phase(Phase::Playing, "draw a question")?;
        self.draw()
    }

    /// Return to the question shown before the current one.
    pub fn previous_question(&mut self) -> Result<&Question, GameError> {
        self.expect_phase(Phase::Playing, "go back")?;
        Ok(self.session.go_to_previous()?)
    }

    /// Index and text of the current question's correct answer.
    pub fn reveal_answer(&self) -> Option<(usize, &str)> {
        let question = self.current_question()?;
        question
            .correct_option()
            .map(|text| (question.correct_index, text))
    }

    /// Leave the current question and pick another category.
    pub fn back_to_categories(&mut self) -> Result<(), GameError> {
        self.expect_phase(Phase::Playing, "change category")?;
        self.phase = Phase::CategorySelection;
        Ok(())
    }

    /// Give a point to the player at `index`.
    pub fn award(&mut self, index: usize) -> Result<ScoreUpdate, GameError> {
        self.ensure_scoring()?;
        let update = self.scoreboard.award(index)?;
        if let Some(result) = &update.game_over {
            self.phase = Phase::Finished(result.clone());
        }
        Ok(update)
    }

    /// Take a point from the player at `index`.
    pub fn deduct(&mut self, index: usize) -> Result<ScoreUpdate, GameError> {
        self.ensure_scoring()?;
        Ok(self.scoreboard.deduct(index)?)
    }

    /// Drop players, questions and session and return to registration.
    pub fn restart(&mut self) {
        self.scoreboard.clear();
        self.questions.clear();
        self.categories.clear();
        self.session.reset();
        self.phase = Phase::Registration;
        info!("Game restarted");
    }

    fn draw(&mut self) -> Result<&Question, GameError> {
        if let Err(err) = self.session.draw_next() {
            if matches!(err, SessionError::Exhausted { .. }) {
                self.phase = Phase::CategorySelection;
            }
            return Err(err.into());
        }
        self.session
            .current()
            .ok_or(GameError::Session(SessionError::NoActiveSession))
    }

    fn ensure_scoring(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::CategorySelection | Phase::Playing => Ok(()),
            _ => Err(GameError::WrongPhase {
                action: "change scores",
            }),
        }
    }

    fn expect_phase(&self, phase: Phase, action: &'static str) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase { action })
        }
    }
}
