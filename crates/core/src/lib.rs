#![warn(clippy::all, missing_docs)]

//! Core game logic for the trivia party game.
//!
//! This crate hosts the data models, configuration handling, question
//! loading, category sessions and scoring used by the terminal UI and any
//! future frontends.

pub mod config;
pub mod game;
pub mod models;
pub mod repository;
pub mod scoring;
pub mod session;

pub use config::AppConfig;
pub use game::{Game, GameError, Phase};
pub use models::{Player, Question, DEFAULT_CATEGORY};
pub use repository::{LoadError, QuestionRepository, QuestionSource};
pub use scoring::{evaluate, should_end_game, Scoreboard, WinnerResult};
pub use session::{RandomSource, SessionController, SessionError, ThreadRandom};
