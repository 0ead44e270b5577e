//! Scoreboard and winner evaluation.

use thiserror::Error;
use tracing::info;

use crate::{config::DEFAULT_WINNING_SCORE, models::Player};

/// Outcome of evaluating the scoreboard at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinnerResult {
    /// Nobody was registered.
    NoPlayers,
    /// Exactly one player holds the top score.
    SingleWinner {
        /// Winner's name.
        name: String,
        /// Winning score.
        score: u32,
    },
    /// Several players share the top score.
    TiedWinners {
        /// Names in registration order.
        names: Vec<String>,
        /// Shared top score.
        score: u32,
    },
}

impl WinnerResult {
    /// Announcement suitable for showing to the players.
    pub fn message(&self) -> String {
        match self {
            WinnerResult::NoPlayers => "No players took part in this game.".to_string(),
            WinnerResult::SingleWinner { name, score } => {
                format!("The winner is {name} with {score} points!")
            }
            WinnerResult::TiedWinners { names, score } => {
                format!("It's a tie between {} with {score} points!", names.join(" and "))
            }
        }
    }
}

/// Determine the player(s) holding the highest score.
pub fn evaluate(players: &[Player]) -> WinnerResult {
    let Some(max_score) = players.iter().map(|player| player.score).max() else {
        return WinnerResult::NoPlayers;
    };

    let mut names: Vec<String> = players
        .iter()
        .filter(|player| player.score == max_score)
        .map(|player| player.name.clone())
        .collect();

    if names.len() == 1 {
        WinnerResult::SingleWinner {
            name: names.remove(0),
            score: max_score,
        }
    } else {
        WinnerResult::TiedWinners {
            names,
            score: max_score,
        }
    }
}

/// Whether `score` has reached `threshold`.
pub fn should_end_game(score: u32, threshold: u32) -> bool {
    score >= threshold
}

/// Split a comma-separated list of names, dropping blanks.
pub fn parse_player_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Errors raised by scoreboard updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// Registration was attempted without any names.
    #[error("enter at least one player name")]
    NoNames,
    /// The index does not refer to a registered player.
    #[error("no player at position {0}")]
    UnknownPlayer(usize),
}

/// Result of a single score change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreUpdate {
    /// Player whose score changed.
    pub name: String,
    /// Score after the change.
    pub score: u32,
    /// Evaluation over all players when the change reached the threshold.
    pub game_over: Option<WinnerResult>,
}

/// Registered players and their scores, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    players: Vec<Player>,
    threshold: u32,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new(DEFAULT_WINNING_SCORE)
    }
}

impl Scoreboard {
    /// Empty scoreboard ending the round at `threshold`.
    pub fn new(threshold: u32) -> Self {
        Self {
            players: Vec::new(),
            threshold,
        }
    }

    /// Replace the roster with the names found in `input`.
    pub fn register(&mut self, input: &str) -> Result<usize, ScoreError> {
        let names = parse_player_names(input);
        if names.is_empty() {
            return Err(ScoreError::NoNames);
        }
        self.players = names.into_iter().map(Player::new).collect();
        info!(players = self.players.len(), "Players registered");
        Ok(self.players.len())
    }

    /// Players in registration order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Score that ends the round.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Add a point; reaching the threshold evaluates every player.
    pub fn award(&mut self, index: usize) -> Result<ScoreUpdate, ScoreError> {
        let player = self
            .players
            .get_mut(index)
            .ok_or(ScoreError::UnknownPlayer(index))?;
        player.score = player.score.saturating_add(1);
        let (name, score) = (player.name.clone(), player.score);

        let game_over = should_end_game(score, self.threshold).then(|| evaluate(&self.players));
        if let Some(result) = &game_over {
            info!(trigger = %name, score, ?result, "Winning score reached");
        }
        Ok(ScoreUpdate {
            name,
            score,
            game_over,
        })
    }

    /// Remove a point, never going below zero.
    pub fn deduct(&mut self, index: usize) -> Result<ScoreUpdate, ScoreError> {
        let player = self
            .players
            .get_mut(index)
            .ok_or(ScoreError::UnknownPlayer(index))?;
        player.score = player.score.saturating_sub(1);
        Ok(ScoreUpdate {
            name: player.name.clone(),
            score: player.score,
            game_over: None,
        })
    }

    /// Evaluate the current standings.
    pub fn evaluate(&self) -> WinnerResult {
        evaluate(&self.players)
    }

    /// Forget every player.
    pub fn clear(&mut self) {
        self.players.clear();
    }
}
