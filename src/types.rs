use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opaque ID types for type safety
pub type SessionId = String;

/// Entry of the static pool: the synopsis is shown verbatim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalMovie {
    pub title: String,
    pub synopsis: String,
}

/// Entry of the generative pool: only the identity is stored, the synopsis is generated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleEntry {
    pub display_title: String,
    /// Accepted spellings for correctness checking
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// The movie a player is currently trying to guess
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub display_title: String,
    pub aliases: Vec<String>,
    pub synopsis: String,
    /// Set when the generative service failed; the player can only skip
    #[serde(default)]
    pub error: bool,
    /// Whether this challenge came from the generative pool
    #[serde(default)]
    pub is_generative: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    #[default]
    AwaitingGuess,
    Won,
    Lost,
}

impl RoundState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoundState::AwaitingGuess)
    }
}

/// Outcome of comparing a guess with the accepted answers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Close,
    Wrong,
}

/// Per-player game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Rounds started since the landing page was loaded
    pub game_count: u32,
    pub current_chances: u32,
    pub current_movie: Option<Challenge>,
    #[serde(default)]
    pub round_state: RoundState,
    pub played_local_titles: HashSet<String>,
    pub played_ia_titles: HashSet<String>,
    pub correct_movies: Vec<String>,
    pub wrong_movies: Vec<String>,
    pub last_seen: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            game_count: 0,
            current_chances: 0,
            current_movie: None,
            round_state: RoundState::AwaitingGuess,
            played_local_titles: HashSet::new(),
            played_ia_titles: HashSet::new(),
            correct_movies: Vec::new(),
            wrong_movies: Vec::new(),
            last_seen: Utc::now(),
        }
    }
}
