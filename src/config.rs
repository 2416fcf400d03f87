//! Game configuration loaded from the environment

use crate::matching::CLOSE_THRESHOLD;
use std::path::PathBuf;
use std::time::Duration;

/// What skipping an AI-error placeholder does to the wrong-answer history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// The placeholder is not a real movie, so skipping it records nothing
    #[default]
    IgnoreErrorPlaceholders,
    /// Every skip is recorded as a wrong answer
    RecordErrorPlaceholders,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Static pool (`[{title, synopsis}]`)
    pub movies_path: PathBuf,
    /// Generative pool (`[{display_title, aliases}]`)
    pub titles_path: PathBuf,
    /// Chances at the start of each round
    pub starting_chances: u32,
    /// Score a guess must exceed to be reported as close
    pub close_threshold: u32,
    /// Number of opening rounds drawn from the static pool
    pub static_rounds: u32,
    pub skip_policy: SkipPolicy,
    /// Idle sessions older than this are dropped
    pub session_ttl: Duration,
    /// Upper bound on stored sessions; the least recently seen one is evicted first
    pub max_sessions: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            movies_path: PathBuf::from("movies.json"),
            titles_path: PathBuf::from("movie_database.json"),
            starting_chances: 3,
            close_threshold: CLOSE_THRESHOLD,
            static_rounds: 1,
            skip_policy: SkipPolicy::default(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            max_sessions: 10_000,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Boolean flag; a variable that is unset or blank counts as absent
fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().and_then(|v| {
        let v = v.trim().to_lowercase();
        (!v.is_empty()).then(|| v != "0" && v != "false")
    })
}

impl GameConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let skip_policy = match env_flag("SKIP_RECORDS_AI_ERRORS") {
            Some(true) => SkipPolicy::RecordErrorPlaceholders,
            _ => SkipPolicy::IgnoreErrorPlaceholders,
        };

        let config = Self {
            port: parse_env("PORT").unwrap_or(defaults.port),
            movies_path: std::env::var("MOVIES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.movies_path),
            titles_path: std::env::var("MOVIE_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.titles_path),
            starting_chances: parse_env::<u32>("GAME_CHANCES")
                .filter(|c| *c > 0)
                .unwrap_or(defaults.starting_chances),
            close_threshold: parse_env::<u32>("CLOSE_THRESHOLD")
                .filter(|t| *t <= 100)
                .unwrap_or(defaults.close_threshold),
            static_rounds: parse_env("STATIC_ROUNDS").unwrap_or(defaults.static_rounds),
            skip_policy,
            session_ttl: parse_env("SESSION_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            max_sessions: parse_env::<usize>("MAX_SESSIONS")
                .filter(|m| *m > 0)
                .unwrap_or(defaults.max_sessions),
        };

        tracing::info!(
            starting_chances = config.starting_chances,
            close_threshold = config.close_threshold,
            static_rounds = config.static_rounds,
            skip_policy = ?config.skip_policy,
            "Game config loaded"
        );

        config
    }
}
