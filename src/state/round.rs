//! Round state machine on a single session.
//!
//! `AwaitingGuess` moves to `Won` on a correct guess. Close and wrong guesses
//! cost one chance; running out of chances moves to `Lost`. Both terminal states
//! append the title to the matching history exactly once.

use crate::config::SkipPolicy;
use crate::types::{Challenge, RoundState, Session, Verdict};

/// Title reported when skipping without a playable movie
pub const UNKNOWN_TITLE: &str = "Filme Desconhecido";

/// What a guess did to the round
#[derive(Debug, Clone, PartialEq)]
pub struct GuessApplied {
    pub verdict: Verdict,
    pub chances_left: u32,
    pub out_of_chances: bool,
}

impl Session {
    /// Begin a new round with a fresh chance budget
    pub fn start_round(&mut self, challenge: Challenge, chances: u32) {
        self.current_chances = chances;
        self.current_movie = Some(challenge);
        self.round_state = RoundState::AwaitingGuess;
    }

    /// Apply a verdict to the current round. `title` is the display form stored in history.
    ///
    /// Callers must only call this while the round awaits a guess.
    pub fn apply_verdict(&mut self, verdict: Verdict, title: &str) -> GuessApplied {
        debug_assert_eq!(self.round_state, RoundState::AwaitingGuess);

        match verdict {
            Verdict::Correct => {
                self.round_state = RoundState::Won;
                self.correct_movies.push(title.to_string());
            }
            Verdict::Close | Verdict::Wrong => {
                self.current_chances = self.current_chances.saturating_sub(1);
                if self.current_chances == 0 {
                    self.round_state = RoundState::Lost;
                    self.wrong_movies.push(title.to_string());
                }
            }
        }

        GuessApplied {
            verdict,
            chances_left: self.current_chances,
            out_of_chances: self.current_chances == 0,
        }
    }

    /// Give up on the current round. Returns the title to show the player.
    ///
    /// `title` is the display form of the current movie. Terminal rounds are
    /// not recorded again.
    pub fn skip(&mut self, policy: SkipPolicy, title: Option<&str>) -> String {
        let Some(movie) = self.current_movie.as_ref() else {
            return UNKNOWN_TITLE.to_string();
        };

        let recorded = !movie.error || policy == SkipPolicy::RecordErrorPlaceholders;
        if !recorded {
            self.round_state = RoundState::Lost;
            return UNKNOWN_TITLE.to_string();
        }

        let title = title.unwrap_or(&movie.display_title).to_string();
        if !self.round_state.is_terminal() {
            self.round_state = RoundState::Lost;
            self.wrong_movies.push(title.clone());
        }
        title
    }

    /// Spend one chance on a new description
    pub fn replace_synopsis(&mut self, synopsis: String) {
        self.current_chances = self.current_chances.saturating_sub(1);
        if let Some(movie) = self.current_movie.as_mut() {
            movie.synopsis = synopsis;
        }
    }
}
