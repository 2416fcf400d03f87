use super::pool::pick_unplayed;
use super::AppState;
use crate::catalog::PROMPT_TEMPLATES;
use crate::error::GameError;
use crate::matching::{classify, normalize, title_case};
use crate::synopsis::{self, REGENERATION_EMPTY_MESSAGE};
use crate::types::*;
use rand::seq::IndexedRandom;

/// Result of starting a round
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub synopsis: String,
    pub chances_left: u32,
    /// The challenge is an AI-error placeholder and can only be skipped
    pub error: bool,
    pub is_ia_game: bool,
}

/// Result of asking for another description
#[derive(Debug, Clone, PartialEq)]
pub struct NewSynopsis {
    pub synopsis: String,
    pub chances_left: u32,
    /// False when generation produced nothing and no chance was spent
    pub regenerated: bool,
}

/// Result of a guess
#[derive(Debug, Clone, PartialEq)]
pub struct GuessOutcome {
    pub verdict: Verdict,
    pub chances_left: u32,
    pub out_of_chances: bool,
    pub correct_answer: String,
}

impl AppState {
    /// Whether a round number is drawn from the generative pool
    pub fn is_generative_round(&self, game_count: u32) -> bool {
        game_count > self.config.static_rounds
    }

    fn random_template(&self) -> String {
        let mut rng = rand::rng();
        self.catalog
            .prompt_templates
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| PROMPT_TEMPLATES[0].to_string())
    }

    fn draw_static(&self, session: &mut Session) -> Challenge {
        let mut rng = rand::rng();
        match pick_unplayed(
            &self.catalog.local_movies,
            &mut session.played_local_titles,
            |m| m.title.as_str(),
            &mut rng,
        ) {
            Some(movie) => synopsis::from_catalog(movie),
            None => synopsis::error_placeholder(),
        }
    }

    fn draw_identity(&self, session: &mut Session) -> Option<TitleEntry> {
        let mut rng = rand::rng();
        pick_unplayed(
            &self.catalog.ia_titles,
            &mut session.played_ia_titles,
            |t| t.display_title.as_str(),
            &mut rng,
        )
        .cloned()
    }

    /// Start a new round: pick a movie from the pool for this round number and
    /// build its synopsis
    pub async fn new_game(&self, session: &mut Session) -> NewGame {
        session.game_count += 1;
        let is_ia_game = self.is_generative_round(session.game_count);

        let challenge = if is_ia_game {
            match self.draw_identity(session) {
                Some(identity) => {
                    let template = self.random_template();
                    synopsis::generate_challenge(
                        self.llm.as_deref(),
                        &self.llm_config,
                        &identity,
                        &template,
                    )
                    .await
                }
                None => synopsis::error_placeholder(),
            }
        } else {
            self.draw_static(session)
        };

        tracing::info!(
            round = session.game_count,
            is_ia_game,
            error = challenge.error,
            "Round started"
        );

        let outcome = NewGame {
            synopsis: challenge.synopsis.clone(),
            chances_left: self.config.starting_chances,
            error: challenge.error,
            is_ia_game,
        };
        session.start_round(challenge, self.config.starting_chances);
        outcome
    }

    /// Replace the current synopsis with a freshly generated one, at the cost of one chance
    pub async fn new_synopsis(&self, session: &mut Session) -> Result<NewSynopsis, GameError> {
        if session.current_chances <= 1 {
            return Err(GameError::NoRegenerationsLeft);
        }

        let movie = session
            .current_movie
            .as_ref()
            .ok_or(GameError::RegenerationUnavailable)?;
        let Some(llm) = self.llm.as_deref() else {
            return Err(GameError::RegenerationUnavailable);
        };
        if !movie.is_generative || movie.error {
            return Err(GameError::RegenerationUnavailable);
        }
        if session.round_state.is_terminal() {
            return Err(GameError::RoundOver);
        }

        let prompt = synopsis::fill_template(&self.random_template(), &movie.display_title);
        let text = synopsis::generate_sanitized(llm, &self.llm_config, prompt)
            .await
            .map_err(GameError::Generation)?;

        if text.is_empty() {
            tracing::warn!("Regenerated synopsis was empty after sanitizing");
            return Ok(NewSynopsis {
                synopsis: REGENERATION_EMPTY_MESSAGE.to_string(),
                chances_left: session.current_chances,
                regenerated: false,
            });
        }

        session.replace_synopsis(text.clone());
        Ok(NewSynopsis {
            synopsis: text,
            chances_left: session.current_chances,
            regenerated: true,
        })
    }

    /// Judge a guess against the current movie
    pub fn check_answer(
        &self,
        session: &mut Session,
        guess: &str,
    ) -> Result<GuessOutcome, GameError> {
        let movie = session
            .current_movie
            .as_ref()
            .ok_or(GameError::SessionExpired)?;
        if guess.trim().is_empty() {
            return Err(GameError::EmptyGuess);
        }
        if movie.error {
            return Err(GameError::ChallengeUnavailable);
        }
        if session.round_state.is_terminal() {
            return Err(GameError::RoundOver);
        }

        let normalized_guess = normalize(guess);
        let answers: Vec<String> = movie.aliases.iter().map(|a| normalize(a)).collect();
        let correct_answer = title_case(&movie.display_title);
        let verdict = classify(&normalized_guess, &answers, self.config.close_threshold);

        let applied = session.apply_verdict(verdict, &correct_answer);
        tracing::info!(
            ?verdict,
            chances_left = applied.chances_left,
            "Guess checked"
        );

        Ok(GuessOutcome {
            verdict,
            chances_left: applied.chances_left,
            out_of_chances: applied.out_of_chances,
            correct_answer,
        })
    }

    /// Give up on the current round. Returns the title to reveal.
    pub fn skip(&self, session: &mut Session) -> String {
        let title = session
            .current_movie
            .as_ref()
            .map(|m| title_case(&m.display_title));
        let skipped = session.skip(self.config.skip_policy, title.as_deref());
        tracing::info!(skipped = %skipped, "Round skipped");
        skipped
    }
}
