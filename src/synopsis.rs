//! Synopsis Provider
//!
//! Turns a pool entry into a playable [`Challenge`]. Static entries are shown
//! verbatim; generative entries get a freshly generated description built from
//! one of the stylistic prompt templates.

use crate::catalog::TITLE_PLACEHOLDER;
use crate::llm::{LlmConfig, LlmManager, LlmResult};
use crate::sanitize::process_and_sanitize;
use crate::types::{Challenge, LocalMovie, TitleEntry};

pub const AI_ERROR_TITLE: &str = "Erro de IA";
pub const AI_ERROR_SYNOPSIS: &str =
    "Ops, algo deu errado ao contatar nossa IA. Por favor, clique em 'Pular' para um novo desafio!";
pub const AI_DISABLED_SYNOPSIS: &str =
    "Modo IA desabilitado, mas aqui está um filme para você adivinhar!";
pub const REGENERATION_EMPTY_MESSAGE: &str =
    "A IA tentou, mas falhou em criar uma nova sinopse. Nenhuma chance foi gasta.";

/// Canned line used when the generated text sanitizes to nothing
pub fn speechless_synopsis(title: &str) -> String {
    format!(
        "Nossa IA ficou sem palavras para descrever '{}', mas aqui vai uma dica: é um filme famoso!",
        title
    )
}

/// Substitute the movie title into a prompt template
pub fn fill_template(template: &str, title: &str) -> String {
    template.replace(TITLE_PLACEHOLDER, title)
}

/// Challenge drawn verbatim from the static pool
pub fn from_catalog(movie: &LocalMovie) -> Challenge {
    Challenge {
        display_title: movie.title.clone(),
        aliases: vec![movie.title.clone()],
        synopsis: movie.synopsis.clone(),
        error: false,
        is_generative: false,
    }
}

/// Placeholder shown when the generative service failed; it can only be skipped
pub fn error_placeholder() -> Challenge {
    Challenge {
        display_title: AI_ERROR_TITLE.to_string(),
        aliases: Vec::new(),
        synopsis: AI_ERROR_SYNOPSIS.to_string(),
        error: true,
        is_generative: true,
    }
}

/// Call the generative service and sanitize its output. The result may be empty.
pub async fn generate_sanitized(
    llm: &LlmManager,
    config: &LlmConfig,
    prompt: String,
) -> LlmResult<String> {
    let response = llm.generate(config.request(prompt)).await?;
    Ok(process_and_sanitize(&response.text))
}

/// Build a challenge for a generative-pool entry.
///
/// `template` is the already chosen prompt template. Without a configured
/// service the real title is kept but the synopsis is a canned placeholder.
pub async fn generate_challenge(
    llm: Option<&LlmManager>,
    config: &LlmConfig,
    identity: &TitleEntry,
    template: &str,
) -> Challenge {
    let Some(llm) = llm else {
        return Challenge {
            display_title: identity.display_title.clone(),
            aliases: identity.aliases.clone(),
            synopsis: AI_DISABLED_SYNOPSIS.to_string(),
            error: false,
            is_generative: true,
        };
    };

    let prompt = fill_template(template, &identity.display_title);
    match generate_sanitized(llm, config, prompt).await {
        Ok(text) => {
            let synopsis = if text.is_empty() {
                tracing::warn!(
                    "Generated synopsis for '{}' was empty after sanitizing",
                    identity.display_title
                );
                speechless_synopsis(&identity.display_title)
            } else {
                text
            };
            Challenge {
                display_title: identity.display_title.clone(),
                aliases: identity.aliases.clone(),
                synopsis,
                error: false,
                is_generative: true,
            }
        }
        Err(e) => {
            tracing::error!(
                "Synopsis generation failed for '{}': {}",
                identity.display_title,
                e
            );
            error_placeholder()
        }
    }
}
