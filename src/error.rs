use crate::llm::LlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Request-level failures of the game API. None of them is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Sessão expirada. Atualize a página.")]
    SessionExpired,

    #[error("Nenhuma resposta fornecida.")]
    EmptyGuess,

    /// Request body missing or not the expected JSON; the detail is only logged
    #[error("Requisição inválida.")]
    InvalidRequest(String),

    #[error("Esta rodada já terminou. Comece um novo desafio!")]
    RoundOver,

    #[error("Este desafio não pode ser jogado. Clique em 'Pular' para um novo desafio!")]
    ChallengeUnavailable,

    #[error("Você não tem mais novas descrições")]
    NoRegenerationsLeft,

    #[error("Ação não disponível para este filme.")]
    RegenerationUnavailable,

    #[error("Não foi possível gerar uma nova sinopse no momento.")]
    Generation(#[source] LlmError),
}

impl GameError {
    pub fn status(&self) -> StatusCode {
        match self {
            GameError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    result: &'static str,
    error: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let GameError::Generation(ref source) = self {
            tracing::error!("Generative service error: {}", source);
        } else if let GameError::InvalidRequest(ref detail) = self {
            tracing::debug!("Malformed game request: {}", detail);
        } else {
            tracing::debug!("Rejected game request: {}", self);
        }

        let body = ErrorBody {
            result: "error",
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
