//! HTTP API endpoints.
//!
//! Each handler loads the player's session from the store, runs one game
//! operation on it and saves it back before responding.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::abuse::{api_rate_limit_middleware, AbuseConfig};
use crate::error::GameError;
use crate::state::{AppState, LoadedSession};
use crate::types::Verdict;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "wtfilm_session";

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewGameResponse {
    pub synopsis: String,
    pub chances_left: u32,
    pub error: bool,
    #[serde(rename = "isIAGame")]
    pub is_ia_game: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSynopsisResponse {
    pub new_synopsis: String,
    pub chances_left: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckAnswerRequest {
    #[serde(default)]
    pub guess: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerResponse {
    pub result: Verdict,
    pub chances_left: u32,
    pub out_of_chances: bool,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkipResponse {
    pub success: bool,
    pub skipped_title: String,
}

/// Extract the session id from the Cookie header
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// Attach a Set-Cookie header when the session was created by this request
fn with_session_cookie(loaded_id: &str, is_new: bool, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if is_new {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(loaded_id)) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Landing page. Starts a fresh session.
///
/// GET /
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let previous = session_id_from_headers(&headers);
    let id = state.sessions.reset(previous.as_deref()).await;
    with_session_cookie(&id, true, Html(INDEX_HTML))
}

/// Start a round.
///
/// GET /api/new_game
pub async fn new_game(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let LoadedSession {
        id,
        mut session,
        is_new,
    } = state
        .sessions
        .load(session_id_from_headers(&headers).as_deref())
        .await;

    let outcome = state.new_game(&mut session).await;
    state.sessions.save(&id, session).await;

    with_session_cookie(
        &id,
        is_new,
        Json(NewGameResponse {
            synopsis: outcome.synopsis,
            chances_left: outcome.chances_left,
            error: outcome.error,
            is_ia_game: outcome.is_ia_game,
        }),
    )
}

/// Replace the synopsis of the current round, spending one chance.
///
/// POST /api/new_synopsis
pub async fn new_synopsis(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let LoadedSession {
        id,
        mut session,
        is_new,
    } = state
        .sessions
        .load(session_id_from_headers(&headers).as_deref())
        .await;

    let result = state.new_synopsis(&mut session).await;
    state.sessions.save(&id, session).await;

    let response = match result {
        Ok(outcome) => Json(NewSynopsisResponse {
            new_synopsis: outcome.synopsis,
            chances_left: outcome.chances_left,
        })
        .into_response(),
        Err(e) => e.into_response(),
    };
    with_session_cookie(&id, is_new, response)
}

/// Judge a guess.
///
/// POST /api/check_answer
pub async fn check_answer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CheckAnswerRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return GameError::InvalidRequest(rejection.body_text()).into_response();
        }
    };

    let LoadedSession {
        id,
        mut session,
        is_new,
    } = state
        .sessions
        .load(session_id_from_headers(&headers).as_deref())
        .await;

    let result = state.check_answer(&mut session, &request.guess);
    state.sessions.save(&id, session).await;

    let response = match result {
        Ok(outcome) => Json(CheckAnswerResponse {
            result: outcome.verdict,
            chances_left: outcome.chances_left,
            out_of_chances: outcome.out_of_chances,
            correct_answer: outcome.correct_answer,
        })
        .into_response(),
        Err(e) => e.into_response(),
    };
    with_session_cookie(&id, is_new, response)
}

/// Give up on the current round.
///
/// POST /api/skip
pub async fn skip(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let LoadedSession {
        id,
        mut session,
        is_new,
    } = state
        .sessions
        .load(session_id_from_headers(&headers).as_deref())
        .await;

    let skipped_title = state.skip(&mut session);
    state.sessions.save(&id, session).await;

    with_session_cookie(
        &id,
        is_new,
        Json(SkipResponse {
            success: true,
            skipped_title,
        }),
    )
}

/// Build the application router
pub fn router(state: Arc<AppState>, abuse_config: Arc<AbuseConfig>) -> Router {
    let api_routes = Router::new()
        .route("/api/new_game", get(new_game))
        .route("/api/new_synopsis", post(new_synopsis))
        .route("/api/check_answer", post(check_answer))
        .route("/api/skip", post(skip))
        .layer(middleware::from_fn_with_state(
            abuse_config,
            api_rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(index))
        .merge(api_routes)
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
