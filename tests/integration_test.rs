use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use wtfilm::abuse::{AbuseConfig, RateLimiter};
use wtfilm::api;
use wtfilm::catalog::Catalog;
use wtfilm::config::GameConfig;
use wtfilm::llm::{
    GenerateRequest, GenerateResponse, LlmConfig, LlmError, LlmManager, LlmProvider, LlmResult,
    ResponseMetadata,
};
use wtfilm::state::AppState;
use wtfilm::types::{LocalMovie, TitleEntry};

/// Provider replaying scripted replies in order
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, _request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_string()));
        reply
            .map(|text| GenerateResponse {
                text,
                metadata: ResponseMetadata {
                    provider: "scripted".to_string(),
                    model: "test".to_string(),
                    tokens_used: None,
                    latency_ms: 0,
                },
            })
            .map_err(LlmError::ApiError)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn scripted(replies: &[Result<&str, &str>]) -> LlmManager {
    let replies = replies
        .iter()
        .map(|r| r.map(str::to_string).map_err(str::to_string))
        .collect();
    LlmManager::new(vec![Box::new(ScriptedProvider {
        replies: Mutex::new(replies),
    })])
}

fn catalog() -> Catalog {
    Catalog::new(
        vec![LocalMovie {
            title: "Titanic".to_string(),
            synopsis: "Um barco muito grande encontra um gelo maior ainda.".to_string(),
        }],
        vec![TitleEntry {
            display_title: "Jurassic Park".to_string(),
            aliases: vec![
                "Jurassic Park".to_string(),
                "Parque dos Dinossauros".to_string(),
            ],
        }],
    )
}

fn app_with_state(llm: Option<LlmManager>, abuse: AbuseConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        GameConfig::default(),
        catalog(),
        llm,
        LlmConfig::default(),
    ));
    (api::router(state.clone(), Arc::new(abuse)), state)
}

fn app(llm: Option<LlmManager>, abuse: AbuseConfig) -> Router {
    app_with_state(llm, abuse).0
}

/// Minimal client that keeps the session cookie between requests
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    async fn post(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send("POST", uri, None).await
    }

    async fn guess(&mut self, guess: &str) -> (StatusCode, Value) {
        self.send("POST", "/api/check_answer", Some(json!({ "guess": guess })))
            .await
    }
}

#[tokio::test]
async fn test_index_starts_session() {
    let mut client = Client::new(app(None, AbuseConfig::disabled()));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = client.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("index sets the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("wtfilm_session="));
    assert!(set_cookie.contains("HttpOnly"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<html"));

    // Reloading with a known session keeps its id
    client.cookie = Some(set_cookie.split(';').next().unwrap().to_string());
    let first = client.cookie.clone();
    client.get("/").await;
    assert_eq!(client.cookie, first);
}

#[tokio::test]
async fn test_full_game_flow() {
    let llm = scripted(&[
        Ok("Um *parque* cheio de dinossauros."),
        Ok("Cientistas **clonam** o passado."),
    ]);
    let mut client = Client::new(app(Some(llm), AbuseConfig::disabled()));
    client.get("/").await;

    // Round 1: static pool
    let (status, round) = client.get("/api/new_game").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(round["isIAGame"], false);
    assert_eq!(round["error"], false);
    assert_eq!(round["chancesLeft"], 3);
    assert_eq!(
        round["synopsis"],
        "Um barco muito grande encontra um gelo maior ainda."
    );

    let (status, verdict) = client.guess("titanik").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verdict["result"], "close");
    assert_eq!(verdict["chancesLeft"], 2);
    assert_eq!(verdict["outOfChances"], false);

    let (_, verdict) = client.guess("  TITANIC ").await;
    assert_eq!(verdict["result"], "correct");
    assert_eq!(verdict["correctAnswer"], "Titanic");
    assert_eq!(verdict["chancesLeft"], 2);

    // Finished rounds accept no more guesses
    let (status, body) = client.guess("Titanic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "error");

    // Round 2: generative pool
    let (_, round) = client.get("/api/new_game").await;
    assert_eq!(round["isIAGame"], true);
    assert_eq!(round["error"], false);
    assert_eq!(round["synopsis"], "Um <em>parque</em> cheio de dinossauros.");

    let (status, regenerated) = client.post("/api/new_synopsis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        regenerated["newSynopsis"],
        "Cientistas <strong>clonam</strong> o passado."
    );
    assert_eq!(regenerated["chancesLeft"], 2);

    let (_, verdict) = client.guess("Tubarão").await;
    assert_eq!(verdict["result"], "wrong");
    assert_eq!(verdict["chancesLeft"], 1);

    // One chance left: no more descriptions
    let (status, body) = client.post("/api/new_synopsis").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Você não tem mais novas descrições");

    let (_, verdict) = client.guess("Tubarão").await;
    assert_eq!(verdict["result"], "wrong");
    assert_eq!(verdict["outOfChances"], true);
    assert_eq!(verdict["chancesLeft"], 0);
    assert_eq!(verdict["correctAnswer"], "Jurassic Park");
}

#[tokio::test]
async fn test_alias_is_accepted() {
    let llm = scripted(&[Ok("Dinossauros voltam.")]);
    let mut client = Client::new(app(Some(llm), AbuseConfig::disabled()));

    client.get("/api/new_game").await;
    client.post("/api/skip").await;
    client.get("/api/new_game").await;

    let (_, verdict) = client.guess("parque dos dinossauros").await;
    assert_eq!(verdict["result"], "correct");
    assert_eq!(verdict["correctAnswer"], "Jurassic Park");
}

#[tokio::test]
async fn test_check_answer_errors() {
    let mut client = Client::new(app(None, AbuseConfig::disabled()));

    // No round yet
    let (status, body) = client.guess("Titanic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "error");
    assert!(body["error"].as_str().unwrap().contains("Sessão expirada"));

    client.get("/api/new_game").await;

    let (status, body) = client.guess("   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nenhuma resposta fornecida.");

    let (status, body) = client
        .send("POST", "/api/check_answer", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nenhuma resposta fornecida.");

    // Rejected guesses cost nothing
    let (_, verdict) = client.guess("Matrix").await;
    assert_eq!(verdict["chancesLeft"], 2);
}

#[tokio::test]
async fn test_new_synopsis_rejected_on_static_round() {
    let llm = scripted(&[]);
    let mut client = Client::new(app(Some(llm), AbuseConfig::disabled()));
    client.get("/api/new_game").await;

    let (status, body) = client.post("/api/new_synopsis").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Ação não disponível para este filme.");
}

#[tokio::test]
async fn test_generation_failure_on_new_synopsis() {
    let llm = scripted(&[Ok("Dinossauros voltam."), Err("upstream down")]);
    let mut client = Client::new(app(Some(llm), AbuseConfig::disabled()));

    client.get("/api/new_game").await;
    client.post("/api/skip").await;
    client.get("/api/new_game").await;

    let (status, body) = client.post("/api/new_synopsis").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["result"], "error");

    // The round is still playable with all chances
    let (_, verdict) = client.guess("Matrix").await;
    assert_eq!(verdict["chancesLeft"], 2);
}

#[tokio::test]
async fn test_ai_error_round_can_only_be_skipped() {
    let llm = scripted(&[Err("quota exceeded")]);
    let mut client = Client::new(app(Some(llm), AbuseConfig::disabled()));

    client.get("/api/new_game").await;
    client.post("/api/skip").await;

    let (_, round) = client.get("/api/new_game").await;
    assert_eq!(round["error"], true);
    assert_eq!(round["isIAGame"], true);

    let (status, _) = client.guess("Jurassic Park").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, skipped) = client.post("/api/skip").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(skipped["success"], true);
    assert_eq!(skipped["skippedTitle"], "Filme Desconhecido");
}

#[tokio::test]
async fn test_ai_disabled_round_is_playable() {
    let mut client = Client::new(app(None, AbuseConfig::disabled()));

    client.get("/api/new_game").await;
    client.post("/api/skip").await;

    let (_, round) = client.get("/api/new_game").await;
    assert_eq!(round["isIAGame"], true);
    assert_eq!(round["error"], false);
    assert_eq!(
        round["synopsis"],
        "Modo IA desabilitado, mas aqui está um filme para você adivinhar!"
    );

    let (_, verdict) = client.guess("jurassic park").await;
    assert_eq!(verdict["result"], "correct");
}

#[tokio::test]
async fn test_skip_reveals_title() {
    let mut client = Client::new(app(None, AbuseConfig::disabled()));

    let (_, skipped) = client.post("/api/skip").await;
    assert_eq!(skipped["skippedTitle"], "Filme Desconhecido");

    client.get("/api/new_game").await;
    let (status, skipped) = client.post("/api/skip").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(skipped["success"], true);
    assert_eq!(skipped["skippedTitle"], "Titanic");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let router = app(None, AbuseConfig::disabled());
    let mut alice = Client::new(router.clone());
    let mut bob = Client::new(router);

    alice.get("/api/new_game").await;
    alice.guess("Matrix").await;

    let (status, _) = bob.guess("Titanic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    bob.get("/api/new_game").await;
    let (_, verdict) = bob.guess("Matrix").await;
    assert_eq!(verdict["chancesLeft"], 2);
    assert_ne!(alice.cookie, bob.cookie);
}

#[tokio::test]
async fn test_rate_limit_per_session() {
    let abuse = AbuseConfig {
        rate_limiter: Some(RateLimiter::new(2, Duration::from_secs(60))),
    };
    let mut client = Client::new(app(None, abuse));

    // First request has no cookie yet and is counted against the client address
    let (status, _) = client.get("/api/new_game").await;
    assert_eq!(status, StatusCode::OK);
    assert!(client.cookie.is_some());

    let (status, _) = client.post("/api/skip").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client.get("/api/new_game").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client.post("/api/skip").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // The landing page is not limited
    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, client.cookie.clone().unwrap())
        .body(Body::empty())
        .unwrap();
    let response = client.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_assets_served() {
    let router = app(None, AbuseConfig::disabled());
    let request = Request::builder()
        .uri("/script.js")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cookieless_requests_are_limited() {
    let abuse = AbuseConfig {
        rate_limiter: Some(RateLimiter::new(2, Duration::from_secs(60))),
    };
    let (router, state) = app_with_state(None, abuse);

    let mut ok = 0;
    let mut limited = 0;
    for _ in 0..50 {
        let request = Request::builder()
            .uri("/api/new_game")
            .body(Body::empty())
            .unwrap();
        match router.clone().oneshot(request).await.unwrap().status() {
            StatusCode::OK => ok += 1,
            StatusCode::TOO_MANY_REQUESTS => limited += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(ok, 2);
    assert_eq!(limited, 48);
    assert_eq!(state.sessions.len().await, 2);
}

#[tokio::test]
async fn test_malformed_guess_body_is_rejected() {
    let mut client = Client::new(app(None, AbuseConfig::disabled()));
    client.get("/api/new_game").await;

    // Wrong type for the guess
    let (status, body) = client
        .send("POST", "/api/check_answer", Some(json!({ "guess": 5 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "error");
    assert_eq!(body["error"], "Requisição inválida.");

    // No body and no content type
    let (status, body) = client.post("/api/check_answer").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "error");

    // Not JSON at all
    let request = Request::builder()
        .method("POST")
        .uri("/api/check_answer")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, client.cookie.clone().unwrap())
        .body(Body::from("guess=matrix"))
        .unwrap();
    let response = client.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed requests cost no chance
    let (_, verdict) = client.guess("Matrix").await;
    assert_eq!(verdict["chancesLeft"], 2);
}
