use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{FeedbackMarker, GameMode, SortBy, SortOrder, TimeFilter, WordId};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl ServerState {
    async fn record(&self, path: &str, body: Value) {
        self.requests.lock().await.push((path.to_string(), body));
    }

    async fn body_for(&self, path: &str) -> Option<Value> {
        self.requests
            .lock()
            .await
            .iter()
            .rev()
            .find(|(recorded, _)| recorded == path)
            .map(|(_, body)| body.clone())
    }
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "healthy", "message": "API is running" }))
}

async fn handle_start(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.record("/game/start", body).await;
    Json(json!({
        "word_id": "game_4821",
        "word": "harbors",
        "description": "Sheltered places for ships",
        "length_options": [5, 6, 7],
        "hint1": "Boats rest here",
        "hint2": "Ports have them",
        "hint3": "Rhymes with arbors"
    }))
}

async fn handle_guess_length(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let guessed = body["guessed_length"].as_u64().unwrap_or_default();
    state.record("/game/guess-length", body).await;
    if guessed == 7 {
        Json(json!({
            "is_correct": true,
            "word_length": 7,
            "placeholders": ["_", "_", "_", "_", "_", "_", "_"],
            "message": "Correct! Now spell the word."
        }))
    } else {
        Json(json!({
            "is_correct": false,
            "message": format!("Try again! The word is not {guessed} letters long.")
        }))
    }
}

async fn handle_submit_spelling(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let missing = body["word_id"] == "missing";
    state.record("/game/submit-spelling", body).await;
    if missing {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Game session not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "feedback": ["🟩", "🟨", "⬛", "🟩", "🟩", "🟩", "🟩"],
            "is_correct": false,
            "word_length": 7,
            "message": "Keep trying! Attempt #1"
        })),
    )
}

async fn handle_reveal() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn handle_use_hint() -> &'static str {
    "not json"
}

async fn handle_submit_score(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record("/leaderboard/submit", body).await;
    Json(json!({
        "success": true,
        "score": 85,
        "rank": 2,
        "message": "Score submitted successfully! You scored 85 points."
    }))
}

async fn handle_leaderboard(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.record("/leaderboard", json!(params)).await;
    Json(json!({
        "entries": [{
            "username": "speller_42",
            "word": "harbors",
            "score": 85,
            "attempts": 2,
            "hints_used": 1,
            "completion_time": 31.5,
            "timestamp": "2025-03-14T09:26:53.589793",
            "word_length": 7
        }],
        "total_entries": 1,
        "user_rank": 1,
        "user_best_score": 85
    }))
}

async fn handle_user_stats(Path(username): Path<String>) -> Json<Value> {
    Json(json!({
        "username": username,
        "total_games": 4,
        "best_score": 85,
        "average_score": 71.5,
        "total_words_completed": 4,
        "average_attempts": 2.3,
        "average_completion_time": 40.2
    }))
}

async fn spawn_game_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/game/start", post(handle_start))
        .route("/game/guess-length", post(handle_guess_length))
        .route("/game/submit-spelling", post(handle_submit_spelling))
        .route("/game/reveal-answer", post(handle_reveal))
        .route("/game/use-hint", post(handle_use_hint))
        .route("/leaderboard/submit", post(handle_submit_score))
        .route("/leaderboard", get(handle_leaderboard))
        .route("/leaderboard/user/:username", get(handle_user_stats))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn word(id: &str) -> WordId {
    WordId(id.to_string())
}

#[tokio::test]
async fn health_and_start_round_trip() {
    let (server_url, state) = spawn_game_server().await;
    let api = HttpGameApi::new(&format!("{server_url}/")).expect("api");
    assert_eq!(api.base_url(), server_url);

    assert!(api.health().await.expect("health").is_healthy());

    let started = api
        .start_game(&StartGameRequest {
            difficulty: "medium".to_string(),
            mode: GameMode::Demo,
        })
        .await
        .expect("start");
    assert_eq!(started.word_id, word("game_4821"));
    assert_eq!(started.length_options, vec![5, 6, 7]);
    assert_eq!(started.hints().len(), 3);

    let body = state.body_for("/game/start").await.expect("start body");
    assert_eq!(body, json!({ "difficulty": "medium", "mode": "demo" }));
}

#[tokio::test]
async fn length_guess_and_spelling_use_server_field_names() {
    let (server_url, state) = spawn_game_server().await;
    let api = HttpGameApi::new(&server_url).expect("api");

    let wrong = api
        .guess_length(&GuessLengthRequest {
            word_id: word("game_4821"),
            guessed_length: 6,
        })
        .await
        .expect("guess");
    assert!(!wrong.is_correct);
    assert_eq!(wrong.word_length, None);

    let right = api
        .guess_length(&GuessLengthRequest {
            word_id: word("game_4821"),
            guessed_length: 7,
        })
        .await
        .expect("guess");
    assert!(right.is_correct);
    assert_eq!(right.word_length, Some(7));
    assert_eq!(
        state.body_for("/game/guess-length").await,
        Some(json!({ "word_id": "game_4821", "guessed_length": 7 }))
    );

    let spelled = api
        .submit_spelling(&SubmitSpellingRequest {
            word_id: word("game_4821"),
            guess: "HARBERS".to_string(),
        })
        .await
        .expect("spelling");
    assert_eq!(spelled.feedback.len(), 7);
    assert_eq!(spelled.feedback[0], FeedbackMarker::Correct);
    assert_eq!(spelled.feedback[1], FeedbackMarker::Present);
    assert_eq!(spelled.feedback[2], FeedbackMarker::Absent);
    assert_eq!(spelled.correct_word, None);
}

#[tokio::test]
async fn error_responses_surface_server_detail_or_status() {
    let (server_url, _state) = spawn_game_server().await;
    let api = HttpGameApi::new(&server_url).expect("api");

    let err = api
        .submit_spelling(&SubmitSpellingRequest {
            word_id: word("missing"),
            guess: "HARBORS".to_string(),
        })
        .await
        .expect_err("missing session");
    assert_eq!(
        err,
        ApiClientError::Status {
            status: 404,
            detail: "Game session not found".to_string()
        }
    );
    assert_eq!(err.to_string(), "Game session not found");

    let err = api
        .reveal_answer(&WordRequest {
            word_id: word("game_4821"),
        })
        .await
        .expect_err("server failure");
    assert_eq!(err.to_string(), "HTTP error! status: 500");

    let err = api
        .use_hint(&WordRequest {
            word_id: word("game_4821"),
        })
        .await
        .expect_err("malformed body");
    assert!(matches!(err, ApiClientError::Decode { ref path, .. } if path == "/game/use-hint"));
}

#[tokio::test]
async fn leaderboard_sends_query_and_parses_entries() {
    let (server_url, state) = spawn_game_server().await;
    let api = HttpGameApi::new(&server_url).expect("api");

    let board = api
        .leaderboard(
            &LeaderboardQuery {
                limit: 10,
                offset: 20,
                time_filter: TimeFilter::Weekly,
                sort_by: SortBy::CompletionTime,
                sort_order: SortOrder::Asc,
                username: Some("speller_42".to_string()),
            }
            .normalized(),
        )
        .await
        .expect("leaderboard");
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].hints_used, 1);
    assert_eq!(board.user_rank, Some(1));

    let params = state.body_for("/leaderboard").await.expect("query");
    assert_eq!(
        params,
        json!({
            "limit": "10",
            "offset": "20",
            "time_filter": "weekly",
            "sort_by": "completion_time",
            "sort_order": "asc",
            "username": "speller_42"
        })
    );

    let stats = api
        .user_stats(&Username::parse("speller_42").expect("name"))
        .await
        .expect("stats");
    assert_eq!(stats.username, "speller_42");
    assert_eq!(stats.total_games, 4);
}

#[tokio::test]
async fn score_submission_posts_completion_time() {
    let (server_url, state) = spawn_game_server().await;
    let api = HttpGameApi::new(&server_url).expect("api");

    let response = api
        .submit_score(&SubmitScoreRequest {
            username: Username::parse("speller_42").expect("name"),
            word_id: word("game_4821"),
            completion_time: 31.5,
        })
        .await
        .expect("submit");
    assert_eq!(response.score, 85);
    assert_eq!(response.rank, Some(2));
    assert_eq!(
        state.body_for("/leaderboard/submit").await,
        Some(json!({
            "username": "speller_42",
            "word_id": "game_4821",
            "completion_time": 31.5
        }))
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpGameApi::new(&format!("http://{addr}")).expect("api");
    let err = api.health().await.expect_err("nothing listening");
    assert!(matches!(err, ApiClientError::Transport(_)));
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(matches!(
        HttpGameApi::new("localhost:8000"),
        Err(ApiClientError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        HttpGameApi::new("ftp://example.com"),
        Err(ApiClientError::InvalidBaseUrl { .. })
    ));
    assert!(HttpGameApi::new(DEFAULT_API_BASE_URL).is_ok());
}
