//! HTTP presentation of a session
//!
//! Same session semantics as the TUI, exposed as JSON for a browser
//! front end. One session per server process.

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::record::OutputRecord;
use crate::session::{Session, SessionState, Submission};

/// Application state
pub struct AppState {
    session: Mutex<Session>,
}

impl AppState {
    pub fn new(session: Session) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(session),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    input: String,
}

#[derive(Debug, Deserialize)]
struct CompleteRequest {
    prefix: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecallRequest {
    #[serde(default)]
    draft: String,
}

#[derive(Debug, Serialize)]
struct TranscriptResponse {
    state: SessionState,
    records: Vec<OutputRecord>,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    state: SessionState,
    /// Transcript was reset by this submission
    cleared: bool,
    /// Records appended by this submission
    records: Vec<OutputRecord>,
}

#[derive(Debug, Serialize)]
struct CompleteResponse {
    completion: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecallResponse {
    input: String,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": message })))
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

async fn transcript(State(state): State<Arc<AppState>>) -> Json<TranscriptResponse> {
    let session = state.session.lock().await;
    Json(TranscriptResponse {
        state: session.state(),
        records: session.transcript().to_vec(),
    })
}

/// Records appended since `mark`, read under the same lock that produced them
fn submit_response(session: &Session, mark: usize, cleared: bool) -> SubmitResponse {
    SubmitResponse {
        state: session.state(),
        cleared,
        records: session.records_after(mark).to_vec(),
    }
}

/// Submit one line; waits for a pending assistant answer
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let mark = session.transcript().len();
    let submission = session.submit(&req.input);

    match submission {
        Submission::Rejected => Err(api_error(
            StatusCode::CONFLICT,
            "a command is still executing",
        )),
        Submission::Reset => Ok(Json(submit_response(&session, 0, true))),
        Submission::Ignored | Submission::Completed => {
            Ok(Json(submit_response(&session, mark, false)))
        }
        Submission::Pending(task) => {
            drop(session);
            // Resolve on a detached task so a dropped request cannot
            // leave the session stuck in Executing
            let shared = state.clone();
            let resolved = tokio::spawn(async move {
                let record = task.await;
                let mut session = shared.session.lock().await;
                session.resolve(record);
                submit_response(&session, mark, false)
            });
            match resolved.await {
                Ok(response) => Ok(Json(response)),
                Err(e) => {
                    tracing::error!("assistant task failed: {}", e);
                    Err(api_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "assistant task failed",
                    ))
                }
            }
        }
    }
}

async fn complete(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompleteRequest>,
) -> Json<CompleteResponse> {
    let session = state.session.lock().await;
    Json(CompleteResponse {
        completion: session.complete(&req.prefix),
    })
}

async fn history_prev(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RecallRequest>>,
) -> Json<RecallResponse> {
    let draft = body.map(|Json(r)| r.draft).unwrap_or_default();
    let mut session = state.session.lock().await;
    Json(RecallResponse {
        input: session.history_prev(&draft),
    })
}

async fn history_next(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RecallRequest>>,
) -> Json<RecallResponse> {
    let draft = body.map(|Json(r)| r.draft).unwrap_or_default();
    let mut session = state.session.lock().await;
    Json(RecallResponse {
        input: session.history_next(&draft),
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/transcript", get(transcript))
        .route("/api/submit", post(submit))
        .route("/api/complete", post(complete))
        .route("/api/history/prev", post(history_prev))
        .route("/api/history/next", post(history_next))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(session: Session, port: u16) -> Result<()> {
    let app = router(AppState::new(session));
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "server listening");
    println!("termfolio server listening on http://{}", addr);
    println!("Endpoints:");
    println!("  GET  /health            - Liveness");
    println!("  GET  /api/transcript    - Current transcript + state");
    println!("  POST /api/submit        - Run a command line");
    println!("  POST /api/complete      - Tab completion");
    println!("  POST /api/history/prev  - Recall older entry");
    println!("  POST /api/history/next  - Recall newer entry");
    println!("Press Ctrl-C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
