use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use demo_runner::{
    CodeExecutionService, CodeRunner, ExecutionRequest, ExecutionResult, LanguageInfo, Outcome,
    SandboxConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Startup and listener failures; request-level failures travel in `DemoResponse`
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Execution error: {0}")]
    ExecutionError(#[from] demo_runner::Error),
    #[error("Server error: {0}")]
    ServerError(String),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DemoRequest {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub input_data: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoResponse {
    /// `success` whenever the program ran to completion, whatever its exit code
    pub status: String,
    pub output: String,
    pub errors: Option<String>,
    pub execution_time: String,
    pub exit_code: Option<i32>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl DemoResponse {
    fn from_result(result: ExecutionResult, runner: &dyn CodeRunner) -> Self {
        let error = match &result.outcome {
            Outcome::TimedOut => Some(format!(
                "code execution timeout ({}s limit)",
                runner.timeout().as_secs()
            )),
            other => other.describe(),
        };

        Self {
            status: if result.outcome.is_completed() {
                "success"
            } else {
                "error"
            }
            .to_string(),
            output: result.stdout,
            errors: result.stderr,
            execution_time: result.execution_time,
            exit_code: result.exit_code,
            outcome: result.outcome,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
}

#[derive(Clone)]
pub struct AppState {
    runner: Arc<dyn CodeRunner>,
}

impl AppState {
    pub fn new(runner: Arc<dyn CodeRunner>) -> Self {
        Self { runner }
    }
}

pub async fn create_app(config: SandboxConfig) -> Result<Router, ServerError> {
    let service = CodeExecutionService::new(config)
        .await
        .map_err(ServerError::ExecutionError)?;

    Ok(router(AppState::new(Arc::new(service))))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/languages", get(languages))
        .route("/api/demo/run", post(run_demo))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;
    serve(listener, app).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::ServerError(e.to_string()))?;
    info!("Starting demo runner server on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "services": { "demo_runner": "active" }
    }))
}

async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: state.runner.languages(),
    })
}

async fn run_demo(
    State(state): State<AppState>,
    Json(payload): Json<DemoRequest>,
) -> Json<DemoResponse> {
    let request = ExecutionRequest {
        language: payload.language,
        code: payload.code,
        input: payload.input_data,
    };

    let result = state.runner.run(request).await;
    Json(DemoResponse::from_result(result, state.runner.as_ref()))
}
