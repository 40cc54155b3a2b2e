// content-analyzer-rs/src/main.rs
// Content Analyzer service - HTTP entry point
//
// Exposes a single analysis endpoint that forwards content to a hosted Claude
// model with a fixed SEO prompt and returns the structured assessment.

use axum::{
    extract::State,
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

mod handler;
mod model_client;

use handler::analyze;
use model_client::{ModelClient, ModelInvoker};

// Track service start time for uptime reporting
static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn ModelInvoker>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: i64,
    pub status: String,
}

/// POST /analyze - Analyze content for SEO via the model endpoint
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<Value>,
) -> impl IntoResponse {
    match analyze(&event, state.model.as_ref()).await {
        Ok(report) => (
            StatusCode::OK,
            [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(report),
        )
            .into_response(),
        Err(err) => {
            if err.status() == StatusCode::INTERNAL_SERVER_ERROR {
                log::error!("Analysis failed: {}", err);
            } else {
                log::info!("Rejected request: {}", err);
            }
            err.to_response().into_response()
        }
    }
}

/// GET /health - Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = START_TIME.elapsed().as_secs() as i64;
    let configured = state.model.is_configured();
    let status = if configured { "SERVING" } else { "DEGRADED" };

    Json(HealthResponse {
        healthy: configured,
        service_name: "content-analyzer".to_string(),
        uptime_seconds: uptime,
        status: status.to_string(),
    })
}

/// GET / - Root endpoint
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "Content Analyzer",
        "version": "0.1.0",
        "endpoints": [
            "GET /health",
            "POST /analyze"
        ]
    }))
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/analyze", post(analyze_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let _ = *START_TIME;

    let addr = config_rs::get_bind_address("ANALYZER", 8090);

    // One model client for the process lifetime, shared across requests
    let state = Arc::new(AppState {
        model: Arc::new(ModelClient::new()),
    });

    log::info!("Content analyzer starting on {}", addr);
    println!("Content analyzer listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
