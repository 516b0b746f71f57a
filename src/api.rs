use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::engine::ExecutionEngine;
use crate::services::reporting::ActivityReporter;

pub struct AppState {
    pub engine: Arc<ExecutionEngine>,
    pub reporter: ActivityReporter,
    pub config: AppConfig,
}

pub async fn run_server(state: Arc<AppState>) {
    let port = state.config.server_port;

    let app = Router::new()
        .route("/api/command", post(process_command))
        .route("/api/market-data/{symbol}", get(get_market_data))
        .route("/api/trades/{user_id}", get(get_trades))
        .route("/api/balances/{user_id}", get(get_balances))
        .route("/api/report", get(get_report))
        .route("/health", get(health))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap();
    info!("API Server listening on port {}", port);
    axum::serve(listener, app).await.unwrap();
}

#[derive(serde::Deserialize)]
struct VoiceCommand {
    command: String,
    user_id: Option<String>,
}

/// The voice/UI boundary: a transcribed utterance in, a structured result
/// (including the speakable `response_text`) out.
async fn process_command(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VoiceCommand>,
) -> impl IntoResponse {
    let user_id = body.user_id.unwrap_or_else(|| "guest".to_string());
    let result = state.engine.interpret_command(&body.command, &user_id).await;
    Json(result).into_response()
}

async fn get_market_data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    // Accept "btc", "bitcoin", "BTC-USDT" or "BTC/USDT"
    let token = symbol.replace('-', "/");
    let pair = match state.engine.symbols().resolve(&token) {
        Some(pair) => pair.clone(),
        None => {
            return (
                axum::http::StatusCode::NOT_FOUND,
                Json(json!({"error": "unknown_symbol", "symbol": symbol})),
            )
                .into_response();
        }
    };

    match state.engine.cache().get(&pair.symbol) {
        Some(quote) => Json(quote).into_response(),
        None => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "market_data_unavailable", "symbol": pair.symbol})),
        )
            .into_response(),
    }
}

#[derive(serde::Deserialize)]
struct PageParams {
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn get_trades(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(state.config.history_page_limit);
    let offset = params.offset.unwrap_or(0);
    let trades = state.engine.ledger().history(&user_id, limit, offset).await;
    Json(trades).into_response()
}

async fn get_balances(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let balances = state.engine.ledger().balances(&user_id).await;
    Json(balances).into_response()
}

async fn get_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.reporter.summary()).into_response()
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"})).into_response()
}
