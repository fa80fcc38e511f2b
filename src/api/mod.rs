use crate::config::ResponseEncoding;
use crate::state::ThingState;
use crate::subscription::ChangeFeed;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state for all thing routes.
///
/// The Thing Description is immutable after startup; the counter state is
/// the only mutable resource and serializes its own mutations.
#[derive(Clone)]
pub struct AppState {
    pub description: Arc<Value>,
    pub state: Arc<ThingState>,
    pub encoding: ResponseEncoding,
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the thing router: TD retrieval, property reads, action
/// invocations and the change event stream, all under `/<thing-name>`.
pub fn create_router(thing_name: &str, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let base = format!("/{}", thing_name);

    Router::new()
        .route(&base, get(get_description))
        .route(&format!("{}/properties/result", base), get(get_result))
        .route(&format!("{}/properties/lastChange", base), get(get_last_change))
        .route(&format!("{}/actions/add", base), post(add))
        .route(&format!("{}/actions/subtract", base), post(subtract))
        .route(&format!("{}/events/change", base), get(change_events))
        .fallback(not_found)
        .layer(cors)
        .with_state(Arc::new(state))
}

/// GET /<thing-name> - the immutable Thing Description
async fn get_description(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json((*state.description).clone())
}

/// GET /<thing-name>/properties/result
async fn get_result(State(state): State<Arc<AppState>>) -> Response {
    encode_number(state.encoding, state.state.read().counter)
}

/// GET /<thing-name>/properties/lastChange
async fn get_last_change(State(state): State<Arc<AppState>>) -> Response {
    let last_change = state
        .state
        .read()
        .last_change
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    encode_string(state.encoding, &last_change)
}

/// POST /<thing-name>/actions/add - add the operand to the counter
async fn add(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, AppError> {
    let operand = parse_operand(&body)?;
    let counter = state.state.apply(operand);
    info!(operand, counter, "add action invoked");
    Ok(encode_number(state.encoding, counter))
}

/// POST /<thing-name>/actions/subtract - subtract the operand from the counter
async fn subtract(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, AppError> {
    let operand = parse_operand(&body)?;
    let counter = state.state.apply(-operand);
    info!(operand, counter, "subtract action invoked");
    Ok(encode_number(state.encoding, counter))
}

/// GET /<thing-name>/events/change - long-lived change event stream.
///
/// The wire format is fixed by the thing contract (`Result: <n>\n\n`
/// frames), so the body is framed by the change feed itself rather than
/// the axum SSE event builder. Dropping the connection drops the feed and
/// with it the subscription.
async fn change_events(State(state): State<Arc<AppState>>) -> Response {
    info!("change event subscriber connected");
    let feed = ChangeFeed::new(state.state.subscribe());
    let frames = feed.into_frames().map(Ok::<_, Infallible>);

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}

/// Fallback for paths outside the thing's interaction surface
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "endpoint not found".to_string(),
        }),
    )
        .into_response()
}

/// Parse the action operand from the raw request body.
///
/// The operand is bare integer text; anything else rejects the request
/// without touching the counter.
fn parse_operand(body: &Bytes) -> Result<i64, AppError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| AppError::InvalidOperand("operand is not valid UTF-8".to_string()))?;

    text.trim()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidOperand(format!("expected an integer operand, got {:?}", text)))
}

/// Encode a numeric response per the configured wire variant
fn encode_number(encoding: ResponseEncoding, value: i64) -> Response {
    match encoding {
        ResponseEncoding::Json => Json(value).into_response(),
        ResponseEncoding::Text => value.to_string().into_response(),
    }
}

/// Encode a string response per the configured wire variant
fn encode_string(encoding: ResponseEncoding, value: &str) -> Response {
    match encoding {
        ResponseEncoding::Json => Json(value).into_response(),
        ResponseEncoding::Text => value.to_string().into_response(),
    }
}

/// Application error types
#[derive(Debug)]
enum AppError {
    InvalidOperand(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidOperand(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
