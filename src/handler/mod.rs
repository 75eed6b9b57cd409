use crate::app::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub mod call;
pub mod voicemail;

/// Instruction returned to the provider for an incoming call: play the
/// greeting, then record and post the result to the callback URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct IncomingResponse {
    pub play: String,
    pub next: RecordDirective,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordDirective {
    pub record: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/incoming_call",
            get(call::incoming_call).post(call::incoming_call),
        )
        .route("/voicemail", post(voicemail::voicemail))
        .route("/healthz", get(healthz))
}

pub(crate) const APPLICATION_JSON_UTF8: &str = "application/json; charset=utf-8";

pub(crate) fn json_utf8(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, APPLICATION_JSON_UTF8)],
        body,
    )
        .into_response()
}

/// `GET /healthz` — liveness probe. Does not touch the object store or the
/// webhook so it stays green while upstreams are down.
async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let uptime_seconds = (Utc::now() - state.started_at).num_seconds();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "uptime_seconds": uptime_seconds,
            "version": crate::version::get_short_version(),
        })),
    )
}
