use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use tracing::debug;

use super::{IncomingResponse, RecordDirective};
use crate::app::AppState;

/// `GET|POST /incoming_call` — answer an inbound call notification with the
/// recording instruction. The inbound request is not inspected; this handler
/// performs no I/O and always succeeds.
pub async fn incoming_call(State(state): State<AppState>) -> Response {
    let config = &state.config;
    let reply = IncomingResponse {
        play: config.greeting_audio.clone(),
        next: RecordDirective {
            record: format!("{}/voicemail", config.host),
        },
    };
    debug!(play = %reply.play, record = %reply.next.record, "answering incoming call");
    super::json_utf8(
        StatusCode::OK,
        serde_json::to_string(&reply).unwrap_or_default(),
    )
}
