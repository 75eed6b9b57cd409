use anyhow::{Context, Result};
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Local;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, error, info};
use url::Url;
use uuid::Uuid;

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct VoicemailParams {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub wav: Option<String>,
}

/// `POST /voicemail` — the provider reports a finished recording. Download
/// the audio, archive it, announce it in chat.
///
/// Missing or empty `from`/`wav` is a client error and has no side effects.
/// Any upstream failure fails this request only; the service keeps serving.
pub async fn voicemail(State(state): State<AppState>, Form(params): Form<VoicemailParams>) -> Response {
    let from = params.from.unwrap_or_default();
    let wav = params.wav.unwrap_or_default();
    if from.is_empty() || wav.is_empty() {
        info!("rejecting voicemail notification with missing from/wav");
        return StatusCode::BAD_REQUEST.into_response();
    }

    info!(from = %from, "incoming voicemail");
    match ingest(&state, &from, &wav).await {
        Ok(url) => {
            info!(url = %url, "voicemail archived and announced");
            super::json_utf8(StatusCode::OK, String::new())
        }
        Err(e) => {
            error!(from = %from, "voicemail ingest failed: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

async fn ingest(state: &AppState, from: &str, wav: &str) -> Result<String> {
    let config = &state.config;

    let wav_url = Url::parse(wav).context("parse recording URL")?;
    debug!(url = %wav_url, "retrieving recording");
    let response = state
        .client
        .get(wav_url)
        .basic_auth(&config.provider.username, Some(&config.provider.password))
        .send()
        .await
        .context("fetch recording")?;
    let status = response.status();
    let audio = response.bytes().await.context("read recording body")?;
    debug!(%status, bytes = audio.len(), "recording downloaded");

    let key = object_key(config.unique_keys);
    let public_url = timeout(
        state.outbound_timeout(),
        state.storage.write(&key, audio, "audio/wav"),
    )
    .await
    .context("object store write timed out")?
    .context("store recording")?;

    let text = format!("New voice message from {} <{}>!", from, public_url);
    state
        .notifier
        .send(&text)
        .await
        .context("send chat notification")?;

    Ok(public_url)
}

/// Object key for a voicemail: `voicemail/<YYYYMMDDHHMMSS>.wav`, matching
/// the bucket layout of existing deployments. With `unique` set, a random
/// tag keeps same-second arrivals from overwriting each other.
pub(crate) fn object_key(unique: bool) -> String {
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    if unique {
        let tag = Uuid::new_v4().simple().to_string();
        format!("voicemail/{}-{}.wav", stamp, &tag[..8])
    } else {
        format!("voicemail/{}.wav", stamp)
    }
}
