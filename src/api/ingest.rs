use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use log::{info, warn};

use crate::api::{AppState, IngestError};
use crate::room::{RoomState, RoomUpdate};
use crate::uploader::API_KEY_HEADER;

/// `POST /api/room/{roomId}`
pub async fn ingest(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, IngestError> {
    if let Err(err) = authorize(&headers, &state.api_key) {
        warn!("invalid POST from {peer}");
        return Err(err);
    }

    let update = parse_update(&body)?;
    let room_state = RoomState::from_update(room_id.clone(), update, Utc::now());

    info!(
        "[update] {room_id} co2={} temp={} hum={}",
        room_state.co2_ppm, room_state.temperature, room_state.humidity
    );
    state.store.set(room_id, room_state);

    Ok(StatusCode::NO_CONTENT)
}

fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), IngestError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if !expected.is_empty() && key == expected => Ok(()),
        _ => Err(IngestError::Unauthorized),
    }
}

fn parse_update(body: &[u8]) -> Result<RoomUpdate, IngestError> {
    let update: RoomUpdate =
        serde_json::from_slice(body).map_err(|_| IngestError::InvalidRange)?;

    if !update.is_in_range() {
        return Err(IngestError::InvalidRange);
    }

    Ok(update)
}
