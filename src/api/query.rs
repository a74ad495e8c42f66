use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::info;

use crate::api::AppState;
use crate::config::QueryFormat;

/// `GET /api/room/{roomId}`, unauthenticated.
pub async fn query(State(state): State<AppState>, Path(room_id): Path<String>) -> Response {
    let Some(room) = state.store.get(&room_id) else {
        info!("[get] {room_id} miss");
        return StatusCode::NOT_FOUND.into_response();
    };
    info!("[get] {room_id} hit");

    match state.query_format {
        QueryFormat::Json => Json(room.as_ref()).into_response(),
        QueryFormat::Csv => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            room.to_csv_line(),
        )
            .into_response(),
    }
}
