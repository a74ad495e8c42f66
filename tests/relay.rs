use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use home_sense::api::{self, AppState};
use home_sense::config::QueryFormat;
use home_sense::reading::Reading;
use home_sense::room::RoomState;
use home_sense::scan::{Advertisement, ScanListener};
use home_sense::store::RoomStateStore;
use home_sense::switchbot::SWITCHBOT_MANUFACTURER_DATA_COMPANY_ID;
use home_sense::uploader::{UploadError, UploadOutcome, Uploader};
use macaddr::MacAddr6;
use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;

const API_KEY: &str = "test-secret";
const DEVICE: MacAddr6 = MacAddr6::new(0xb0, 0xe9, 0xfe, 0xdc, 0x15, 0x36);

struct Server {
    base_url: String,
    store: Arc<RoomStateStore>,
}

async fn spawn_server(api_key: &str, query_format: QueryFormat) -> Server {
    let store = Arc::new(RoomStateStore::new());
    let state = AppState::new(store.clone(), api_key, query_format);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(api::serve(listener, state, std::future::pending()));

    Server { base_url, store }
}

fn room_url(server: &Server, room_id: &str) -> String {
    format!("{}/api/room/{room_id}", server.base_url)
}

async fn post(server: &Server, room_id: &str, api_key: Option<&str>, body: &str) -> StatusCode {
    let mut request = reqwest::Client::new()
        .post(room_url(server, room_id))
        .header("Content-Type", "application/json")
        .body(body.to_string());
    if let Some(key) = api_key {
        request = request.header("X-Api-Key", key);
    }
    request.send().await.unwrap().status()
}

async fn get(server: &Server, room_id: &str) -> reqwest::Response {
    reqwest::get(room_url(server, room_id)).await.unwrap()
}

fn reading(co2_ppm: u16) -> Reading {
    Reading {
        device_address: DEVICE,
        co2_ppm,
        temperature_celsius: 21.8,
        humidity_percent: 42,
        source_timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn liveness() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;

    let response = reqwest::get(format!("{}/", server.base_url)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "home-sense server OK");
}

#[tokio::test]
async fn post_then_get() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;

    let status = post(
        &server,
        "piramura-room",
        Some(API_KEY),
        r#"{"co2Ppm":693,"temperature":21.8,"humidity":42}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let response = get(&server, "piramura-room").await;
    assert_eq!(response.status(), StatusCode::OK);
    let state: RoomState = response.json().await.unwrap();
    assert_eq!(state.room_id, "piramura-room");
    assert_eq!(state.co2_ppm, 693.0);
    assert_eq!(state.temperature, 21.8);
    assert_eq!(state.humidity, 42.0);
    assert_eq!(state.source_time, None);

    assert_eq!(get(&server, "other").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn csv_deployment_renders_plain_line() {
    let server = spawn_server(API_KEY, QueryFormat::Csv).await;

    post(
        &server,
        "piramura-room",
        Some(API_KEY),
        r#"{"co2Ppm":693,"temperature":21.8,"humidity":42}"#,
    )
    .await;

    let response = get(&server, "piramura-room").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "693,21.8,42");
}

#[tokio::test]
async fn wrong_key_is_unauthorized() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;
    let body = r#"{"co2Ppm":693,"temperature":21.8,"humidity":42}"#;

    assert_eq!(
        post(&server, "piramura-room", Some("wrong"), body).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        post(&server, "piramura-room", None, body).await,
        StatusCode::UNAUTHORIZED
    );
    assert!(server.store.get("piramura-room").is_none());
}

#[tokio::test]
async fn unconfigured_key_rejects_every_post() {
    let server = spawn_server("", QueryFormat::Json).await;
    let body = r#"{"co2Ppm":693,"temperature":21.8,"humidity":42}"#;

    assert_eq!(
        post(&server, "piramura-room", Some(""), body).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        post(&server, "piramura-room", Some(API_KEY), body).await,
        StatusCode::UNAUTHORIZED
    );
    assert!(server.store.rooms().is_empty());
}

#[tokio::test]
async fn invalid_values_are_rejected_and_state_kept() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;
    post(
        &server,
        "room-a",
        Some(API_KEY),
        r#"{"co2Ppm":693,"temperature":21.8,"humidity":42}"#,
    )
    .await;
    let before = server.store.get("room-a").unwrap();

    for body in [
        json!({"co2Ppm": -1, "temperature": 21.8, "humidity": 42}),
        json!({"co2Ppm": 10001, "temperature": 21.8, "humidity": 42}),
        json!({"co2Ppm": 693, "temperature": 61, "humidity": 42}),
        json!({"co2Ppm": 693, "temperature": 21.8, "humidity": 101}),
        json!({"co2Ppm": 693, "temperature": "warm", "humidity": 42}),
        json!({"co2Ppm": 693, "humidity": 42}),
    ] {
        let response = reqwest::Client::new()
            .post(room_url(&server, "room-a"))
            .header("X-Api-Key", API_KEY)
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.text().await.unwrap(), "invalid range");
    }

    assert_eq!(server.store.get("room-a"), Some(before));
}

#[tokio::test]
async fn uploader_pushes_to_server() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;
    let uploader = Uploader::new(&server.base_url, API_KEY, Duration::from_secs(5)).unwrap();

    let outcome = uploader.upload("piramura-room", &reading(693)).await.unwrap();

    assert_eq!(outcome, UploadOutcome::Sent);
    let stored = server.store.get("piramura-room").unwrap();
    assert_eq!(stored.device_address, "B0:E9:FE:DC:15:36");
    assert_eq!(stored.co2_ppm, 693.0);
    assert_eq!(stored.temperature, 21.8);
    assert_eq!(stored.humidity, 42.0);
    assert!(stored.source_time.is_some());
}

#[tokio::test]
async fn uploader_reports_rejection_status() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;
    let uploader = Uploader::new(&server.base_url, "wrong", Duration::from_secs(5)).unwrap();

    let result = uploader.upload("piramura-room", &reading(693)).await;

    assert!(matches!(
        result,
        Err(UploadError::Status(status)) if status == StatusCode::UNAUTHORIZED
    ));
    assert!(server.store.get("piramura-room").is_none());
}

#[tokio::test]
async fn uploader_without_key_never_reaches_server() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;
    let uploader = Uploader::new(&server.base_url, "", Duration::from_secs(5)).unwrap();

    let outcome = uploader.upload("piramura-room", &reading(693)).await.unwrap();

    assert_eq!(outcome, UploadOutcome::Skipped);
    assert!(server.store.get("piramura-room").is_none());
}

#[tokio::test]
async fn advertisement_reaches_server() {
    let server = spawn_server(API_KEY, QueryFormat::Json).await;
    let uploader = Uploader::new(&server.base_url, API_KEY, Duration::from_secs(5)).unwrap();
    let listener = ScanListener::new(DEVICE, "piramura-room", uploader);
    listener.start();

    let frame = vec![
        0xb0, 0xe9, 0xfe, 0xdc, 0x15, 0x36, 0x9c, 0x03, 0x08, 0x95, 0x2a, 0x00, 0x00, 0x02, 0xb5,
        0x00,
    ];
    let dispatched = listener.on_advertisement(&Advertisement {
        manufacturer_data: HashMap::from([(SWITCHBOT_MANUFACTURER_DATA_COMPANY_ID, frame)]),
        rssi: Some(-70),
    });
    assert_eq!(dispatched.len(), 1);

    // The upload runs detached; wait for it to land.
    let mut stored = None;
    for _ in 0..50 {
        stored = server.store.get("piramura-room");
        if stored.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let stored = stored.expect("upload did not reach the server");
    assert_eq!(stored.co2_ppm, 693.0);
    assert_eq!(stored.temperature, 21.8);
    assert_eq!(stored.humidity, 42.0);
}
