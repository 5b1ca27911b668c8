//! Stand-in for the reservation server's `available_pcs` endpoint.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
pub(crate) enum RoomReply {
    Json(Value),
    Body(&'static str),
}

#[derive(Clone, Default)]
pub(crate) struct MockServerState {
    rooms: Arc<HashMap<String, RoomReply>>,
    cookies: Arc<Mutex<Vec<String>>>,
    hits: Arc<Mutex<Vec<String>>>,
}

impl MockServerState {
    pub(crate) async fn cookies(&self) -> Vec<String> {
        self.cookies.lock().await.clone()
    }

    pub(crate) async fn hits(&self) -> Vec<String> {
        self.hits.lock().await.clone()
    }
}

async fn available_pcs(
    State(state): State<MockServerState>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.hits.lock().await.push(room_id.clone());
    if let Some(cookie) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        state.cookies.lock().await.push(cookie.to_string());
    }

    // Unknown rooms get the HTML 404 page, like `get_or_404` does.
    match state.rooms.get(&room_id) {
        Some(RoomReply::Json(value)) => Json(value.clone()).into_response(),
        Some(RoomReply::Body(body)) => (StatusCode::OK, *body).into_response(),
        None => (StatusCode::NOT_FOUND, "<h1>Not Found</h1>").into_response(),
    }
}

pub(crate) async fn spawn_reservation_server(
    rooms: Vec<(&str, RoomReply)>,
) -> std::io::Result<(String, MockServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = MockServerState {
        rooms: Arc::new(
            rooms
                .into_iter()
                .map(|(room, reply)| (room.to_string(), reply))
                .collect(),
        ),
        ..MockServerState::default()
    };
    let app = Router::new()
        .route("/admin/rooms/:room_id/available_pcs", get(available_pcs))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

/// A local address nothing is listening on.
pub(crate) async fn closed_server_url() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
