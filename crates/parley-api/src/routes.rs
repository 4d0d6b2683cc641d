use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde::Serialize;
use tracing::error;

use parley_types::api::{
    CountReply, FetchMessagesRequest, JoinRoomRequest, PostMessageRequest, Reply, UserCred,
};

use crate::error::Rejection;
use crate::service::AppState;

pub const NDJSON: &str = "application/x-ndjson";

/// Build the chat router. Callers add their own layers (tracing, CORS).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/rooms", post(list_rooms))
        .route("/rooms/join", post(join_room))
        .route("/messages", post(post_message))
        .route("/messages/count", post(message_count))
        .route("/messages/fetch", post(fetch_messages))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn login(State(state): State<AppState>, Json(cred): Json<UserCred>) -> Json<Reply> {
    Json(state.login(&cred))
}

pub async fn list_rooms(State(state): State<AppState>, Json(cred): Json<UserCred>) -> Response {
    match state.list_rooms(&cred) {
        Ok(rooms) => ndjson(rooms),
        Err(rejection) => rejected(rejection),
    }
}

pub async fn join_room(
    State(state): State<AppState>,
    Json(req): Json<JoinRoomRequest>,
) -> Json<Reply> {
    Json(state.join_room(&req.room, &req.cred))
}

pub async fn post_message(
    State(state): State<AppState>,
    Json(req): Json<PostMessageRequest>,
) -> Json<Reply> {
    Json(state.post_message(&req.room, &req.cred, &req.text))
}

pub async fn message_count(
    State(state): State<AppState>,
    Json(cred): Json<UserCred>,
) -> Json<CountReply> {
    Json(state.message_count(&cred))
}

pub async fn fetch_messages(
    State(state): State<AppState>,
    Json(req): Json<FetchMessagesRequest>,
) -> Response {
    match state.fetch_messages(&req.room, &req.cred, req.start_index, req.end_index) {
        Ok(messages) => ndjson(messages),
        Err(rejection) => rejected(rejection),
    }
}

pub async fn health() -> &'static str {
    "ok"
}

/// Streaming endpoints have no `Reply` envelope, so a rejection is sent as a
/// 401 whose body is the usual failure `Reply`.
fn rejected(rejection: Rejection) -> Response {
    (StatusCode::UNAUTHORIZED, Json(Reply::failure(rejection.to_string()))).into_response()
}

/// Stream `items` as newline-delimited JSON, one item per line.
fn ndjson<T>(items: Vec<T>) -> Response
where
    T: Serialize + Send + 'static,
{
    let stream = async_stream::stream! {
        for item in items {
            match serde_json::to_vec(&item) {
                Ok(mut line) => {
                    line.push(b'\n');
                    yield Ok(Bytes::from(line));
                }
                Err(e) => {
                    error!("Failed to encode stream item: {}", e);
                    yield Err(std::io::Error::other(e));
                    return;
                }
            }
        }
    };

    ([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(stream)).into_response()
}
