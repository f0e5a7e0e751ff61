use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Json;
use futures_util::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use remate_core::{LiveStream, StreamComment};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateStreamBody {
    pub youtube_url: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct DeactivateParams {
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct CommentBody {
    pub author_name: Option<String>,
    pub message: Option<String>,
}

/// GET /streams
///
/// List active transmissions, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LiveStream>>, AppError> {
    Ok(Json(state.chat.list_active()?))
}

/// POST /streams {"youtube_url": "...", "title": "..."}
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateStreamBody>,
) -> Result<Json<LiveStream>, AppError> {
    let youtube_url = body
        .youtube_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("youtube_url es requerido"))?;
    let stream = state.chat.create_stream(youtube_url, body.title)?;
    Ok(Json(stream))
}

/// DELETE /streams?id=...
///
/// Deactivate a transmission; the record and its comment log remain.
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeactivateParams>,
) -> Result<Json<Value>, AppError> {
    let id = params
        .id
        .ok_or_else(|| AppError::bad_request("id es requerido"))?;
    state.chat.deactivate(&id)?;
    Ok(Json(json!({ "success": true })))
}

/// GET /streams/{id}/comments
///
/// Full comment log for a stream, oldest first.
pub async fn comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StreamComment>>, AppError> {
    Ok(Json(state.chat.list_comments(&id)?))
}

/// POST /streams/{id}/comments {"author_name": "...", "message": "..."}
pub async fn post_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<Json<StreamComment>, AppError> {
    let (author_name, message) = match (body.author_name, body.message) {
        (Some(a), Some(m)) if !a.trim().is_empty() && !m.trim().is_empty() => (a, m),
        _ => return Err(AppError::bad_request("author_name y message son requeridos")),
    };
    let comment = state.chat.append_comment(&id, author_name, message)?;
    Ok(Json(comment))
}

/// GET /streams/{id}/comments/live
///
/// Server-sent events feed of comment inserts. The subscription is
/// cancelled when the client disconnects and the receiver drops.
pub async fn live_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.chat.subscribe(&id)?;
    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(comment) => match Event::default().json_data(&comment) {
                    Ok(event) => return Some((Ok(event), rx)),
                    // A comment that cannot serialize is dropped from the
                    // feed; the log endpoint still has it.
                    Err(_) => continue,
                },
                // Lagged subscribers skip missed inserts and keep going.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
