use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use remate_core::Auction;
use remate_ingestion::{parse_feed, FallbackMeta, FeedFormat};
use remate_store::AuctionFilter;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListParams {
    pub recinto: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

/// GET /auctions?recinto=TEMUCO
///
/// List auctions, newest first, optionally filtered by venue
/// (case-insensitive exact match).
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Auction>>, AppError> {
    let filter = params.recinto.map(AuctionFilter::recinto);
    let auctions = state.store.list(filter.as_ref())?;
    Ok(Json(auctions))
}

/// POST /auctions (multipart: `file`, optional `recinto` and `fecha`)
///
/// Parse one CSV/XML auction feed and persist the resulting record. Parse
/// failures reject the whole upload; nothing partial is ever stored.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut file: Option<(Option<String>, Option<String>, String)> = None;
    let mut recinto = None;
    let mut fecha = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Formulario inválido: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let filename = field.file_name().map(str::to_string);
                let content = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Archivo ilegible: {e}")))?;
                file = Some((content_type, filename, content));
            }
            "recinto" => {
                recinto = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::bad_request(e.to_string()))?,
                );
            }
            "fecha" => {
                fecha = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::bad_request(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (content_type, filename, content) =
        file.ok_or_else(|| AppError::bad_request("Archivo no provisto"))?;

    let format = FeedFormat::detect(content_type.as_deref(), filename.as_deref())?;
    let fallback = FallbackMeta::from_fields(recinto, fecha);
    let parsed = parse_feed(&content, format, &fallback)?;

    let auction = parsed.into_auction(Uuid::new_v4().to_string());
    let auction = state.store.save(auction)?;
    tracing::info!(id = %auction.id, recinto = %auction.recinto, "auction ingested");

    Ok(Json(json!({ "success": true, "auction": auction })))
}

/// DELETE /auctions?id=...
///
/// Delete one auction. Deleting an id that does not exist is a success:
/// deletion is idempotent by id.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Value>, AppError> {
    let id = params
        .id
        .ok_or_else(|| AppError::bad_request("ID no provisto"))?;
    let existed = state.store.delete_by_id(&id)?;
    if !existed {
        tracing::debug!(%id, "delete of nonexistent auction, treated as no-op");
    }
    Ok(Json(json!({ "success": true })))
}
