use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use remate_aggregation::{CategoryDetail, GlobalStats, Granularity, PriceComparison, TrendTable};
use remate_core::parse_fecha;
use remate_store::AuctionFilter;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VenueParams {
    pub recinto: Option<String>,
}

#[derive(Deserialize)]
pub struct TrendParams {
    pub recinto: Option<String>,
    /// Range start, `DD/MM/YY`.
    pub from: Option<String>,
    /// Range end, `DD/MM/YY`.
    pub to: Option<String>,
}

#[derive(Deserialize)]
pub struct DetailParams {
    pub id: String,
    pub categoria: String,
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => parse_fecha(s)
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("Fecha inválida en '{name}': {s}"))),
    }
}

/// GET /prices/comparison?recinto=TEMUCO
///
/// Species price table over the most recent auctions: weight-weighted
/// within each auction, simple mean across them.
pub async fn comparison(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VenueParams>,
) -> Result<Json<PriceComparison>, AppError> {
    let filter = params.recinto.map(AuctionFilter::recinto);
    let auctions = state.store.list(filter.as_ref())?;
    let window = state.config.aggregation.recent_auction_window;
    Ok(Json(PriceComparison::compute(&auctions, window)))
}

/// GET /prices/trend?recinto=TEMUCO&from=01/01/24&to=30/06/24
///
/// Time-bucketed trend series. Bounded spans up to six months chart per
/// day; longer or open-ended ranges chart per calendar month.
pub async fn trend(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendTable>, AppError> {
    let from = parse_bound(params.from.as_deref(), "from")?;
    let to = parse_bound(params.to.as_deref(), "to")?;

    let filter = params.recinto.map(AuctionFilter::recinto);
    let auctions = state.store.list(filter.as_ref())?;

    let granularity =
        Granularity::for_span(from, to, state.config.aggregation.daily_granularity_max_days);
    Ok(Json(TrendTable::compute(&auctions, from, to, granularity)))
}

/// GET /prices/detail?id=...&categoria=NOVILLO
///
/// Per-auction category detail: full average, premium price over the top
/// lots, and the top individual prices.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DetailParams>,
) -> Result<Json<CategoryDetail>, AppError> {
    let auction = state
        .store
        .get_by_id(&params.id)?
        .ok_or_else(|| AppError::not_found(format!("Remate '{}' no existe", params.id)))?;
    Ok(Json(CategoryDetail::compute(
        &auction,
        &params.categoria,
        &state.config.aggregation,
    )))
}

/// GET /stats?recinto=TEMUCO
///
/// Headline dashboard figures over the (optionally venue-filtered) set.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VenueParams>,
) -> Result<Json<GlobalStats>, AppError> {
    let filter = params.recinto.map(AuctionFilter::recinto);
    let auctions = state.store.list(filter.as_ref())?;
    Ok(Json(GlobalStats::compute(&auctions)))
}
