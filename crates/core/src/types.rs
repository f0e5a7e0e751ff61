//! Core data types for the remates system.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Parse a feed date in `DD/MM/YY` (or `DD/MM/YYYY`) form.
///
/// Two-digit years are interpreted as `2000 + YY`. Returns `None` when the
/// string is not three slash-separated numeric parts or the parts do not
/// form a valid calendar date.
pub fn parse_fecha(fecha: &str) -> Option<NaiveDate> {
    let mut parts = fecha.split('/');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let mut year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// One transacted batch of animals within an auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Lot number as printed in the feed.
    #[serde(rename = "numeroLote")]
    pub numero_lote: u32,
    /// Head count.
    pub cantidad: u32,
    /// Aggregate weight for the lot (kg).
    pub peso: f64,
    /// Unit price (currency per kg). Zero = unsold/no-bid.
    pub precio: f64,
    /// Seller (consignatario) name.
    pub vendedor: String,
    /// Species/class label, e.g. "NOVILLO GORDO".
    #[serde(rename = "tipoLote")]
    pub tipo_lote: String,
}

impl Lot {
    /// Total value of the lot (weight times unit price).
    #[inline]
    pub fn value(&self) -> f64 {
        self.peso * self.precio
    }
}

/// Authoritative pre-aggregated figures for one category within one auction.
///
/// Source feeds truncate the itemized lot list to the top entries only, so
/// when a summary is present its figures cover *all* animals of the category
/// and must never be recomputed from the lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category label.
    pub descripcion: String,
    /// Total head count across all animals of the category.
    #[serde(rename = "cantidadtotal")]
    pub cantidad_total: u32,
    /// Total weight across all animals of the category (kg).
    #[serde(rename = "pesototal")]
    pub peso_total: f64,
    /// Weighted-average price across all animals of the category.
    #[serde(rename = "pptotal")]
    pub pp_total: f64,
}

/// One auction event at one venue on one date.
///
/// Created at ingestion, persisted once, immutable thereafter except for
/// whole-record deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    /// Opaque unique identifier, assigned at ingestion.
    pub id: String,
    /// Venue, normalized upper-case.
    pub recinto: String,
    /// Auction date in `DD/MM/YY` form.
    pub fecha: String,
    /// Total head count. Authoritative when the feed declares it, else the
    /// sum of lot quantities.
    #[serde(rename = "totalAnimales")]
    pub total_animales: u32,
    /// Total weight (kg), same authoritative-or-derived rule.
    #[serde(rename = "totalKilos")]
    pub total_kilos: f64,
    /// Lots in feed order.
    pub lots: Vec<Lot>,
    /// Optional authoritative per-category summaries. Absent means every
    /// figure is computed from `lots`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summaries: Option<Vec<CategorySummary>>,
}

impl Auction {
    /// Look up the authoritative summary for a category, if any.
    pub fn summary_for(&self, categoria: &str) -> Option<&CategorySummary> {
        self.summaries
            .as_deref()?
            .iter()
            .find(|s| s.descripcion == categoria)
    }

    /// Parsed auction date. `None` when `fecha` is not a valid `DD/MM/YY`.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_fecha(&self.fecha)
    }

    /// Lots belonging to the given category, in feed order.
    pub fn lots_in<'a>(&'a self, categoria: &'a str) -> impl Iterator<Item = &'a Lot> {
        self.lots.iter().filter(move |l| l.tipo_lote == categoria)
    }
}

/// A live video transmission (chat-channel collaborator entity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStream {
    pub id: String,
    /// Video reference (YouTube URL).
    pub youtube_url: String,
    pub title: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One comment on a live stream (chat-channel collaborator entity).
///
/// Comments are an append-only log; no aggregation is ever performed over
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamComment {
    pub id: String,
    pub stream_id: String,
    pub author_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
