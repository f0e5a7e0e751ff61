//! Feed format detection and parse dispatch.
//!
//! Parsing is a pure function of the file content plus caller-supplied
//! fallback metadata; the caller supplies the date, so nothing here depends
//! on the clock.

use remate_core::{Auction, CategorySummary, Error, Lot, Result};

use crate::{csv_feed, xml_feed};

/// Supported feed formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Csv,
    Xml,
}

impl FeedFormat {
    /// Detect the feed format from the declared MIME type or, failing that,
    /// the filename extension.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>) -> Result<FeedFormat> {
        if let Some(mime) = content_type {
            let mime = mime.split(';').next().unwrap_or("").trim();
            match mime {
                "text/csv" => return Ok(FeedFormat::Csv),
                "application/xml" | "text/xml" => return Ok(FeedFormat::Xml),
                _ => {}
            }
        }
        if let Some(name) = filename {
            let name = name.to_ascii_lowercase();
            if name.ends_with(".csv") {
                return Ok(FeedFormat::Csv);
            }
            if name.ends_with(".xml") {
                return Ok(FeedFormat::Xml);
            }
        }
        Err(Error::UnsupportedFormat)
    }
}

/// Caller-supplied metadata used when the feed carries none of its own.
#[derive(Debug, Clone)]
pub struct FallbackMeta {
    /// Venue to assume, upper-cased on use.
    pub recinto: String,
    /// Date to assume, `DD/MM/YY`.
    pub fecha: String,
}

impl Default for FallbackMeta {
    fn default() -> Self {
        Self {
            recinto: "DESCONOCIDO".to_string(),
            fecha: "01/01/70".to_string(),
        }
    }
}

impl FallbackMeta {
    /// Build fallback metadata from optional form fields.
    pub fn from_fields(recinto: Option<String>, fecha: Option<String>) -> Self {
        let defaults = FallbackMeta::default();
        Self {
            recinto: recinto.unwrap_or(defaults.recinto),
            fecha: fecha.unwrap_or(defaults.fecha),
        }
    }
}

/// A fully parsed feed: an [`Auction`] draft without an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    pub recinto: String,
    pub fecha: String,
    pub total_animales: u32,
    pub total_kilos: f64,
    pub lots: Vec<Lot>,
    pub summaries: Option<Vec<CategorySummary>>,
}

impl ParsedFeed {
    /// Promote the draft to a persistable auction record.
    pub fn into_auction(self, id: String) -> Auction {
        Auction {
            id,
            recinto: self.recinto,
            fecha: self.fecha,
            total_animales: self.total_animales,
            total_kilos: self.total_kilos,
            lots: self.lots,
            summaries: self.summaries,
        }
    }

    /// Derive totals by summing over the lot list.
    pub(crate) fn summed_totals(lots: &[Lot]) -> (u32, f64) {
        let animales = lots.iter().map(|l| l.cantidad).sum();
        let kilos = lots.iter().map(|l| l.peso).sum();
        (animales, kilos)
    }
}

/// Parse one uploaded feed into an auction draft.
///
/// Structural errors abort the whole import; no partial result is ever
/// returned.
pub fn parse_feed(content: &str, format: FeedFormat, fallback: &FallbackMeta) -> Result<ParsedFeed> {
    match format {
        FeedFormat::Csv => csv_feed::parse(content, fallback),
        FeedFormat::Xml => xml_feed::parse(content, fallback),
    }
}
