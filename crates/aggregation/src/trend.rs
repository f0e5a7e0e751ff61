//! Time-bucketed price trend series.
//!
//! Unlike the comparison table, a trend bucket pools ALL lots across every
//! auction that falls in the bucket and weight-averages the pool — a genuine
//! cross-auction aggregation. Buckets without data for a species yield
//! `None`, which chart consumers treat as gaps to interpolate over, never as
//! zero.

use chrono::{Datelike, NaiveDate};
use remate_core::{Auction, Lot};
use serde::{Deserialize, Serialize};

use crate::filter::species_of;
use crate::price::weighted_average;

/// Bucket width for a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// One bucket per calendar day; used for short ranges.
    Daily,
    /// One bucket per calendar month; used for year-wide and all-time views.
    Monthly,
}

impl Granularity {
    /// Classify a date range. Bounded spans up to `max_daily_days` chart per
    /// day; longer or open-ended (year/all-time) spans chart per month.
    pub fn for_span(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        max_daily_days: i64,
    ) -> Granularity {
        match (from, to) {
            (Some(f), Some(t)) if (t - f).num_days() <= max_daily_days => Granularity::Daily,
            _ => Granularity::Monthly,
        }
    }
}

/// Bucket key: a day or a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bucket {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl Bucket {
    fn for_date(date: NaiveDate, granularity: Granularity) -> Bucket {
        match granularity {
            Granularity::Daily => Bucket::Day(date),
            Granularity::Monthly => Bucket::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    fn label(&self) -> String {
        match self {
            Bucket::Day(d) => d.format("%d/%m/%y").to_string(),
            Bucket::Month { year, month } => format!("{:02}/{:02}", month, year % 100),
        }
    }
}

/// One species' values across the bucket axis. `None` = no data (gap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub especie: String,
    pub points: Vec<Option<i64>>,
}

/// Trend table: a shared bucket axis plus one series per species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendTable {
    /// Bucket labels in chronological order (`DD/MM/YY` or `MM/YY`).
    pub buckets: Vec<String>,
    pub series: Vec<TrendSeries>,
}

impl TrendTable {
    /// Compute the trend over auctions falling inside `[from, to]` (either
    /// bound optional). Auctions with unparseable dates are skipped.
    pub fn compute(
        auctions: &[Auction],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        granularity: Granularity,
    ) -> TrendTable {
        let mut in_range: Vec<(Bucket, &Auction)> = auctions
            .iter()
            .filter_map(|a| {
                let date = a.date()?;
                if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
                    return None;
                }
                Some((Bucket::for_date(date, granularity), a))
            })
            .collect();
        in_range.sort_by_key(|(bucket, _)| *bucket);

        let mut buckets: Vec<Bucket> = Vec::new();
        for (bucket, _) in &in_range {
            if buckets.last() != Some(bucket) {
                buckets.push(*bucket);
            }
        }

        let species = species_of(in_range.iter().map(|(_, a)| *a));

        let series = species
            .into_iter()
            .map(|especie| {
                let points = buckets
                    .iter()
                    .map(|bucket| {
                        let pool: Vec<&Lot> = in_range
                            .iter()
                            .filter(|(b, _)| b == bucket)
                            .flat_map(|(_, a)| a.lots_in(&especie))
                            .collect();
                        weighted_average(pool.into_iter())
                    })
                    .collect();
                TrendSeries { especie, points }
            })
            .collect();

        TrendTable {
            buckets: buckets.iter().map(Bucket::label).collect(),
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::PriceComparison;

    fn lot(tipo: &str, peso: f64, precio: f64) -> Lot {
        Lot {
            numero_lote: 0,
            cantidad: 1,
            peso,
            precio,
            vendedor: String::new(),
            tipo_lote: tipo.to_string(),
        }
    }

    fn auction(id: &str, fecha: &str, lots: Vec<Lot>) -> Auction {
        Auction {
            id: id.to_string(),
            recinto: "TEMUCO".to_string(),
            fecha: fecha.to_string(),
            total_animales: 0,
            total_kilos: 0.0,
            lots,
            summaries: None,
        }
    }

    fn date(fecha: &str) -> NaiveDate {
        remate_core::parse_fecha(fecha).unwrap()
    }

    #[test]
    fn test_granularity_classification() {
        let f = date("01/01/24");
        assert_eq!(
            Granularity::for_span(Some(f), Some(date("01/04/24")), 184),
            Granularity::Daily
        );
        assert_eq!(
            Granularity::for_span(Some(f), Some(date("31/12/24")), 184),
            Granularity::Monthly
        );
        // Open-ended ranges (year / all-time views) chart monthly.
        assert_eq!(Granularity::for_span(None, None, 184), Granularity::Monthly);
        assert_eq!(
            Granularity::for_span(Some(f), None, 184),
            Granularity::Monthly
        );
    }

    #[test]
    fn test_monthly_bucket_pools_lots_across_auctions() {
        // Two auctions in March: pooled weighted average =
        // (100*1000 + 300*1500) / 400 = 1375.
        let auctions = vec![
            auction("a1", "05/03/24", vec![lot("NOVILLO", 100.0, 1000.0)]),
            auction("a2", "19/03/24", vec![lot("NOVILLO", 300.0, 1500.0)]),
        ];
        let table = TrendTable::compute(&auctions, None, None, Granularity::Monthly);
        assert_eq!(table.buckets, vec!["03/24"]);
        assert_eq!(table.series[0].points, vec![Some(1375)]);
    }

    #[test]
    fn test_pooled_bucket_differs_from_simple_mean() {
        // The two aggregation modes must disagree when per-auction weights
        // differ: pooled gives 1375, the comparison table's simple mean of
        // per-auction prices gives 1250.
        let auctions = vec![
            auction("a1", "05/03/24", vec![lot("NOVILLO", 100.0, 1000.0)]),
            auction("a2", "19/03/24", vec![lot("NOVILLO", 300.0, 1500.0)]),
        ];
        let trend = TrendTable::compute(&auctions, None, None, Granularity::Monthly);
        let comparison = PriceComparison::compute(&auctions, 5);
        assert_eq!(trend.series[0].points[0], Some(1375));
        assert_eq!(comparison.rows[0].promedio, 1250);
    }

    #[test]
    fn test_daily_buckets_and_gaps() {
        let auctions = vec![
            auction("a1", "05/03/24", vec![lot("NOVILLO", 100.0, 1000.0)]),
            auction(
                "a2",
                "07/03/24",
                vec![lot("VAQUILLA", 200.0, 900.0), lot("NOVILLO", 50.0, 1100.0)],
            ),
        ];
        let table = TrendTable::compute(&auctions, None, None, Granularity::Daily);
        assert_eq!(table.buckets, vec!["05/03/24", "07/03/24"]);
        let vaquilla = table
            .series
            .iter()
            .find(|s| s.especie == "VAQUILLA")
            .unwrap();
        // No VAQUILLA data on the first day: a gap, not zero.
        assert_eq!(vaquilla.points, vec![None, Some(900)]);
    }

    #[test]
    fn test_date_range_filter() {
        let auctions = vec![
            auction("a1", "05/01/24", vec![lot("NOVILLO", 100.0, 1000.0)]),
            auction("a2", "05/06/24", vec![lot("NOVILLO", 100.0, 1200.0)]),
        ];
        let table = TrendTable::compute(
            &auctions,
            Some(date("01/02/24")),
            None,
            Granularity::Monthly,
        );
        assert_eq!(table.buckets, vec!["06/24"]);
    }

    #[test]
    fn test_empty_input() {
        let table = TrendTable::compute(&[], None, None, Granularity::Monthly);
        assert!(table.buckets.is_empty());
        assert!(table.series.is_empty());
    }
}
