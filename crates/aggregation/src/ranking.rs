//! Head-count rankings by category and by seller.
//!
//! Simple sums of `cantidad` across the filtered auction set, sorted
//! descending. Ties keep first-encountered order, so accumulation preserves
//! insertion order and the sort is stable.

use remate_core::Auction;

/// Accumulate counts keyed by label, preserving first-encounter order.
fn accumulate<'a, I>(entries: I) -> Vec<(String, u32)>
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let mut counts: Vec<(String, u32)> = Vec::new();
    for (label, count) in entries {
        match counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, total)) => *total += count,
            None => counts.push((label.to_string(), count)),
        }
    }
    counts.sort_by_key(|(_, total)| std::cmp::Reverse(*total));
    counts
}

/// Total head count per category, descending.
pub fn head_count_by_category(auctions: &[Auction]) -> Vec<(String, u32)> {
    accumulate(
        auctions
            .iter()
            .flat_map(|a| a.lots.iter().map(|l| (l.tipo_lote.as_str(), l.cantidad))),
    )
}

/// Total head count per seller, descending.
pub fn head_count_by_seller(auctions: &[Auction]) -> Vec<(String, u32)> {
    accumulate(
        auctions
            .iter()
            .flat_map(|a| a.lots.iter().map(|l| (l.vendedor.as_str(), l.cantidad))),
    )
}

/// The `n` highest-volume sellers.
pub fn top_sellers(auctions: &[Auction], n: usize) -> Vec<(String, u32)> {
    let mut sellers = head_count_by_seller(auctions);
    sellers.truncate(n);
    sellers
}
