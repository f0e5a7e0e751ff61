//! Auction set filtering and ordering helpers.

use remate_core::Auction;

/// Filter by venue, exact match ignoring case. `None` keeps everything.
///
/// Returns owned snapshots; aggregation never mutates stored records.
pub fn by_recinto(auctions: &[Auction], recinto: Option<&str>) -> Vec<Auction> {
    match recinto {
        None => auctions.to_vec(),
        Some(r) => {
            let wanted = r.to_uppercase();
            auctions
                .iter()
                .filter(|a| a.recinto.to_uppercase() == wanted)
                .cloned()
                .collect()
        }
    }
}

/// Sort auctions newest-first by parsed date. Records with an unparseable
/// `fecha` sort last, keeping their relative order.
pub fn sort_by_date_desc(auctions: &mut [Auction]) {
    auctions.sort_by(|a, b| match (a.date(), b.date()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Distinct category labels across the auction set, sorted alphabetically.
pub fn species_of<'a, I>(auctions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Auction>,
{
    let mut species: Vec<String> = Vec::new();
    for auction in auctions {
        for lot in &auction.lots {
            if !species.contains(&lot.tipo_lote) {
                species.push(lot.tipo_lote.clone());
            }
        }
    }
    species.sort();
    species
}
