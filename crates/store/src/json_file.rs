//! Local JSON-file fallback store.
//!
//! Development/offline convenience only: the whole auction list lives in one
//! pretty-printed JSON file. Not durable across deployments and never to be
//! relied upon for correctness guarantees.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use remate_core::{Auction, Error, Result};

use crate::{ensure_id, sort_newest_first, AuctionFilter, AuctionStore};

/// File-backed auction store.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store over the given file path. The file is created on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> JsonFileStore {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Auction>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn persist(&self, auctions: &[Auction]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(auctions)?)?;
        Ok(())
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::persistence("file lock poisoned"))
    }
}

impl AuctionStore for JsonFileStore {
    fn list(&self, filter: Option<&AuctionFilter>) -> Result<Vec<Auction>> {
        let mut auctions = self.load()?;
        if let Some(filter) = filter {
            auctions.retain(|a| filter.matches(a));
        }
        sort_newest_first(&mut auctions);
        Ok(auctions)
    }

    fn save(&self, auction: Auction) -> Result<Auction> {
        let auction = ensure_id(auction);
        let _guard = self.locked()?;
        let mut auctions = self.load()?;
        auctions.push(auction.clone());
        self.persist(&auctions)?;
        Ok(auction)
    }

    fn delete_by_id(&self, id: &str) -> Result<bool> {
        let _guard = self.locked()?;
        let mut auctions = self.load()?;
        let before = auctions.len();
        auctions.retain(|a| a.id != id);
        if auctions.len() == before {
            return Ok(false);
        }
        self.persist(&auctions)?;
        Ok(true)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Auction>> {
        Ok(self.load()?.into_iter().find(|a| a.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remate_core::Lot;

    fn draft(recinto: &str, fecha: &str) -> Auction {
        Auction {
            id: String::new(),
            recinto: recinto.to_string(),
            fecha: fecha.to_string(),
            total_animales: 10,
            total_kilos: 4_500.0,
            lots: vec![Lot {
                numero_lote: 1,
                cantidad: 10,
                peso: 4_500.0,
                precio: 1200.0,
                vendedor: "AGRICOLA SUR".to_string(),
                tipo_lote: "NOVILLO".to_string(),
            }],
            summaries: None,
        }
    }

    fn store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("auctions.json"));
        (dir, store)
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_dir, store) = store();
        assert!(store.list(None).unwrap().is_empty());
        assert!(store.get_by_id("x").unwrap().is_none());
    }

    #[test]
    fn test_save_list_delete_roundtrip() {
        let (_dir, store) = store();
        let a = store.save(draft("TEMUCO", "15/03/24")).unwrap();
        let b = store.save(draft("OSORNO", "20/03/24")).unwrap();
        assert!(!a.id.is_empty());

        let listed = store.list(None).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b.id);

        assert!(store.delete_by_id(&a.id).unwrap());
        assert!(!store.delete_by_id(&a.id).unwrap());
        assert_eq!(store.list(None).unwrap().len(), 1);
    }

    #[test]
    fn test_filter_by_recinto() {
        let (_dir, store) = store();
        store.save(draft("TEMUCO", "15/03/24")).unwrap();
        store.save(draft("OSORNO", "20/03/24")).unwrap();

        let filter = AuctionFilter::recinto("Temuco");
        let listed = store.list(Some(&filter)).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recinto, "TEMUCO");
    }
}
