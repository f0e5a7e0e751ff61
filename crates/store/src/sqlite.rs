//! SQLite-backed auction repository.
//!
//! The table mirrors the backend schema (`id`, `recinto`, `fecha`,
//! `totalAnimales`, `totalKilos`, `lots`, `summaries`); lot lists and
//! summaries are stored as JSON text. Deployed databases may predate the
//! `summaries` column, so both reads and writes tolerate its absence —
//! writes negotiate capability against the live schema instead of matching
//! error strings.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Row};

use remate_core::{Auction, CategorySummary, Error, Lot, Result};

use crate::{ensure_id, sort_newest_first, AuctionFilter, AuctionStore};

const CREATE_AUCTIONS: &str = "
CREATE TABLE IF NOT EXISTS auctions (
    id            TEXT PRIMARY KEY,
    recinto       TEXT NOT NULL,
    fecha         TEXT NOT NULL,
    totalAnimales INTEGER NOT NULL,
    totalKilos    REAL NOT NULL,
    lots          TEXT NOT NULL,
    summaries     TEXT
)";

/// Auction repository over a SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// One raw row: the record plus its still-serialized JSON cells.
type RawRow = (Auction, String, Option<String>);

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<SqliteStore> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(|e| Error::unavailable(e.to_string()))?;
        conn.execute_batch(CREATE_AUCTIONS)
            .map_err(|e| Error::unavailable(e.to_string()))?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<SqliteStore> {
        let conn = Connection::open_in_memory().map_err(|e| Error::unavailable(e.to_string()))?;
        conn.execute_batch(CREATE_AUCTIONS)
            .map_err(|e| Error::unavailable(e.to_string()))?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::persistence("connection lock poisoned"))
    }

    /// Whether the live `auctions` table carries the optional `summaries`
    /// column. Consulted when a feature-complete write is rejected, so the
    /// retry decision rests on the actual schema.
    fn has_summaries_column(conn: &Connection) -> Result<bool> {
        let mut stmt = conn
            .prepare("PRAGMA table_info(auctions)")
            .map_err(|e| Error::persistence(e.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(|e| Error::persistence(e.to_string()))?;
        for name in names {
            let name = name.map_err(|e| Error::persistence(e.to_string()))?;
            if name == "summaries" {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Map a `SELECT *` row by column name. Legacy tables have no
    /// `summaries` column; that read falls back to `None`.
    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
        let lots_json: String = row.get("lots")?;
        let summaries_json: Option<String> = row.get("summaries").unwrap_or(None);
        Ok((
            Auction {
                id: row.get("id")?,
                recinto: row.get("recinto")?,
                fecha: row.get("fecha")?,
                total_animales: row.get("totalAnimales")?,
                total_kilos: row.get("totalKilos")?,
                lots: Vec::new(),
                summaries: None,
            },
            lots_json,
            summaries_json,
        ))
    }

    /// Deserialize the JSON cells into the record.
    fn hydrate((mut auction, lots_json, summaries_json): RawRow) -> Result<Auction> {
        auction.lots = serde_json::from_str::<Vec<Lot>>(&lots_json)?;
        auction.summaries = summaries_json
            .map(|s| serde_json::from_str::<Vec<CategorySummary>>(&s))
            .transpose()?;
        Ok(auction)
    }
}

impl AuctionStore for SqliteStore {
    fn list(&self, filter: Option<&AuctionFilter>) -> Result<Vec<Auction>> {
        let conn = self.lock()?;
        let recinto = filter.and_then(|f| f.recinto.as_deref());

        let mut stmt = match recinto {
            Some(_) => conn.prepare("SELECT * FROM auctions WHERE UPPER(recinto) = UPPER(?1)"),
            None => conn.prepare("SELECT * FROM auctions"),
        }
        .map_err(|e| Error::persistence(e.to_string()))?;

        let rows = match recinto {
            Some(r) => stmt.query_map(params![r], Self::map_row),
            None => stmt.query_map([], Self::map_row),
        }
        .map_err(|e| Error::persistence(e.to_string()))?;

        let mut auctions = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| Error::persistence(e.to_string()))?;
            auctions.push(Self::hydrate(raw)?);
        }
        sort_newest_first(&mut auctions);
        Ok(auctions)
    }

    fn save(&self, auction: Auction) -> Result<Auction> {
        let auction = ensure_id(auction);
        let conn = self.lock()?;

        let lots_json = serde_json::to_string(&auction.lots)?;
        let summaries_json = auction
            .summaries
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let full = conn.execute(
            "INSERT INTO auctions (id, recinto, fecha, totalAnimales, totalKilos, lots, summaries)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                auction.id,
                auction.recinto,
                auction.fecha,
                auction.total_animales,
                auction.total_kilos,
                lots_json,
                summaries_json,
            ],
        );

        if let Err(err) = full {
            // Schema-evolution tolerance: older deployments lack the
            // summaries column. Retry reduced only when the live schema
            // confirms the column is missing.
            if !Self::has_summaries_column(&conn)? {
                tracing::warn!("auctions table has no summaries column, retrying without it");
                conn.execute(
                    "INSERT INTO auctions (id, recinto, fecha, totalAnimales, totalKilos, lots)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        auction.id,
                        auction.recinto,
                        auction.fecha,
                        auction.total_animales,
                        auction.total_kilos,
                        lots_json,
                    ],
                )
                .map_err(|e| Error::persistence(e.to_string()))?;
            } else {
                return Err(Error::persistence(err.to_string()));
            }
        }

        Ok(auction)
    }

    fn delete_by_id(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn
            .execute("DELETE FROM auctions WHERE id = ?1", params![id])
            .map_err(|e| Error::persistence(e.to_string()))?;
        Ok(deleted > 0)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Auction>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT * FROM auctions WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()
            .map_err(|e| Error::persistence(e.to_string()))?;
        raw.map(Self::hydrate).transpose()
    }
}
