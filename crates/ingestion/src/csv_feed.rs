//! CSV feed branch.
//!
//! Rows are header-keyed; column names are matched case-insensitively
//! against a small alias set per field. Any row-level parse error aborts the
//! whole import.

use csv::{ReaderBuilder, StringRecord};
use remate_core::{Error, Lot, Result};

use crate::feed::{FallbackMeta, ParsedFeed};

/// Default category label when the feed carries none.
pub const UNKNOWN_CATEGORY: &str = "DESCONOCIDO";

const LOT_NUMBER_ALIASES: &[&str] = &["numerolote", "lugar"];
const QUANTITY_ALIASES: &[&str] = &["cantidad"];
const WEIGHT_ALIASES: &[&str] = &["peso"];
const PRICE_ALIASES: &[&str] = &["precio"];
const SELLER_ALIASES: &[&str] = &["vendedor"];
const CATEGORY_ALIASES: &[&str] = &["tipolote"];

/// Resolved column positions for the recognized fields. A `None` means the
/// feed simply lacks that column; the field defaults instead of erroring.
#[derive(Debug, Clone, Copy, Default)]
struct Columns {
    numero_lote: Option<usize>,
    cantidad: Option<usize>,
    peso: Option<usize>,
    precio: Option<usize>,
    vendedor: Option<usize>,
    tipo_lote: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let mut columns = Columns::default();
        for (idx, name) in headers.iter().enumerate() {
            let name = name.trim().to_ascii_lowercase();
            let slot = if LOT_NUMBER_ALIASES.contains(&name.as_str()) {
                &mut columns.numero_lote
            } else if QUANTITY_ALIASES.contains(&name.as_str()) {
                &mut columns.cantidad
            } else if WEIGHT_ALIASES.contains(&name.as_str()) {
                &mut columns.peso
            } else if PRICE_ALIASES.contains(&name.as_str()) {
                &mut columns.precio
            } else if SELLER_ALIASES.contains(&name.as_str()) {
                &mut columns.vendedor
            } else if CATEGORY_ALIASES.contains(&name.as_str()) {
                &mut columns.tipo_lote
            } else {
                continue;
            };
            // First matching column wins.
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        columns
    }
}

fn field<'r>(record: &'r StringRecord, col: Option<usize>) -> Option<&'r str> {
    col.and_then(|i| record.get(i)).map(str::trim)
}

fn numeric_field<T>(record: &StringRecord, col: Option<usize>, line: usize) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    match field(record, col) {
        None | Some("") => Ok(T::default()),
        Some(raw) => raw.parse().map_err(|_| {
            Error::malformed(format!("valor numérico inválido '{raw}' en la fila {line}"))
        }),
    }
}

fn string_field(record: &StringRecord, col: Option<usize>, default: &str) -> String {
    match field(record, col) {
        None | Some("") => default.to_string(),
        Some(raw) => raw.to_string(),
    }
}

/// Parse a CSV feed into an auction draft.
///
/// CSV feeds carry no header metadata, so venue and date come from the
/// caller's fallback and the totals are summed over the lots.
pub fn parse(content: &str, fallback: &FallbackMeta) -> Result<ParsedFeed> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::malformed(format!("encabezado CSV inválido: {e}")))?
        .clone();
    let columns = Columns::resolve(&headers);

    let mut lots = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // Header is line 1; data starts at line 2.
        let line = idx + 2;
        let record =
            record.map_err(|e| Error::malformed(format!("fila {line} inválida: {e}")))?;

        lots.push(Lot {
            numero_lote: numeric_field(&record, columns.numero_lote, line)?,
            cantidad: numeric_field(&record, columns.cantidad, line)?,
            peso: numeric_field(&record, columns.peso, line)?,
            precio: numeric_field(&record, columns.precio, line)?,
            vendedor: string_field(&record, columns.vendedor, ""),
            tipo_lote: string_field(&record, columns.tipo_lote, UNKNOWN_CATEGORY),
        });
    }

    let (total_animales, total_kilos) = ParsedFeed::summed_totals(&lots);
    Ok(ParsedFeed {
        recinto: fallback.recinto.to_uppercase(),
        fecha: fallback.fecha.clone(),
        total_animales,
        total_kilos,
        lots,
        summaries: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> FallbackMeta {
        FallbackMeta {
            recinto: "Temuco".to_string(),
            fecha: "15/03/24".to_string(),
        }
    }

    #[test]
    fn test_standard_headers() {
        let csv = "NumeroLote,Cantidad,Peso,Precio,Vendedor,TipoLote\n\
                   1,10,4500,1200,AGRICOLA SUR,NOVILLO GORDO\n\
                   2,5,2200.5,1150,FUNDO EL ROBLE,VAQUILLA\n";
        let feed = parse(csv, &fallback()).unwrap();
        assert_eq!(feed.lots.len(), 2);
        assert_eq!(feed.lots[0].numero_lote, 1);
        assert_eq!(feed.lots[0].cantidad, 10);
        assert!((feed.lots[0].peso - 4500.0).abs() < 1e-10);
        assert!((feed.lots[0].precio - 1200.0).abs() < 1e-10);
        assert_eq!(feed.lots[0].vendedor, "AGRICOLA SUR");
        assert_eq!(feed.lots[0].tipo_lote, "NOVILLO GORDO");
        assert_eq!(feed.recinto, "TEMUCO");
        assert_eq!(feed.fecha, "15/03/24");
        assert_eq!(feed.total_animales, 15);
        assert!((feed.total_kilos - 6700.5).abs() < 1e-10);
        assert!(feed.summaries.is_none());
    }

    #[test]
    fn test_legacy_aliases_any_case() {
        let csv = "LUGAR,cantidad,PESO,precio,vendedor,tipolote\n\
                   7,3,1500,980,EL MANZANO,TORO\n";
        let feed = parse(csv, &fallback()).unwrap();
        assert_eq!(feed.lots[0].numero_lote, 7);
        assert_eq!(feed.lots[0].cantidad, 3);
        assert_eq!(feed.lots[0].tipo_lote, "TORO");
    }

    #[test]
    fn test_missing_columns_default() {
        let csv = "Cantidad,Peso\n4,1800\n";
        let feed = parse(csv, &fallback()).unwrap();
        let lot = &feed.lots[0];
        assert_eq!(lot.numero_lote, 0);
        assert!((lot.precio - 0.0).abs() < 1e-10);
        assert_eq!(lot.vendedor, "");
        assert_eq!(lot.tipo_lote, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_empty_numeric_field_defaults_to_zero() {
        let csv = "NumeroLote,Cantidad,Peso,Precio\n1,,450,\n";
        let feed = parse(csv, &fallback()).unwrap();
        assert_eq!(feed.lots[0].cantidad, 0);
        assert!((feed.lots[0].precio - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_garbage_numeric_aborts_import() {
        let csv = "NumeroLote,Cantidad,Peso,Precio\n1,10,450,1200\n2,diez,300,900\n";
        let err = parse(csv, &fallback()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_ragged_row_aborts_import() {
        let csv = "NumeroLote,Cantidad,Peso,Precio\n1,10,450\n";
        let err = parse(csv, &fallback()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_empty_file_yields_empty_feed() {
        let feed = parse("", &fallback()).unwrap();
        assert!(feed.lots.is_empty());
        assert_eq!(feed.total_animales, 0);
    }
}
