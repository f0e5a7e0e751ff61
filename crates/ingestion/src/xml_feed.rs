//! XML feed branch.
//!
//! The raw document is deserialized into fixed intermediate shapes and then
//! normalized into the core types in one explicit step, so the two known
//! group layouts and the array-or-single `item` ambiguity never leak past
//! this module.

use quick_xml::events::Event;
use remate_core::{CategorySummary, Error, Lot, Result};
use serde::Deserialize;

use crate::csv_feed::UNKNOWN_CATEGORY;
use crate::feed::{FallbackMeta, ParsedFeed};

/// Accepted document root element names.
const ROOT_ELEMENTS: &[&str] = &["root", "remate"];

/// Raw document root. Either of the two recognized root elements
/// deserializes into this shape.
#[derive(Debug, Deserialize)]
struct RawRoot {
    recinto: Option<String>,
    fecha: Option<String>,
    /// Authoritative total head count, overrides the sum over lots.
    totanimales: Option<u32>,
    /// Authoritative total weight, overrides the sum over lots.
    totkilo: Option<f64>,
    /// Flat group layout: repeated `tipolote` elements at the root.
    #[serde(default)]
    tipolote: Vec<RawGroup>,
    /// Nested group layout: `tiposLote` wrapper with `tipoLote` children.
    #[serde(rename = "tiposLote")]
    tipos_lote: Option<RawGroupList>,
}

#[derive(Debug, Deserialize)]
struct RawGroupList {
    #[serde(rename = "tipoLote", default)]
    tipo_lote: Vec<RawGroup>,
}

/// One category group: a label, optional authoritative aggregates, and the
/// itemized top lots.
#[derive(Debug, Deserialize)]
struct RawGroup {
    descripcion: Option<String>,
    #[serde(rename = "TipoLote")]
    tipo_lote: Option<String>,
    cantidadtotal: Option<u32>,
    pesototal: Option<f64>,
    pptotal: Option<f64>,
    /// A bare single `<item>` deserializes as a one-element list here, which
    /// is exactly the normalization the two feed variants need.
    #[serde(default)]
    item: Vec<RawItem>,
}

impl RawGroup {
    fn label(&self) -> String {
        self.descripcion
            .as_deref()
            .or(self.tipo_lote.as_deref())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN_CATEGORY)
            .to_string()
    }

    /// Authoritative summary, present only when the group carries non-zero
    /// aggregate figures.
    fn summary(&self, label: &str) -> Option<CategorySummary> {
        let cantidad_total = self.cantidadtotal.unwrap_or(0);
        let peso_total = self.pesototal.unwrap_or(0.0);
        let pp_total = self.pptotal.unwrap_or(0.0);
        if cantidad_total == 0 && peso_total == 0.0 && pp_total == 0.0 {
            return None;
        }
        Some(CategorySummary {
            descripcion: label.to_string(),
            cantidad_total,
            peso_total,
            pp_total,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    lugar: Option<u32>,
    #[serde(rename = "numeroLote")]
    numero_lote: Option<u32>,
    cantidad: Option<u32>,
    peso: Option<f64>,
    precio: Option<f64>,
    vendedor: Option<String>,
}

impl RawItem {
    fn into_lot(self, categoria: &str) -> Lot {
        Lot {
            numero_lote: self.lugar.or(self.numero_lote).unwrap_or(0),
            cantidad: self.cantidad.unwrap_or(0),
            peso: self.peso.unwrap_or(0.0),
            precio: self.precio.unwrap_or(0.0),
            vendedor: self.vendedor.unwrap_or_default(),
            tipo_lote: categoria.to_string(),
        }
    }
}

/// Name of the document's root element.
fn root_element_name(content: &str) -> Result<String> {
    let mut reader = quick_xml::Reader::from_str(content);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(Error::malformed("documento XML vacío")),
            Ok(_) => continue,
            Err(e) => return Err(Error::malformed(format!("XML inválido: {e}"))),
        }
    }
}

impl RawRoot {
    /// Category groups from whichever of the two recognized layouts is
    /// present.
    fn take_groups(&mut self) -> Vec<RawGroup> {
        if !self.tipolote.is_empty() {
            std::mem::take(&mut self.tipolote)
        } else {
            self.tipos_lote
                .take()
                .map(|l| l.tipo_lote)
                .unwrap_or_default()
        }
    }
}

/// Parse an XML feed into an auction draft.
pub fn parse(content: &str, fallback: &FallbackMeta) -> Result<ParsedFeed> {
    let root_name = root_element_name(content)?;
    if !ROOT_ELEMENTS.contains(&root_name.as_str()) {
        return Err(Error::MissingRootElement);
    }

    let mut root: RawRoot = quick_xml::de::from_str(content)
        .map_err(|e| Error::malformed(format!("XML inválido: {e}")))?;
    let groups = root.take_groups();

    if groups.is_empty() {
        return Err(Error::MissingCategoryData);
    }

    let recinto = root
        .recinto
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| fallback.recinto.to_uppercase());
    let fecha = root
        .fecha
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.fecha.clone());

    let mut lots = Vec::new();
    let mut summaries = Vec::new();
    for group in groups {
        let label = group.label();
        if let Some(summary) = group.summary(&label) {
            summaries.push(summary);
        }
        for item in group.item {
            lots.push(item.into_lot(&label));
        }
    }

    // The lot list is truncated to top entries, so declared totals win over
    // the sum unconditionally.
    let (summed_animales, summed_kilos) = ParsedFeed::summed_totals(&lots);
    Ok(ParsedFeed {
        recinto,
        fecha,
        total_animales: root.totanimales.unwrap_or(summed_animales),
        total_kilos: root.totkilo.unwrap_or(summed_kilos),
        lots,
        summaries: if summaries.is_empty() {
            None
        } else {
            Some(summaries)
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> FallbackMeta {
        FallbackMeta {
            recinto: "FALLBACK".to_string(),
            fecha: "01/01/24".to_string(),
        }
    }

    #[test]
    fn test_flat_layout_with_items() {
        let xml = r#"
            <remate>
                <recinto>Temuco</recinto>
                <fecha>15/03/24</fecha>
                <tipolote>
                    <descripcion>NOVILLO GORDO</descripcion>
                    <item>
                        <lugar>1</lugar>
                        <cantidad>10</cantidad>
                        <peso>4500</peso>
                        <precio>1200</precio>
                        <vendedor>AGRICOLA SUR</vendedor>
                    </item>
                    <item>
                        <lugar>2</lugar>
                        <cantidad>8</cantidad>
                        <peso>3600</peso>
                        <precio>1180</precio>
                        <vendedor>EL ROBLE</vendedor>
                    </item>
                </tipolote>
            </remate>"#;
        let feed = parse(xml, &fallback()).unwrap();
        assert_eq!(feed.recinto, "TEMUCO");
        assert_eq!(feed.fecha, "15/03/24");
        assert_eq!(feed.lots.len(), 2);
        assert_eq!(feed.lots[0].tipo_lote, "NOVILLO GORDO");
        assert_eq!(feed.lots[1].numero_lote, 2);
        assert_eq!(feed.total_animales, 18);
        assert!((feed.total_kilos - 8100.0).abs() < 1e-10);
        assert!(feed.summaries.is_none());
    }

    #[test]
    fn test_bare_single_item_equals_one_element_list() {
        let bare = r#"
            <root>
                <tipolote>
                    <descripcion>VAQUILLA</descripcion>
                    <item><lugar>3</lugar><cantidad>5</cantidad><peso>2000</peso><precio>1100</precio><vendedor>X</vendedor></item>
                </tipolote>
            </root>"#;
        let feed = parse(bare, &fallback()).unwrap();
        assert_eq!(feed.lots.len(), 1);
        let lot = &feed.lots[0];
        assert_eq!(lot.numero_lote, 3);
        assert_eq!(lot.cantidad, 5);
        assert!((lot.peso - 2000.0).abs() < 1e-10);
        assert!((lot.precio - 1100.0).abs() < 1e-10);
        assert_eq!(lot.tipo_lote, "VAQUILLA");
    }

    #[test]
    fn test_nested_group_layout() {
        let xml = r#"
            <root>
                <tiposLote>
                    <tipoLote>
                        <TipoLote>TORO</TipoLote>
                        <item><numeroLote>9</numeroLote><cantidad>1</cantidad><peso>800</peso><precio>950</precio></item>
                    </tipoLote>
                    <tipoLote>
                        <descripcion>NOVILLO</descripcion>
                        <item><lugar>10</lugar><cantidad>4</cantidad><peso>1700</peso><precio>1210</precio></item>
                    </tipoLote>
                </tiposLote>
            </root>"#;
        let feed = parse(xml, &fallback()).unwrap();
        assert_eq!(feed.lots.len(), 2);
        assert_eq!(feed.lots[0].tipo_lote, "TORO");
        assert_eq!(feed.lots[0].numero_lote, 9);
        assert_eq!(feed.lots[0].vendedor, "");
        assert_eq!(feed.lots[1].tipo_lote, "NOVILLO");
        // No header metadata: fallback venue is used, upper-cased.
        assert_eq!(feed.recinto, "FALLBACK");
    }

    #[test]
    fn test_authoritative_totals_override_sums() {
        let xml = r#"
            <remate>
                <totanimales>450</totanimales>
                <totkilo>198500.5</totkilo>
                <tipolote>
                    <descripcion>NOVILLO</descripcion>
                    <item><lugar>1</lugar><cantidad>10</cantidad><peso>4500</peso><precio>1200</precio></item>
                </tipolote>
            </remate>"#;
        let feed = parse(xml, &fallback()).unwrap();
        // Declared totals win even though they disagree with the lot sums.
        assert_eq!(feed.total_animales, 450);
        assert!((feed.total_kilos - 198500.5).abs() < 1e-10);
    }

    #[test]
    fn test_group_summary_only_when_non_zero() {
        let xml = r#"
            <remate>
                <tipolote>
                    <descripcion>NOVILLO</descripcion>
                    <cantidadtotal>120</cantidadtotal>
                    <pesototal>54000</pesototal>
                    <pptotal>1235</pptotal>
                    <item><lugar>1</lugar><cantidad>10</cantidad><peso>4500</peso><precio>1200</precio></item>
                </tipolote>
                <tipolote>
                    <descripcion>VAQUILLA</descripcion>
                    <cantidadtotal>0</cantidadtotal>
                    <pesototal>0</pesototal>
                    <pptotal>0</pptotal>
                    <item><lugar>2</lugar><cantidad>5</cantidad><peso>2000</peso><precio>1100</precio></item>
                </tipolote>
            </remate>"#;
        let feed = parse(xml, &fallback()).unwrap();
        let summaries = feed.summaries.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].descripcion, "NOVILLO");
        assert_eq!(summaries[0].cantidad_total, 120);
        assert!((summaries[0].pp_total - 1235.0).abs() < 1e-10);
    }

    #[test]
    fn test_unrecognized_root_element() {
        let xml = "<subasta><tipolote><descripcion>X</descripcion></tipolote></subasta>";
        assert!(matches!(
            parse(xml, &fallback()).unwrap_err(),
            Error::MissingRootElement
        ));
    }

    #[test]
    fn test_missing_category_data() {
        let xml = "<remate><recinto>Temuco</recinto><fecha>15/03/24</fecha></remate>";
        assert!(matches!(
            parse(xml, &fallback()).unwrap_err(),
            Error::MissingCategoryData
        ));
    }

    #[test]
    fn test_malformed_document() {
        let xml = "<remate><tipolote><descripcion>X</descripcion>";
        assert!(matches!(
            parse(xml, &fallback()).unwrap_err(),
            Error::MalformedInput(_)
        ));
        assert!(matches!(
            parse("", &fallback()).unwrap_err(),
            Error::MalformedInput(_)
        ));
    }

    #[test]
    fn test_group_without_label_defaults() {
        let xml = r#"
            <remate>
                <tipolote>
                    <item><lugar>1</lugar><cantidad>2</cantidad><peso>900</peso><precio>1000</precio></item>
                </tipolote>
            </remate>"#;
        let feed = parse(xml, &fallback()).unwrap();
        assert_eq!(feed.lots[0].tipo_lote, "DESCONOCIDO");
    }
}
