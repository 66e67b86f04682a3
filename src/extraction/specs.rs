//! Technical specification extraction
//!
//! Specs come from two places: a characteristics block (several supplier
//! layouts, tried in order, first non-empty wins) and a scan over every
//! table-like structure in the document. Rows with two non-empty cells
//! become key/value pairs (later duplicates overwrite earlier ones);
//! single-cell rows become standalone lines.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extraction::text::html_to_text;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("static selector"));
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("static selector"));
static DL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("dl").expect("static selector"));
static DT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("dt").expect("static selector"));
static DD_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("dd").expect("static selector"));
static CHARACTERISTICS_TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#caracteristicas table, .caracteristicas table, .caracteristicas-produto table")
        .expect("static selector")
});
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3").expect("static selector"));
static CLASS_CONTAINER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".caracteristicas, .product-specs, .technical-data, .especificacoes")
        .expect("static selector")
});

static WARRANTY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)garantia[:\s]+([^\n<]{3,120})").expect("static regex"));
static BOX_CONTENTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:conte[úu]do da embalagem|itens inclusos)[:\s]+([^\n<]{3,200})")
        .expect("static regex")
});

/// Result of the spec scan over one document.
#[derive(Debug, Default)]
pub struct SpecScan {
    pub pairs: BTreeMap<String, String>,
    pub lines: Vec<String>,
    /// Raw markup of each table, in document order.
    pub tables: Vec<String>,
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SELECTOR)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

fn rows_into(scan: &mut SpecScan, table: ElementRef<'_>) {
    for row in table.select(&ROW_SELECTOR) {
        let cells = cell_texts(row);
        match cells.len() {
            0 => {}
            1 => scan.lines.push(cells[0].clone()),
            _ => {
                scan.pairs.insert(cells[0].clone(), cells[1].clone());
            }
        }
    }
}

/// Split free text into `key: value` pairs where a line reads like one,
/// collecting the rest as standalone lines.
fn parse_kv_lines(text: &str, pairs: &mut BTreeMap<String, String>, lines: &mut Vec<String>) {
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once(':') {
            Some((key, value))
                if !key.trim().is_empty() && !value.trim().is_empty() && key.len() <= 60 =>
            {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => lines.push(line.to_string()),
        }
    }
}

fn from_definition_lists(doc: &Html) -> SpecScan {
    let mut scan = SpecScan::default();
    for dl in doc.select(&DL_SELECTOR) {
        let terms: Vec<String> = dl
            .select(&DT_SELECTOR)
            .map(|dt| dt.text().collect::<String>().trim().to_string())
            .collect();
        let definitions: Vec<String> = dl
            .select(&DD_SELECTOR)
            .map(|dd| dd.text().collect::<String>().trim().to_string())
            .collect();
        for (term, definition) in terms.into_iter().zip(definitions) {
            if !term.is_empty() && !definition.is_empty() {
                scan.pairs.insert(term, definition);
            }
        }
    }
    scan
}

fn from_characteristics_tables(doc: &Html) -> SpecScan {
    let mut scan = SpecScan::default();
    for table in doc.select(&CHARACTERISTICS_TABLE_SELECTOR) {
        rows_into(&mut scan, table);
    }
    scan
}

fn from_titled_section(doc: &Html) -> SpecScan {
    let mut scan = SpecScan::default();
    for heading in doc.select(&HEADING_SELECTOR) {
        let title = heading.text().collect::<String>().to_lowercase();
        if !title.contains("caracter") && !title.contains("especifica") {
            continue;
        }
        for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
            let name = sibling.value().name();
            if matches!(name, "h1" | "h2" | "h3" | "h4") {
                break;
            }
            let text = html_to_text(&sibling.html());
            parse_kv_lines(&text, &mut scan.pairs, &mut scan.lines);
        }
        if !scan.pairs.is_empty() || !scan.lines.is_empty() {
            break;
        }
    }
    scan
}

fn from_class_containers(doc: &Html) -> SpecScan {
    let mut scan = SpecScan::default();
    if let Some(container) = doc.select(&CLASS_CONTAINER_SELECTOR).next() {
        let text = html_to_text(&container.inner_html());
        parse_kv_lines(&text, &mut scan.pairs, &mut scan.lines);
    }
    scan
}

fn characteristics_cascade(doc: &Html) -> SpecScan {
    let layouts: [fn(&Html) -> SpecScan; 4] = [
        from_definition_lists,
        from_characteristics_tables,
        from_titled_section,
        from_class_containers,
    ];
    for layout in layouts {
        let scan = layout(doc);
        if !scan.pairs.is_empty() || !scan.lines.is_empty() {
            return scan;
        }
    }
    SpecScan::default()
}

/// Full spec scan: characteristics cascade plus every table in the
/// document. Table rows overwrite cascade pairs on duplicate keys.
pub fn extract_specs(doc: &Html) -> SpecScan {
    let mut scan = characteristics_cascade(doc);
    for table in doc.select(&TABLE_SELECTOR) {
        scan.tables.push(table.html().trim().to_string());
        rows_into(&mut scan, table);
    }
    scan
}

fn value_for_key_containing(pairs: &BTreeMap<String, String>, needles: &[&str]) -> Option<String> {
    pairs.iter().find_map(|(key, value)| {
        let lowered = key.to_lowercase();
        needles
            .iter()
            .any(|needle| lowered.contains(needle))
            .then(|| value.clone())
    })
}

pub fn extract_warranty(pairs: &BTreeMap<String, String>, doc: &Html) -> Option<String> {
    value_for_key_containing(pairs, &["garantia"]).or_else(|| {
        let text = doc.root_element().text().collect::<String>();
        WARRANTY_RE
            .captures(&text)
            .map(|caps| caps[1].trim().to_string())
    })
}

pub fn extract_box_contents(pairs: &BTreeMap<String, String>, doc: &Html) -> Option<String> {
    value_for_key_containing(pairs, &["conteúdo da embalagem", "itens inclusos", "acompanha"])
        .or_else(|| {
            let text = doc.root_element().text().collect::<String>();
            BOX_CONTENTS_RE
                .captures(&text)
                .map(|caps| caps[1].trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(html: &str) -> SpecScan {
        extract_specs(&Html::parse_document(html))
    }

    #[test]
    fn definition_list_layout_wins_first() {
        let html = r#"
            <dl><dt>Tensão</dt><dd>24V</dd><dt>Corrente</dt><dd>5A</dd></dl>
            <div class="caracteristicas">Tensão: 12V</div>
        "#;
        let scan = scan(html);
        assert_eq!(scan.pairs.get("Tensão").map(String::as_str), Some("24V"));
        assert_eq!(scan.pairs.get("Corrente").map(String::as_str), Some("5A"));
    }

    #[test]
    fn table_rows_become_pairs_with_last_write_wins() {
        let html = r#"
            <table>
                <tr><td>Peso</td><td>1kg</td></tr>
                <tr><td>Peso</td><td>2kg</td></tr>
            </table>
        "#;
        let scan = scan(html);
        assert_eq!(scan.pairs.get("Peso").map(String::as_str), Some("2kg"));
        assert_eq!(scan.tables.len(), 1);
    }

    #[test]
    fn single_cell_rows_become_lines() {
        let html = r#"
            <table>
                <tr><td>Compatível com Arduino</td></tr>
                <tr><td>Modelo</td><td>XY-100</td></tr>
            </table>
        "#;
        let scan = scan(html);
        assert_eq!(scan.lines, vec!["Compatível com Arduino".to_string()]);
        assert_eq!(scan.pairs.get("Modelo").map(String::as_str), Some("XY-100"));
    }

    #[test]
    fn titled_section_layout_is_parsed() {
        let html = r#"
            <h2>Características técnicas</h2>
            <p>Alimentação: 110V<br>Consumo: 30W</p>
        "#;
        let scan = scan(html);
        assert_eq!(scan.pairs.get("Alimentação").map(String::as_str), Some("110V"));
        assert_eq!(scan.pairs.get("Consumo").map(String::as_str), Some("30W"));
    }

    #[test]
    fn warranty_prefers_spec_pair_over_text() {
        let html = r#"<table><tr><td>Garantia</td><td>12 meses</td></tr></table>"#;
        let doc = Html::parse_document(html);
        let scan = extract_specs(&doc);
        assert_eq!(extract_warranty(&scan.pairs, &doc).as_deref(), Some("12 meses"));
    }

    #[test]
    fn warranty_falls_back_to_document_text() {
        let html = "<p>Garantia: 90 dias contra defeitos</p>";
        let doc = Html::parse_document(html);
        let scan = extract_specs(&doc);
        assert_eq!(
            extract_warranty(&scan.pairs, &doc).as_deref(),
            Some("90 dias contra defeitos")
        );
    }

    #[test]
    fn box_contents_from_section_text() {
        let html = "<p>Conteúdo da embalagem: 1 módulo, 2 cabos</p>";
        let doc = Html::parse_document(html);
        let scan = extract_specs(&doc);
        assert_eq!(
            extract_box_contents(&scan.pairs, &doc).as_deref(),
            Some("1 módulo, 2 cabos")
        );
    }
}
