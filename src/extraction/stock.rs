//! Stock availability extraction
//!
//! An unavailability phrase anywhere in the document is authoritative and is
//! checked before any quantity pattern. Absent any negative signal the
//! product counts as available with unknown quantity.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::product::StockInfo;

/// Phrases suppliers use for sold-out products, matched case-insensitively.
const UNAVAILABLE_PHRASES: &[&str] = &[
    "indisponível",
    "esgotado",
    "fora de estoque",
    "sem estoque",
    "produto sob consulta",
];

static STOCK_ELEMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".stock-quantity, .availability, [itemprop=\"availability\"]")
        .expect("static selector")
});

static QUANTITY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+)\s*(?:unidades?|un\.?)\b",
        r"(?i)estoque:\s*(\d+)",
        r"(?i)(\d+)\s+em\s+estoque",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

fn quantity_in(text: &str) -> Option<u32> {
    QUANTITY_RES
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c[1].parse().ok()))
}

pub fn extract_stock(doc: &Html, raw: &str) -> StockInfo {
    let lowered = raw.to_lowercase();
    if UNAVAILABLE_PHRASES.iter().any(|p| lowered.contains(p)) {
        return StockInfo::unavailable();
    }

    if let Some(quantity) = doc
        .select(&STOCK_ELEMENT_SELECTOR)
        .map(|el| el.text().collect::<String>())
        .find_map(|text| quantity_in(&text))
    {
        return StockInfo::available(Some(quantity));
    }

    if let Some(quantity) = quantity_in(raw) {
        return StockInfo::available(Some(quantity));
    }

    StockInfo::default()
}
