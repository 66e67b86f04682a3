//! Product description extraction
//!
//! Structured embedded data is preferred over raw markup: JSON-LD first,
//! then client-side hydration payloads, then known description containers,
//! then the meta description. The first source that yields text wins and
//! later ones are not consulted.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::extraction::text::html_to_text;

/// Descriptions longer than this are truncated with an ellipsis.
const MAX_DESCRIPTION_CHARS: usize = 2000;

static JSON_LD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector")
});

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("static selector"));

static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "#descricao-produto .content",
        ".descricao-produto .content",
        ".product-description",
        r#"[itemprop="description"]"#,
        ".description-content",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("static selector"))
    .collect()
});

static META_DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).expect("static selector"));

/// Markers of client-side state payloads worth mining for a description.
const HYDRATION_MARKERS: &[&str] = &["__NUXT__", "__NEXT_DATA__", "__PRODUCT__", "dataLayer"];

static HYDRATION_DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""description"\s*:\s*("(?:[^"\\]|\\.)*")"#).expect("static regex")
});

fn description_in_json(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("description") {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            map.get("@graph").and_then(description_in_json)
        }
        Value::Array(items) => items.iter().find_map(description_in_json),
        _ => None,
    }
}

fn from_json_ld(doc: &Html) -> Option<String> {
    doc.select(&JSON_LD_SELECTOR).find_map(|script| {
        let body = script.text().collect::<String>();
        serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(description_in_json)
    })
}

fn from_hydration_payload(doc: &Html) -> Option<String> {
    doc.select(&SCRIPT_SELECTOR).find_map(|script| {
        let body = script.text().collect::<String>();
        if !HYDRATION_MARKERS.iter().any(|m| body.contains(m)) {
            return None;
        }
        let literal = HYDRATION_DESCRIPTION_RE.captures(&body)?.get(1)?.as_str().to_string();
        let decoded: String = serde_json::from_str(&literal).ok()?;
        let trimmed = decoded.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn from_containers(doc: &Html) -> Option<String> {
    CONTAINER_SELECTORS.iter().find_map(|selector| {
        doc.select(selector).find_map(|el| {
            let text = html_to_text(&el.inner_html());
            (!text.is_empty()).then_some(text)
        })
    })
}

fn from_meta(doc: &Html) -> Option<String> {
    doc.select(&META_DESCRIPTION_SELECTOR).find_map(|el| {
        el.value()
            .attr("content")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
    })
}

fn truncate(description: String) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description;
    }
    let cut: String = description.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    format!("{cut}...")
}

pub fn extract_description(doc: &Html) -> Option<String> {
    from_json_ld(doc)
        .or_else(|| from_hydration_payload(doc))
        .or_else(|| from_containers(doc))
        .or_else(|| from_meta(doc))
        .map(truncate)
}
