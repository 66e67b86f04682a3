//! Price extraction with pt-BR number normalization

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static META_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[itemprop="price"]"#,
        r#"meta[property="product:price:amount"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("static selector"))
    .collect()
});

static PRICE_ELEMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".price-value, .product-price, [itemprop=\"price\"], .primary-price .valor-big")
        .expect("static selector")
});

static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"R\$\s*([0-9][0-9.,]*)").expect("static regex"));
static NUMBER_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[\d.,]+").expect("static regex"));

/// Parse a number written in the regional format (`1.234,56`) into a
/// dot-decimal float. Non-positive and non-numeric results are rejected.
pub fn parse_regional_number(text: &str) -> Option<f64> {
    let token = NUMBER_TOKEN_RE.find(text)?.as_str();
    let normalized = if token.contains(',') {
        // Dots are thousands separators when a decimal comma is present.
        token.replace('.', "").replace(',', ".")
    } else {
        token.to_string()
    };
    let value: f64 = normalized.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Parse a machine-facing number (meta/content attributes), where only a
/// stray decimal comma needs normalizing.
fn parse_meta_number(text: &str) -> Option<f64> {
    let value: f64 = text.trim().replace(',', ".").parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// First plausible price on the page: structured meta tags, then known
/// price elements, then a currency pattern anywhere in the document.
pub fn extract_price(doc: &Html, raw: &str) -> Option<f64> {
    for selector in META_SELECTORS.iter() {
        if let Some(price) = doc
            .select(selector)
            .filter_map(|el| el.value().attr("content"))
            .find_map(parse_meta_number)
        {
            return Some(price);
        }
    }

    if let Some(price) = doc
        .select(&PRICE_ELEMENT_SELECTOR)
        .map(|el| el.text().collect::<String>())
        .find_map(|text| parse_regional_number(&text))
    {
        return Some(price);
    }

    CURRENCY_RE
        .captures_iter(raw)
        .find_map(|caps| parse_regional_number(&caps[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.234,56", 1234.56)]
    #[case("99,90", 99.90)]
    #[case("R$ 12,00", 12.0)]
    #[case("1.250.000,00", 1_250_000.0)]
    #[case("123.45", 123.45)]
    fn parses_regional_numbers(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(parse_regional_number(input), Some(expected));
    }

    #[rstest]
    #[case("grátis")]
    #[case("0,00")]
    #[case("R$ -10,00")]
    fn rejects_non_positive_and_non_numeric(#[case] input: &str) {
        assert_eq!(parse_regional_number(input), None);
    }

    #[test]
    fn meta_tag_wins_over_visible_price() {
        let doc = Html::parse_document(
            r#"<meta itemprop="price" content="123.45">
               <span class="price-value">R$ 999,99</span>"#,
        );
        assert_eq!(extract_price(&doc, ""), Some(123.45));
    }

    #[test]
    fn falls_back_to_price_element() {
        let html = r#"<div class="product-price">R$ 1.234,56</div>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_price(&doc, html), Some(1234.56));
    }

    #[test]
    fn falls_back_to_currency_pattern_in_text() {
        let html = "<p>por apenas R$ 79,90 à vista</p>";
        let doc = Html::parse_document(html);
        assert_eq!(extract_price(&doc, html), Some(79.90));
    }

    #[test]
    fn zero_price_element_is_skipped() {
        let html = r#"<span class="price-value">R$ 0,00</span><p>ou R$ 49,90</p>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_price(&doc, html), Some(49.90));
    }
}
