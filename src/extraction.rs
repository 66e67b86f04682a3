//! HTML extraction of product facts from supplier pages
//!
//! The entry point is [`extract`]: a pure function over a raw HTML document
//! that returns whatever product facts could be read off it. Each semantic
//! field runs an ordered cascade of layout-specific matchers and accepts the
//! first plausible result; a field no matcher understands is simply absent.
//! Extraction never fails and performs no I/O.

pub mod description;
pub mod media;
pub mod price;
pub mod specs;
pub mod stock;
pub mod text;

use scraper::Html;

use crate::domain::product::ExtractedProductInfo;

/// Extract structured product facts from a raw HTML document.
pub fn extract(html: &str) -> ExtractedProductInfo {
    let doc = Html::parse_document(html);

    let scan = specs::extract_specs(&doc);
    let warranty = specs::extract_warranty(&scan.pairs, &doc);
    let box_contents = specs::extract_box_contents(&scan.pairs, &doc);

    ExtractedProductInfo {
        price: price::extract_price(&doc, html),
        stock: stock::extract_stock(&doc, html),
        description: description::extract_description(&doc),
        specs: scan.pairs,
        spec_lines: scan.lines,
        tables: scan.tables,
        warranty,
        box_contents,
        datasheet: media::extract_datasheet(&doc),
        image: media::extract_image(&doc),
        videos: media::extract_videos(html),
    }
}
