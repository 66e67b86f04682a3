//! Hero image, datasheet link and embedded video extraction

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::product::{VideoEmbed, VideoPlatform};

static OG_IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).expect("static selector"));
static ITEMPROP_IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[itemprop="image"]"#).expect("static selector"));
static GALLERY_IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".product-image img, .gallery-image img, #galeria img")
        .expect("static selector")
});
static DATASHEET_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="datasheet"], a[href*="manual"], a[href$=".pdf"]"#)
        .expect("static selector")
});

static YOUTUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/(?:embed/|watch\?v=|shorts/)|youtu\.be/)([A-Za-z0-9_-]{6,20})")
        .expect("static regex")
});
static VIMEO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:player\.vimeo\.com/video/|vimeo\.com/)(\d{6,12})").expect("static regex")
});

/// Image URLs carry resize parameters that point at downscaled variants;
/// the bare URL is the original asset.
fn strip_resize_params(url: &str) -> &str {
    url.split("?ims=").next().unwrap_or(url)
}

fn usable_image(url: &str) -> Option<String> {
    let url = strip_resize_params(url.trim());
    (url.starts_with("http") && !url.contains(".svg")).then(|| url.to_string())
}

/// Lazy-loading galleries keep the full asset in data attributes and a
/// placeholder in `src`, so data attributes are preferred.
fn image_attr(el: &scraper::ElementRef<'_>) -> Option<String> {
    ["data-src-max", "data-img-full", "data-src", "src", "content", "href"]
        .iter()
        .find_map(|attr| el.value().attr(attr).and_then(usable_image))
}

pub fn extract_image(doc: &Html) -> Option<String> {
    doc.select(&OG_IMAGE_SELECTOR)
        .find_map(|el| el.value().attr("content").and_then(usable_image))
        .or_else(|| doc.select(&ITEMPROP_IMAGE_SELECTOR).find_map(|el| image_attr(&el)))
        .or_else(|| doc.select(&GALLERY_IMAGE_SELECTOR).find_map(|el| image_attr(&el)))
}

pub fn extract_datasheet(doc: &Html) -> Option<String> {
    doc.select(&DATASHEET_SELECTOR)
        .find_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Find every YouTube/Vimeo reference in the document, normalize each to
/// its canonical embed URL and deduplicate by that URL, keeping
/// first-seen order.
pub fn extract_videos(raw: &str) -> Vec<VideoEmbed> {
    let mut seen = std::collections::HashSet::new();
    let mut videos = Vec::new();

    for caps in YOUTUBE_RE.captures_iter(raw) {
        let url = format!("https://www.youtube.com/embed/{}", &caps[1]);
        if seen.insert(url.clone()) {
            videos.push(VideoEmbed { url, platform: VideoPlatform::Youtube });
        }
    }
    for caps in VIMEO_RE.captures_iter(raw) {
        let url = format!("https://player.vimeo.com/video/{}", &caps[1]);
        if seen.insert(url.clone()) {
            videos.push(VideoEmbed { url, platform: VideoPlatform::Vimeo });
        }
    }

    videos
}
