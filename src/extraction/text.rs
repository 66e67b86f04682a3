//! Markup-to-text normalization and HTML entity decoding
//!
//! Used by the description and spec extractors to turn arbitrary markup
//! fragments into readable plain text.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").expect("static regex"));
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").expect("static regex"));
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"));
static LI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li\b[^>]*>").expect("static regex"));
static BLOCK_CLOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</(p|div|h[1-6]|tr|table|section|article|ul|ol|dl|blockquote|dd)>")
        .expect("static regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x?[0-9A-Fa-f]+|[A-Za-z]+);").expect("static regex"));
static MANY_NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex"));
static LINE_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("static regex"));

/// Fixed table of named entities seen on supplier pages. Anything not in
/// the table (and not numeric) is left untouched.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("ccedil", "ç"),
    ("Ccedil", "Ç"),
    ("atilde", "ã"),
    ("Atilde", "Ã"),
    ("otilde", "õ"),
    ("aacute", "á"),
    ("eacute", "é"),
    ("iacute", "í"),
    ("oacute", "ó"),
    ("uacute", "ú"),
    ("acirc", "â"),
    ("ecirc", "ê"),
    ("ocirc", "ô"),
    ("agrave", "à"),
    ("deg", "°"),
    ("ordm", "º"),
    ("ordf", "ª"),
    ("hellip", "…"),
    ("ndash", "–"),
    ("mdash", "—"),
    ("times", "×"),
];

/// Decode named and numeric HTML entities in a single pass.
pub fn decode_entities(input: &str) -> String {
    ENTITY_RE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let body = &caps[1];
            if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                return u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            if let Some(dec) = body.strip_prefix('#') {
                return dec
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            NAMED_ENTITIES
                .iter()
                .find(|(name, _)| *name == body)
                .map(|(_, repl)| (*repl).to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Convert an HTML fragment to plain text.
///
/// Script/style/comment nodes are dropped, block-level closers and `<br>`
/// become newlines, list items become bulleted lines, remaining tags are
/// stripped, entities are decoded, and runs of 3+ newlines collapse to 2.
pub fn html_to_text(fragment: &str) -> String {
    let cleaned = SCRIPT_RE.replace_all(fragment, "");
    let cleaned = STYLE_RE.replace_all(&cleaned, "");
    let cleaned = COMMENT_RE.replace_all(&cleaned, "");
    let cleaned = BR_RE.replace_all(&cleaned, "\n");
    let cleaned = LI_RE.replace_all(&cleaned, "\n- ");
    let cleaned = BLOCK_CLOSE_RE.replace_all(&cleaned, "\n\n");
    let cleaned = TAG_RE.replace_all(&cleaned, "");
    let decoded = decode_entities(&cleaned);

    let joined = decoded
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    let collapsed = MANY_NEWLINES_RE.replace_all(&joined, "\n\n");
    let collapsed = LINE_SPACE_RE.replace_all(&collapsed, " ");
    collapsed.trim().to_string()
}
