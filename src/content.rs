//! Raw email body preparation shared by the selector and the parsers.

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

static SOFT_LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\r?\n").unwrap());
static ENCODED_EQUALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"=3D").unwrap());
static HTML_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*(?:!doctype|html|body|table|div|p|br|span|td)\b").unwrap()
});

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "div", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "ol", "p", "section", "table", "tbody", "thead", "tr", "ul",
];
const CELL_ELEMENTS: &[&str] = &["td", "th"];
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "title"];

/// Undo quoted-printable transfer encoding left in the body: soft line
/// wraps (`=` at end of line) are joined and `=XX` escapes decoded.
///
/// Must run before any DOM is built, otherwise label text keeps the
/// escape sequences and label matching fails.
pub fn preclean(raw: &str) -> String {
    let joined = SOFT_LINE_BREAK.replace_all(raw, "");
    decode_qp_escapes(&joined)
}

/// Pre-clean for plain-text bodies, which are often sent unencoded. Soft
/// line wraps are always joined; `=XX` escapes are only decoded when the
/// body shows quoted-printable encoding (soft wraps or an encoded `=`).
pub fn preclean_text(raw: &str) -> String {
    if SOFT_LINE_BREAK.is_match(raw) || ENCODED_EQUALS.is_match(raw) {
        preclean(raw)
    } else {
        raw.to_string()
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn decode_qp_escapes(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'=' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                decoded.push((high << 4) | low);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Cheap sniff for HTML bodies.
pub fn looks_like_html(content: &str) -> bool {
    HTML_MARKER.is_match(content)
}

/// Flatten a body to plain text lines. HTML is rendered with one line per
/// block element; plain text only has entities decoded. Lines are trimmed,
/// inner whitespace collapsed and blank lines dropped.
pub fn to_plain_text(content: &str) -> String {
    let text = if looks_like_html(content) {
        let document = Html::parse_document(content);
        let mut out = String::new();
        collect_text(document.root_element(), &mut out);
        out
    } else {
        decode_html_entities(content).into_owned()
    };

    text.lines()
        .map(crate::normalize::collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_element, out);
                if block {
                    out.push('\n');
                } else if CELL_ELEMENTS.contains(&name) {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
