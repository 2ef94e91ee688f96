use super::Extractor;
use crate::content::preclean;
use crate::error::ExtractError;
use crate::model::{ExtractedBooking, Pax};
use crate::normalize::{
    apply_pax_token, clean_text, collapse_whitespace, normalize_date, normalize_pax,
    normalize_phone,
};
use html_escape::decode_html_entities;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static EMPHASIS: Lazy<Selector> = Lazy::new(|| Selector::parse("b, strong, em").unwrap());
static NESTED_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static PAX_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(\w+)").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

const BOOKING_REF_LABELS: &[&str] = &["Ext. booking ref", "Booking ref.", "Booking ref"];
const PRODUCT_LABEL: &str = "Product";
const PRODUCT_CODE_LABEL: &str = "Product code";
const CUSTOMER_LABEL: &str = "Customer";
const HOTEL_LABELS: &[&str] = &["Pick-up", "Hotel"];
const PHONE_LABEL: &str = "Customer phone";
const DATE_LABEL: &str = "Date";
const PAX_LABEL: &str = "PAX";

/// Extracts a single booking from an aggregator notification laid out as
/// a label/value table (`<td><strong>Label</strong></td><td>Value</td>`).
pub struct HtmlTableExtractor;

/// Label to value-cell lookup, built with one scan over the document.
///
/// A cell counts as a label when it holds no nested cells and its first
/// bold or emphasis element has text; the value is the next sibling cell.
/// Labels are case-folded and the first one in document order wins.
pub struct LabelIndex<'a> {
    cells: HashMap<String, ElementRef<'a>>,
}

impl<'a> LabelIndex<'a> {
    pub fn build(document: &'a Html) -> Self {
        let mut cells = HashMap::new();

        for cell in document.select(&CELL) {
            if cell.select(&CELL).next().is_some() {
                continue;
            }
            let Some(emphasis) = cell.select(&EMPHASIS).next() else {
                continue;
            };
            let label = normalize_label(&element_text(emphasis));
            if label.is_empty() {
                continue;
            }
            let value = cell
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| matches!(sibling.value().name(), "td" | "th"));
            if let Some(value) = value {
                cells.entry(label).or_insert(value);
            }
        }

        debug!("Indexed {} table labels", cells.len());
        LabelIndex { cells }
    }

    pub fn cell(&self, label: &str) -> Option<ElementRef<'a>> {
        self.cells.get(&normalize_label(label)).copied()
    }

    /// Trimmed text of the cell next to `label`, or `""` when the label is absent.
    pub fn find_value_by_label(&self, label: &str) -> String {
        self.cell(label).map(element_text).unwrap_or_default()
    }

    fn first_value(&self, labels: &[&str]) -> String {
        labels
            .iter()
            .map(|label| self.find_value_by_label(label))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}

fn normalize_label(raw: &str) -> String {
    collapse_whitespace(raw)
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Passenger counts from the PAX cell, trying line-broken text, then a
/// nested quantity/type table, then the cell's flat text.
fn extract_pax(cell: ElementRef) -> Pax {
    let inner = cell.inner_html();

    if LINE_BREAK.is_match(&inner) {
        debug!("PAX cell uses line breaks");
        let mut pax = Pax::default();
        for line in LINE_BREAK.split(&inner) {
            let text = decode_html_entities(&TAG.replace_all(line, " ")).into_owned();
            if let Some(caps) = PAX_LINE.captures(&text) {
                apply_pax_token(&mut pax, &caps[1], &caps[2]);
            }
        }
        return pax;
    }

    if let Some(table) = cell.select(&NESTED_TABLE).next() {
        debug!("PAX cell uses a nested table");
        let mut pax = Pax::default();
        for row in table.select(&ROW) {
            let columns: Vec<String> = row.select(&CELL).map(element_text).collect();
            if let [quantity, kind, ..] = columns.as_slice() {
                if let Some(count) = DIGITS.find(quantity) {
                    apply_pax_token(&mut pax, count.as_str(), kind);
                }
            }
        }
        return pax;
    }

    normalize_pax(&element_text(cell))
}

impl Extractor for HtmlTableExtractor {
    fn extract(&self, content: &str) -> Result<Vec<ExtractedBooking>, ExtractError> {
        debug!("Attempting to extract booking from label/value table");

        let cleaned = preclean(content);
        if cleaned.trim().is_empty() {
            return Err(ExtractError::StructuralParse(
                "email body is empty".to_string(),
            ));
        }

        let document = Html::parse_document(&cleaned);
        if document.select(&CELL).next().is_none() {
            return Err(ExtractError::StructuralParse(
                "no table cells found in markup".to_string(),
            ));
        }

        let labels = LabelIndex::build(&document);

        let mut booking = ExtractedBooking {
            booking_number: labels.first_value(BOOKING_REF_LABELS),
            tour_date: normalize_date(&labels.find_value_by_label(DATE_LABEL)),
            program: clean_text(&labels.find_value_by_label(PRODUCT_LABEL)),
            sku: Some(labels.find_value_by_label(PRODUCT_CODE_LABEL)).filter(|s| !s.is_empty()),
            customer_name: labels.find_value_by_label(CUSTOMER_LABEL),
            hotel: clean_text(&labels.first_value(HOTEL_LABELS)),
            phone_number: normalize_phone(&clean_text(&labels.find_value_by_label(PHONE_LABEL))),
            ..Default::default()
        };

        if let Some(cell) = labels.cell(PAX_LABEL) {
            booking.set_pax(extract_pax(cell));
        }

        debug!(
            "Extracted booking {} for {} on {}",
            booking.booking_number, booking.customer_name, booking.tour_date
        );

        Ok(vec![booking])
    }
}
