use super::Extractor;
use crate::content::{preclean_text, to_plain_text};
use crate::error::ExtractError;
use crate::model::{ExtractedBooking, Pax, NOT_AVAILABLE};
use crate::normalize::{
    apply_pax_token, clean_text, collapse_whitespace, normalize_date, normalize_phone,
    parse_currency,
};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Order\s+number:\s*#?\s*(\d+)").unwrap());
static ORDER_HASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\border\s*#\s*(\d+)").unwrap());
static BOOKING_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Booking\s*#\s*(\d+)").unwrap());
static SKU: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(#\s*([A-Za-z0-9_-]+)\s*\)").unwrap());
static ITEMS_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:Subtotal:|Billing address)").unwrap());
static TOUR_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s*\d{4}",
    )
    .unwrap()
});
static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:฿|\$|€|£|\bTHB|\bUSD|\bEUR)\s*-?\d[\d,]*(?:\.\d+)?").unwrap()
});
static ADULTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Adults?\s*(?:\(\+\d+\))?:?\s*\(?\+?(\d+)\)?").unwrap()
});
static CHILDREN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Child(?:ren)?\s*(?:\(\+\d+\))?:?\s*\(?\+?(\d+)\)?").unwrap()
});
static INFANTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Infants?\s*(?:\(\+\d+\))?:?\s*\(?\+?(\d+)\)?").unwrap()
});
static CUSTOMER_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*Billing address").unwrap());
static CUSTOMER_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Congratulations").unwrap());
static HOTEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(?:pick-?up\s+)?hotel(?:\s+name)?\s*:\s*(.+)$").unwrap()
});
static PHONE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:phone|tel|mobile)\s*:?\s*)?\+?[\d\s().-]{7,}$").unwrap()
});

/// Extracts every booking from a website order confirmation.
///
/// The order body repeats a `Booking #<n> <product> (#<SKU>)` block per
/// product and ends with one billing block shared by all of them. Each
/// product block is parsed on its own so counts, dates and prices never
/// leak between bookings of the same order.
pub struct OrderTextExtractor;

/// Customer details shared by every booking of an order.
#[derive(Debug, Default, Clone, PartialEq)]
struct CustomerBlock {
    name: String,
    hotel: String,
    phone: String,
}

/// One product block of the order.
struct Segment<'t> {
    booking_number: String,
    text: &'t str,
}

fn order_number(text: &str) -> Option<String> {
    ORDER_NUMBER
        .captures(text)
        .or_else(|| ORDER_HASH.captures(text))
        .map(|caps| caps[1].to_string())
}

/// Split the item area of the order into product blocks. A booking number
/// seen twice keeps its first block only; anything after the item area
/// (subtotals, billing) never belongs to a block.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let first_anchor = match BOOKING_ANCHOR.find(text) {
        Some(anchor) => anchor.start(),
        None => return Vec::new(),
    };
    let items_end = ITEMS_END
        .find_at(text, first_anchor)
        .map(|m| m.start())
        .unwrap_or(text.len());

    let mut anchors: Vec<(usize, String)> = Vec::new();
    for caps in BOOKING_ANCHOR.captures_iter(&text[..items_end]) {
        let number = caps[1].to_string();
        if anchors.iter().any(|(_, seen)| *seen == number) {
            continue;
        }
        if let Some(whole) = caps.get(0) {
            anchors.push((whole.start(), number));
        }
    }

    anchors
        .iter()
        .enumerate()
        .map(|(index, (start, number))| {
            let end = anchors
                .get(index + 1)
                .map(|(next, _)| *next)
                .unwrap_or(items_end);
            Segment {
                booking_number: number.clone(),
                text: &text[*start..end],
            }
        })
        .collect()
}

/// Product name: what follows `Booking #<n>` on its line, up to the SKU.
fn program(segment: &str) -> String {
    let first_line = segment.lines().next().unwrap_or_default();
    let after_anchor = BOOKING_ANCHOR
        .find(first_line)
        .map(|anchor| &first_line[anchor.end()..])
        .unwrap_or(first_line);
    let name = match SKU.find(after_anchor) {
        Some(sku) => &after_anchor[..sku.start()],
        None => after_anchor,
    };
    clean_text(name.trim_start_matches(|c: char| c == '-' || c == ':' || c.is_whitespace()))
}

fn segment_pax(segment: &str) -> Pax {
    let mut pax = Pax::default();
    for (pattern, label) in [(&*ADULTS, "adult"), (&*CHILDREN, "child"), (&*INFANTS, "infant")] {
        if let Some(caps) = pattern.captures(segment) {
            apply_pax_token(&mut pax, &caps[1], label);
        }
    }
    pax
}

fn parse_segment(
    segment: &Segment<'_>,
    order: Option<&str>,
    customer: &CustomerBlock,
) -> ExtractedBooking {
    let sku = SKU.captures(segment.text).map(|caps| caps[1].to_string());
    let tour_date = TOUR_DATE
        .find(segment.text)
        .map(|m| normalize_date(m.as_str()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let paid_amount = PRICE
        .find(segment.text)
        .and_then(|m| parse_currency(m.as_str()));

    if sku.is_none() {
        warn!("Booking #{} has no SKU", segment.booking_number);
    }

    let mut booking = ExtractedBooking {
        booking_number: segment.booking_number.clone(),
        order_number: order.map(str::to_string),
        tour_date,
        program: program(segment.text),
        sku,
        customer_name: customer.name.clone(),
        hotel: customer.hotel.clone(),
        phone_number: customer.phone.clone(),
        paid_amount,
        ..Default::default()
    };
    booking.set_pax(segment_pax(segment.text));
    booking
}

fn is_phone_line(line: &str) -> bool {
    PHONE_LINE.is_match(line) && line.chars().filter(|c| c.is_ascii_digit()).count() >= 7
}

/// Customer name, hotel and phone from the billing block, which runs from
/// `Billing address` to `Congratulations` (or the end of the email).
fn customer_block(text: &str) -> CustomerBlock {
    let mut customer = CustomerBlock::default();

    if let Some(start) = CUSTOMER_START.find(text) {
        let rest = &text[start.end()..];
        let block = match CUSTOMER_END.find(rest) {
            Some(end) => &rest[..end.start()],
            None => rest,
        };
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if let Some(name) = lines.first() {
            customer.name = collapse_whitespace(name);
        }
        if let Some(hotel) = lines.get(1) {
            if !is_phone_line(hotel) && !hotel.contains('@') {
                customer.hotel = clean_text(hotel);
            }
        }
        if let Some(phone) = lines.iter().skip(1).find(|line| is_phone_line(line)) {
            customer.phone = normalize_phone(phone);
        }
    } else {
        debug!("No billing block found");
    }

    if let Some(caps) = HOTEL_LINE.captures(text) {
        customer.hotel = clean_text(&caps[1]);
    }

    customer
}

impl Extractor for OrderTextExtractor {
    fn extract(&self, content: &str) -> Result<Vec<ExtractedBooking>, ExtractError> {
        debug!("Attempting to extract bookings from order confirmation text");

        let text = to_plain_text(&preclean_text(content));
        let order = order_number(&text);
        let customer = customer_block(&text);
        let segments = segments(&text);

        if segments.is_empty() {
            warn!("No booking anchors found, treating the order as a single booking");
            let items_end = CUSTOMER_START
                .find(&text)
                .map(|m| m.start())
                .unwrap_or(text.len());
            let whole = Segment {
                booking_number: order.clone().unwrap_or_default(),
                text: &text[..items_end],
            };
            let mut booking = parse_segment(&whole, order.as_deref(), &customer);
            booking.program = String::new();
            return Ok(vec![booking]);
        }

        let bookings: Vec<ExtractedBooking> = segments
            .iter()
            .map(|segment| parse_segment(segment, order.as_deref(), &customer))
            .collect();

        debug!(
            "Extracted {} bookings from order {}",
            bookings.len(),
            order.as_deref().unwrap_or("<unknown>")
        );

        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_stops_at_sku() {
        assert_eq!(
            program("Booking #34527 Phi Phi Island Tour (#HKT0041)\nAdults: 4"),
            "Phi Phi Island Tour"
        );
        assert_eq!(program("Booking #1 - Sunset Dinner Cruise"), "Sunset Dinner Cruise");
    }

    #[test]
    fn test_segment_pax_accepts_fee_annotations() {
        assert_eq!(segment_pax("Adult (+11): 4").adult, "4");
        assert_eq!(segment_pax("Adults (+11): 4").adult, "4");
        assert_eq!(segment_pax("Adults: 3\nChildren: 2").child, "2");
        assert_eq!(segment_pax("Child (+5): 1\nInfant: 1").infant, "1");
        assert_eq!(segment_pax("no counts here"), Pax::default());
    }

    #[test]
    fn test_phone_line_detection() {
        assert!(is_phone_line("+66 81 234 5678"));
        assert!(is_phone_line("Phone: 081-234-5678"));
        assert!(!is_phone_line("Patong Beach Hotel"));
        assert!(!is_phone_line("12345"));
    }

    #[test]
    fn test_customer_block() {
        let text = "Order number: 1\nBilling address\nJane Doe\nKata Palm Resort\n\
                    +66 81 234 5678\njane@example.com\nCongratulations on the sale.";
        let customer = customer_block(text);
        assert_eq!(customer.name, "Jane Doe");
        assert_eq!(customer.hotel, "Kata Palm Resort");
        assert_eq!(customer.phone, "66812345678");
    }

    #[test]
    fn test_hotel_line_overrides_billing_block() {
        let text = "Pick-up hotel: The Nai Harn\nBilling address\nJane Doe\n12 Beach Road";
        assert_eq!(customer_block(text).hotel, "The Nai Harn");
    }
}
