//! Chooses which parser, if any, handles an inbound email.

use crate::content::{preclean_text, to_plain_text};
use crate::model::{ParserKind, ParserSelection, RoutingRule};
use log::debug;

/// Phrase every website order confirmation carries.
pub const ORDER_ANCHOR: &str = "Order number:";

const NEW_BOOKING_PHRASES: &[&str] = &["new booking", "new order"];

/// Bare, lower-cased address from a header value such as
/// `Tours Desk <Bookings@Example.com>`.
pub fn normalize_address(raw: &str) -> String {
    let raw = raw.trim();
    let address = match (raw.rfind('<'), raw.rfind('>')) {
        (Some(open), Some(close)) if open < close => &raw[open + 1..close],
        _ => raw,
    };
    address.trim().to_lowercase()
}

fn has_order_anchor(raw_content: &str) -> bool {
    to_plain_text(&preclean_text(raw_content)).contains(ORDER_ANCHOR)
}

fn subject_announces_booking(subject: &str) -> bool {
    let subject = subject.to_lowercase();
    NEW_BOOKING_PHRASES
        .iter()
        .any(|phrase| subject.contains(phrase))
}

/// Pick a parser for `(from_address, subject, raw_content)`.
///
/// Rules are walked in order and the first exact sender match decides. A
/// match on a website-order rule also needs the order anchor in the body;
/// without it the email is not routed, so other mail from the same address
/// is never misparsed. When no rule applies, a subject announcing a new
/// booking plus the order anchor still selects the order parser.
///
/// Never fails: the "no parser" outcome carries a reason instead.
pub fn select(
    from_address: &str,
    subject: &str,
    raw_content: &str,
    routing_rules: &[RoutingRule],
) -> ParserSelection {
    let sender = normalize_address(from_address);

    let rule = routing_rules
        .iter()
        .find(|rule| normalize_address(&rule.from_address) == sender);

    if let Some(rule) = rule {
        debug!("Sender {} matched routing rule for {}", sender, rule.parser);
        return match rule.parser {
            ParserKind::HtmlTable => {
                ParserSelection::matched(ParserKind::HtmlTable, format!("routing rule for {sender}"))
            }
            ParserKind::PlainTextMultiOrder if has_order_anchor(raw_content) => {
                ParserSelection::matched(
                    ParserKind::PlainTextMultiOrder,
                    format!("routing rule for {sender}"),
                )
            }
            ParserKind::PlainTextMultiOrder => ParserSelection::none(format!(
                "sender {sender} is routed to the order parser but the body has no \"{ORDER_ANCHOR}\""
            )),
        };
    }

    if subject_announces_booking(subject) && has_order_anchor(raw_content) {
        debug!("Subject {:?} looks like a new order", subject);
        return ParserSelection::matched(
            ParserKind::PlainTextMultiOrder,
            "subject announces a new booking and the body carries an order number",
        );
    }

    ParserSelection::none(format!("no parser found for sender {sender}"))
}
