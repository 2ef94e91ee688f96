use booking_extract::selector::select;
use booking_extract::{ParserKind, RoutingRule};

const AGGREGATOR: &str = "no-reply@bokun.io";
const WEBSITE: &str = "shop@phuketdaytrips.com";

fn rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(AGGREGATOR, ParserKind::HtmlTable),
        RoutingRule::new(WEBSITE, ParserKind::PlainTextMultiOrder),
    ]
}

#[test]
fn test_aggregator_sender_selects_html_table() {
    let selection = select(AGGREGATOR, "New booking", "<table></table>", &rules());
    assert_eq!(selection.parser, Some(ParserKind::HtmlTable));
    assert!(selection.reason.is_some());
}

#[test]
fn test_sender_match_ignores_display_name_and_case() {
    let selection = select(
        "Bokun Notifications <No-Reply@Bokun.io>",
        "",
        "<table></table>",
        &rules(),
    );
    assert_eq!(selection.parser, Some(ParserKind::HtmlTable));
}

#[test]
fn test_website_order_needs_anchor_phrase() {
    let order = "Thanks!\nOrder number: 34526\nBooking #34527 Tour (#HKT0041)";
    let selection = select(WEBSITE, "Your order", order, &rules());
    assert_eq!(selection.parser, Some(ParserKind::PlainTextMultiOrder));

    let newsletter = "Our summer promotions are here!";
    let selection = select(WEBSITE, "Summer deals", newsletter, &rules());
    assert!(selection.is_none());
    assert!(selection.reason.unwrap().contains("Order number:"));
}

#[test]
fn test_anchor_phrase_found_in_html_body() {
    let html = "<html><body><h2>New order</h2><p>Order number: 12</p></body></html>";
    let selection = select(WEBSITE, "", html, &rules());
    assert_eq!(selection.parser, Some(ParserKind::PlainTextMultiOrder));
}

#[test]
fn test_subject_heuristic_without_rule() {
    let selection = select(
        "someone@elsewhere.com",
        "[Shop] New Booking received",
        "Order number: 99\nBooking #100 Tour (#X1)",
        &rules(),
    );
    assert_eq!(selection.parser, Some(ParserKind::PlainTextMultiOrder));

    let selection = select(
        "someone@elsewhere.com",
        "[Shop] New Booking received",
        "Thanks for reaching out",
        &rules(),
    );
    assert!(selection.is_none());
}

#[test]
fn test_first_matching_rule_wins() {
    let rules = vec![
        RoutingRule::new("ops@example.com", ParserKind::HtmlTable),
        RoutingRule::new("ops@example.com", ParserKind::PlainTextMultiOrder),
    ];
    let selection = select("ops@example.com", "", "Order number: 1", &rules);
    assert_eq!(selection.parser, Some(ParserKind::HtmlTable));
}

#[test]
fn test_no_match_is_not_an_error() {
    let inputs = [
        ("", "", ""),
        ("random@example.com", "Hello", "Just checking in"),
        ("not an address", "New booking", "no anchor here"),
        ("<>", "\u{0}", "=\n=ZZ<<<"),
    ];

    for (from, subject, body) in inputs {
        let selection = select(from, subject, body, &rules());
        assert!(selection.is_none(), "input {from:?} {subject:?} {body:?}");
        assert!(selection.reason.is_some());
    }

    assert!(select(AGGREGATOR, "", "", &[]).is_none());
}
