use booking_extract::{
    extract_bookings, BookingExtractor, ExtractError, InboundEmail, ParserKind, RoutingRule,
};

const AGGREGATOR: &str = "no-reply@bokun.io";
const WEBSITE: &str = "shop@phuketdaytrips.com";

const AGGREGATOR_BODY: &str = r#"
<html>
    <body>
        <table>
            <tr><td><strong>Ext. booking ref</strong></td><td>GYGVN3W8ZKMV</td></tr>
            <tr><td><strong>Date</strong></td><td>Sat 21 Jun '25 @ 09:00</td></tr>
            <tr><td><strong>PAX</strong></td><td>4 Adult</td></tr>
        </table>
    </body>
</html>
"#;

const WEBSITE_BODY: &str = "\
Order number: 34526
Booking #34527 Phi Phi Island Tour (#HKT0041)
Booking Date: August 6, 2025
Adults: 4
Booking #34528 James Bond Island (#HKT0014)
Booking Date: August 5, 2025
Adult (+11): 4
Billing address
Jane Doe
Kata Palm Resort
Congratulations on the sale.
";

fn rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(AGGREGATOR, ParserKind::HtmlTable),
        RoutingRule::new(WEBSITE, ParserKind::PlainTextMultiOrder),
    ]
}

#[test]
fn test_aggregator_email_end_to_end() {
    let email = InboundEmail::new(AGGREGATOR, "New booking", AGGREGATOR_BODY);
    let extraction = extract_bookings(&email, &rules()).unwrap();

    assert_eq!(extraction.selection.parser, Some(ParserKind::HtmlTable));
    assert_eq!(extraction.bookings.len(), 1);
    assert_eq!(extraction.bookings[0].booking_number, "GYGVN3W8ZKMV");
    assert_eq!(extraction.bookings[0].tour_date, "21.Jun '25");
    assert_eq!(extraction.bookings[0].adult_count, "4");
}

#[test]
fn test_website_email_end_to_end() {
    let email = InboundEmail::new(WEBSITE, "New order #34526", WEBSITE_BODY);
    let extraction = extract_bookings(&email, &rules()).unwrap();

    assert_eq!(
        extraction.selection.parser,
        Some(ParserKind::PlainTextMultiOrder)
    );
    assert_eq!(extraction.bookings.len(), 2);
    assert_eq!(extraction.bookings[0].customer_name, "Jane Doe");
    assert_eq!(extraction.bookings[1].customer_name, "Jane Doe");
    assert_eq!(extraction.bookings[0].hotel, "Kata Palm Resort");
    assert_eq!(extraction.bookings[1].sku.as_deref(), Some("HKT0014"));
}

#[test]
fn test_unrouted_email_yields_no_bookings() {
    let email = InboundEmail::new("friend@example.com", "Lunch?", "See you at noon");
    let extraction = extract_bookings(&email, &rules()).unwrap();

    assert!(extraction.selection.is_none());
    assert!(extraction.bookings.is_empty());
    assert!(extraction.selection.reason.is_some());
}

#[test]
fn test_missing_phone_for_both_parsers() {
    let html = extract_bookings(
        &InboundEmail::new(AGGREGATOR, "", AGGREGATOR_BODY),
        &rules(),
    )
    .unwrap();
    assert_eq!(html.bookings[0].phone_number, "");

    let text = extract_bookings(&InboundEmail::new(WEBSITE, "", WEBSITE_BODY), &rules()).unwrap();
    assert!(text.bookings.iter().all(|b| b.phone_number.is_empty()));
}

#[test]
fn test_structural_failure_propagates() {
    let email = InboundEmail::new(AGGREGATOR, "Cancelled", "Your booking was cancelled.");
    let result = extract_bookings(&email, &rules());
    assert!(matches!(result, Err(ExtractError::StructuralParse(_))));
}

#[test]
fn test_builder_routes_and_caps_size() {
    let extractor = BookingExtractor::builder()
        .route(AGGREGATOR, ParserKind::HtmlTable)
        .max_body_bytes(64)
        .build();
    assert_eq!(extractor.rules().len(), 1);

    let email = InboundEmail::new(AGGREGATOR, "", AGGREGATOR_BODY);
    match extractor.extract(&email) {
        Err(ExtractError::InputTooLarge { size, limit }) => {
            assert_eq!(size, AGGREGATOR_BODY.len());
            assert_eq!(limit, 64);
        }
        other => panic!("Expected InputTooLarge, got {other:?}"),
    }

    let uncapped = BookingExtractor::builder().rules(rules()).build();
    let extraction = uncapped.extract(&email).unwrap();
    assert_eq!(extraction.bookings.len(), 1);
}

#[test]
fn test_bookings_serialize_with_camel_case_keys() {
    let email = InboundEmail::new(WEBSITE, "", WEBSITE_BODY);
    let extraction = extract_bookings(&email, &rules()).unwrap();

    let json = serde_json::to_value(&extraction.bookings[0]).unwrap();
    assert_eq!(json["bookingNumber"], "34527");
    assert_eq!(json["orderNumber"], "34526");
    assert_eq!(json["tourDate"], "06.Aug '25");
    assert_eq!(json["adultCount"], "4");
    assert!(json.get("paidAmount").is_none());
}
