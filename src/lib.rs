//! Booking extraction from inbound notification emails.
//!
//! Two upstream formats are understood: aggregator notifications laid out as
//! a label/value HTML table (one booking each) and website order
//! confirmations in plain text (one or more bookings per order). A
//! [`selector::select`] call decides which parser applies; the parser then
//! returns an ordered list of [`ExtractedBooking`] records.
//!
//! ```
//! use booking_extract::{extract_bookings, InboundEmail, ParserKind, RoutingRule};
//!
//! let rules = vec![RoutingRule::new("no-reply@bokun.io", ParserKind::HtmlTable)];
//! let email = InboundEmail::new(
//!     "no-reply@bokun.io",
//!     "New booking",
//!     "<table><tr><td><strong>Ext. booking ref</strong></td><td>GYGVN3W8ZKMV</td></tr></table>",
//! );
//!
//! let extraction = extract_bookings(&email, &rules).unwrap();
//! assert_eq!(extraction.bookings[0].booking_number, "GYGVN3W8ZKMV");
//! ```

pub mod builder;
pub mod config;
pub mod content;
pub mod error;
pub mod extractors;
pub mod formatter;
pub mod model;
pub mod normalize;
pub mod selector;

use log::{debug, info};

pub use builder::{BookingExtractor, BookingExtractorBuilder};
pub use error::ExtractError;
pub use extractors::{Extractor, HtmlTableExtractor, OrderTextExtractor};
pub use formatter::{format_booking, format_bookings};
pub use model::{
    ExtractedBooking, Extraction, InboundEmail, ParserKind, ParserSelection, Pax, RoutingRule,
    NOT_AVAILABLE,
};
pub use normalize::{normalize_date, normalize_pax, normalize_phone, parse_currency};
pub use selector::select;

/// Select a parser for `email` and run it.
///
/// An email no parser claims is not an error: the returned extraction has
/// no bookings and its selection carries the reason.
pub fn extract_bookings(
    email: &InboundEmail,
    rules: &[RoutingRule],
) -> Result<Extraction, ExtractError> {
    let selection = select(&email.from_address, &email.subject, &email.body, rules);

    let bookings = match selection.parser {
        Some(parser) => {
            debug!("Using {} parser for {}", parser, email.from_address);
            parser.extract(&email.body)?
        }
        None => {
            info!(
                "Skipping email: {}",
                selection.reason.as_deref().unwrap_or("no parser found")
            );
            Vec::new()
        }
    };

    Ok(Extraction {
        selection,
        bookings,
    })
}
