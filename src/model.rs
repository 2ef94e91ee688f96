use serde::{Deserialize, Serialize};

/// Sentinel used for a tour date that could not be recognised.
pub const NOT_AVAILABLE: &str = "N/A";

/// An inbound notification email as handed over by the webhook layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundEmail {
    pub from_address: String,
    pub subject: String,
    /// HTML or plain text body
    pub body: String,
}

impl InboundEmail {
    pub fn new(
        from_address: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from_address: from_address.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// One booking pulled out of an email.
///
/// Counts are digit strings defaulting to `"0"`, and `tour_date` is either the
/// canonical `DD.Mon 'YY` form or [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedBooking {
    pub booking_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub tour_date: String,
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub customer_name: String,
    pub hotel: String,
    pub phone_number: String,
    pub adult_count: String,
    pub child_count: String,
    pub infant_count: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
}

impl Default for ExtractedBooking {
    fn default() -> Self {
        let pax = Pax::default();
        Self {
            booking_number: String::new(),
            order_number: None,
            tour_date: NOT_AVAILABLE.to_string(),
            program: String::new(),
            sku: None,
            customer_name: String::new(),
            hotel: String::new(),
            phone_number: String::new(),
            adult_count: pax.adult,
            child_count: pax.child,
            infant_count: pax.infant,
            paid_amount: None,
        }
    }
}

impl ExtractedBooking {
    pub fn pax(&self) -> Pax {
        Pax {
            adult: self.adult_count.clone(),
            child: self.child_count.clone(),
            infant: self.infant_count.clone(),
        }
    }

    pub(crate) fn set_pax(&mut self, pax: Pax) {
        self.adult_count = pax.adult;
        self.child_count = pax.child;
        self.infant_count = pax.infant;
    }
}

/// Passenger breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pax {
    pub adult: String,
    pub child: String,
    pub infant: String,
}

impl Default for Pax {
    fn default() -> Self {
        Self {
            adult: "0".to_string(),
            child: "0".to_string(),
            infant: "0".to_string(),
        }
    }
}

/// The parsers this crate knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    /// Aggregator label/value HTML table
    #[serde(alias = "bokun")]
    HtmlTable,
    /// Website order confirmation carrying one or more bookings
    #[serde(alias = "website")]
    PlainTextMultiOrder,
}

impl ParserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::HtmlTable => "html_table",
            ParserKind::PlainTextMultiOrder => "plain_text_multi_order",
        }
    }
}

impl std::fmt::Display for ParserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes a sender address to a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub from_address: String,
    pub parser: ParserKind,
}

impl RoutingRule {
    pub fn new(from_address: impl Into<String>, parser: ParserKind) -> Self {
        Self {
            from_address: from_address.into(),
            parser,
        }
    }
}

/// Outcome of parser selection for one email. `parser == None` is the
/// "no parser found" case and carries a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserSelection {
    pub parser: Option<ParserKind>,
    pub reason: Option<String>,
}

impl ParserSelection {
    pub fn matched(parser: ParserKind, reason: impl Into<String>) -> Self {
        Self {
            parser: Some(parser),
            reason: Some(reason.into()),
        }
    }

    pub fn none(reason: impl Into<String>) -> Self {
        Self {
            parser: None,
            reason: Some(reason.into()),
        }
    }

    pub fn is_none(&self) -> bool {
        self.parser.is_none()
    }
}

/// Bookings extracted from one email together with how the parser was chosen.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub selection: ParserSelection,
    pub bookings: Vec<ExtractedBooking>,
}
