use crate::config::ExtractorConfig;
use crate::{extract_bookings, ExtractError, Extraction, InboundEmail, ParserKind, RoutingRule};

/// Builder for configuring a reusable [`BookingExtractor`]
#[derive(Debug, Default)]
pub struct BookingExtractorBuilder {
    rules: Vec<RoutingRule>,
    max_body_bytes: Option<usize>,
}

impl BookingExtractorBuilder {
    /// Route a sender address to a parser
    ///
    /// Rules are tried in the order they are added.
    ///
    /// # Example
    /// ```
    /// use booking_extract::{BookingExtractor, ParserKind};
    ///
    /// let extractor = BookingExtractor::builder()
    ///     .route("no-reply@bokun.io", ParserKind::HtmlTable)
    ///     .build();
    /// ```
    pub fn route(mut self, from_address: impl Into<String>, parser: ParserKind) -> Self {
        self.rules.push(RoutingRule::new(from_address, parser));
        self
    }

    /// Append a list of routing rules
    pub fn rules(mut self, rules: impl IntoIterator<Item = RoutingRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Refuse email bodies larger than `limit` bytes
    ///
    /// The HTML parser builds a full DOM, so unbounded input costs
    /// proportional memory and time.
    ///
    /// # Example
    /// ```
    /// use booking_extract::BookingExtractor;
    ///
    /// let extractor = BookingExtractor::builder()
    ///     .max_body_bytes(512 * 1024)
    ///     .build();
    /// ```
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    /// Take routing rules and the size cap from a loaded configuration
    pub fn config(mut self, config: &ExtractorConfig) -> Self {
        self.rules.extend(config.routing.iter().cloned());
        if let Some(limit) = config.max_body_bytes {
            self.max_body_bytes = Some(limit);
        }
        self
    }

    pub fn build(self) -> BookingExtractor {
        BookingExtractor {
            rules: self.rules,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Routing rules plus an optional size cap, applied to every email passed in.
#[derive(Debug, Clone, Default)]
pub struct BookingExtractor {
    rules: Vec<RoutingRule>,
    max_body_bytes: Option<usize>,
}

impl BookingExtractor {
    pub fn builder() -> BookingExtractorBuilder {
        BookingExtractorBuilder::default()
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    /// Extract bookings from one email
    ///
    /// # Errors
    /// Returns `ExtractError` if:
    /// - The body is larger than the configured cap
    /// - The selected parser cannot make sense of the markup at all
    pub fn extract(&self, email: &InboundEmail) -> Result<Extraction, ExtractError> {
        if let Some(limit) = self.max_body_bytes {
            if email.body.len() > limit {
                return Err(ExtractError::InputTooLarge {
                    size: email.body.len(),
                    limit,
                });
            }
        }

        extract_bookings(email, &self.rules)
    }
}
