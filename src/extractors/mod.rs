use crate::error::ExtractError;
use crate::model::{ExtractedBooking, ParserKind};

mod html_table;
mod order_text;

pub use html_table::{HtmlTableExtractor, LabelIndex};
pub use order_text::OrderTextExtractor;

pub trait Extractor {
    /// Extract every booking carried by a raw email body.
    fn extract(&self, content: &str) -> Result<Vec<ExtractedBooking>, ExtractError>;
}

impl ParserKind {
    /// Run the parser this kind names over a raw body.
    pub fn extract(&self, content: &str) -> Result<Vec<ExtractedBooking>, ExtractError> {
        match self {
            ParserKind::HtmlTable => HtmlTableExtractor.extract(content),
            ParserKind::PlainTextMultiOrder => OrderTextExtractor.extract(content),
        }
    }
}
