//! Markup parsing for template sources

mod grammar;
pub mod lexer;

pub use grammar::parse;

use crate::dom::Document;
use crate::error::MarkupError;

/// Turns a markup string into a document
pub trait MarkupParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Document, Vec<MarkupError>>;
}

/// Parser for the HTML subset template sources are written in
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl MarkupParser for HtmlParser {
    fn parse(&self, source: &str) -> Result<Document, Vec<MarkupError>> {
        parse(source)
    }
}
