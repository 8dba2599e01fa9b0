use crate::error::MedibotError;
use crate::map_err;
use regex::Regex;

pub mod pdf;

/// Implement on anything that has to parse document bytes.
pub trait DocumentParser {
    /// Parse the input into its text elements. A text element is parser
    /// specific; for PDFs it is a page.
    fn parse(&self, input: &[u8]) -> Result<Vec<String>, MedibotError>;
}

/// General parsing configuration for documents.
#[derive(Debug, Default, Clone)]
pub struct ParseConfig {
    /// Filter specific patterns in text elements. Parser specific.
    pub filters: Vec<Regex>,
}

impl ParseConfig {
    /// Add a filter to the parser.
    /// Each line will be checked for the regex and will be omitted if it
    /// matches.
    ///
    /// * `re`: The expression to match for.
    pub fn with_filter(mut self, re: &str) -> Result<Self, MedibotError> {
        self.filters.push(map_err!(Regex::new(re)));
        Ok(self)
    }
}
