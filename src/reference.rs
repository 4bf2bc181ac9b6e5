//! Reference-string parsing.
//!
//! A reference string is the ordered sequence of page accesses that drives a
//! simulation. It is parsed once from free-form text and is immutable from
//! then on; the Optimal policy retains its own copy of the full sequence for
//! look-ahead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::page::PageId;

/// An ordered, immutable sequence of page references.
///
/// # Examples
///
/// ```
/// use framesim::ReferenceString;
///
/// let refs = ReferenceString::parse("1 2 3 4 1 2 5").unwrap();
/// assert_eq!(refs.len(), 7);
/// assert_eq!(refs.skipped_tokens(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceString {
    pages: Vec<PageId>,
    skipped: usize,
}

impl ReferenceString {
    /// Parses whitespace-separated page numbers.
    ///
    /// Tokens that fail to parse as integers are skipped, not rejected; the
    /// skip count is retained so hosts can warn the user about malformed
    /// input without aborting the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoUsableTokens`] when no token parses, including
    /// for empty or all-whitespace input.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut pages = Vec::new();
        let mut skipped = 0usize;

        for token in raw.split_whitespace() {
            match token.parse::<i64>() {
                Ok(number) => pages.push(PageId::new(number)),
                Err(_) => skipped += 1,
            }
        }

        if pages.is_empty() {
            return Err(ParseError::NoUsableTokens { skipped });
        }

        Ok(Self { pages, skipped })
    }

    /// Builds a reference string from already-validated pages.
    ///
    /// An empty sequence is allowed here and yields a no-op simulation.
    #[must_use]
    pub fn from_pages(pages: impl IntoIterator<Item = PageId>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            skipped: 0,
        }
    }

    /// Number of page references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True when the sequence holds no references.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The reference at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<PageId> {
        self.pages.get(index).copied()
    }

    /// The full sequence as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PageId] {
        &self.pages
    }

    /// Iterates the references in order.
    pub fn iter(&self) -> impl Iterator<Item = PageId> + '_ {
        self.pages.iter().copied()
    }

    /// Number of input tokens that were dropped during parsing.
    #[must_use]
    pub const fn skipped_tokens(&self) -> usize {
        self.skipped
    }
}

impl fmt::Display for ReferenceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for page in &self.pages {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{page}")?;
            first = false;
        }
        Ok(())
    }
}
