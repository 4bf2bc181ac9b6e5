//! Page identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a referenced memory page.
///
/// A page has no meaning beyond equality: two references to the same number
/// are references to the same page. Any integer parseable from a reference
/// token is a valid page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(i64);

impl PageId {
    /// Creates a page id from a raw page number.
    #[must_use]
    pub const fn new(number: i64) -> Self {
        Self(number)
    }

    /// The raw page number.
    #[must_use]
    pub const fn number(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PageId {
    fn from(number: i64) -> Self {
        Self(number)
    }
}
