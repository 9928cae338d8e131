//! Routing-key extraction for component and modal interactions.
//!
//! The platform gives component-based interactions a single opaque
//! identifier. Prefixing identifiers with a common routing key keeps them
//! easy to route, e.g. `calendar_month:january_user:0123456` routes to
//! `calendar` and hands `month:january_user:0123456` to the handler
//! unchanged.

use std::fmt;

/// Default separator between routing key and remainder.
pub const DEFAULT_SEPARATOR: char = '_';

/// Splits an opaque identifier into `(key, remainder)`.
pub trait IdSplitter: Send + Sync + 'static {
    /// Returns the routing key and the untouched remainder.
    fn split<'a>(&self, id: &'a str) -> (&'a str, &'a str);
}

/// Splits at the first occurrence of a separator character.
///
/// An identifier without the separator is entirely key, with an empty
/// remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeparatorSplitter {
    separator: char,
}

impl SeparatorSplitter {
    /// Creates a splitter using `separator`.
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Returns the separator.
    pub fn separator(&self) -> char {
        self.separator
    }
}

impl Default for SeparatorSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl IdSplitter for SeparatorSplitter {
    fn split<'a>(&self, id: &'a str) -> (&'a str, &'a str) {
        id.split_once(self.separator).unwrap_or((id, ""))
    }
}

/// An interaction together with the routing key it was dispatched under.
#[derive(Clone, PartialEq)]
pub struct Routed<T> {
    /// The routing key that selected the handler.
    pub key: String,
    /// Everything after the separator, verbatim.
    pub remainder: String,
    /// The full interaction.
    pub interaction: T,
}

impl<T> Routed<T> {
    /// Splits `id` with `splitter` and wraps `interaction`.
    pub fn new(splitter: &dyn IdSplitter, id: &str, interaction: T) -> Self {
        let (key, remainder) = splitter.split(id);
        Self {
            key: key.to_string(),
            remainder: remainder.to_string(),
            interaction,
        }
    }
}

impl<T> fmt::Debug for Routed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routed")
            .field("key", &self.key)
            .field("remainder", &self.remainder)
            .finish_non_exhaustive()
    }
}
