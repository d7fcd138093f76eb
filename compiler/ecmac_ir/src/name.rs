//! Interned identifier/string handle.

use std::fmt;

/// An interned string (identifier or string-literal contents).
///
/// Equality and hashing are O(1) integer comparisons; the backing text is
/// recovered from a [`crate::interner::StringInterner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Name(pub u32);

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}
