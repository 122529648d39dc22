//! The word list every room plays against.

use std::collections::BTreeSet;
use std::ops::Bound;

/// An immutable set of uppercase words.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// room. Words live in a `BTreeSet`, which keeps them sorted: a prefix
/// query is then a single range lookup, since the first word `>= prefix`
/// is the only candidate that can start with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    words: BTreeSet<String>,
}

impl Dictionary {
    /// Builds a dictionary from any list of words.
    ///
    /// Each word is trimmed and uppercased; blank entries are dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Builds a dictionary from newline-separated text.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Returns `true` if `word` (already uppercase) is in the set.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Returns `true` if at least one word starts with `prefix`.
    ///
    /// The empty prefix matches as long as the dictionary isn't empty.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.words
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|w| w.starts_with(prefix))
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if there are no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
