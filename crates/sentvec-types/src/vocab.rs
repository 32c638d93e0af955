//! Vocabulary lookup.
//!
//! The averaging kernel only needs token to row-index resolution. Weights live
//! in a separate table indexed by the same row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Read-only mapping from token to embedding row.
///
/// Implementations must be thread-safe (Send + Sync) so a model view can be
/// shared between worker threads.
pub trait Vocabulary: Send + Sync {
    /// Row index of `token`, or `None` if out of vocabulary.
    fn index_of(&self, token: &str) -> Option<usize>;

    /// Number of distinct entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, token: &str) -> bool {
        self.index_of(token).is_some()
    }
}

impl Vocabulary for HashMap<String, usize> {
    fn index_of(&self, token: &str) -> Option<usize> {
        self.get(token).copied()
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// Dense vocabulary with indices assigned in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocab {
    entries: HashMap<String, usize>,
}

impl Vocab {
    /// Build a vocabulary from tokens. Duplicates keep their first index.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = HashMap::new();
        for token in tokens {
            let next = entries.len();
            entries.entry(token.into()).or_insert(next);
        }
        Self { entries }
    }
}

impl Vocabulary for Vocab {
    fn index_of(&self, token: &str) -> Option<usize> {
        self.entries.get(token).copied()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
