//! Tokenized sentences addressed to an output row.

use serde::{Deserialize, Serialize};

/// A tokenized sentence and the output row its vector is written to.
///
/// Row indices need not be contiguous or unique within a batch. Two sentences
/// sharing an index accumulate into the same row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSentence {
    /// Tokens in sentence order
    pub words: Vec<String>,
    /// Target row in the output matrix
    pub index: usize,
}

impl IndexedSentence {
    /// Create a sentence from any iterable of tokens.
    pub fn new<I, S>(words: I, index: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            index,
        }
    }

    /// Number of tokens before any vocabulary filtering.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the sentence carries no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
