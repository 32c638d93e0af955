//! # sentvec-types
//!
//! Shared domain types for sentence vector averaging.
//!
//! This crate defines the data the averaging kernel consumes but does not own:
//! - Sentences: token lists tagged with the output row they write to
//! - Vocabularies: token to row-index lookup
//! - Settings: layered configuration for subword hashing and workers
//!
//! ## Usage
//!
//! ```rust
//! use sentvec_types::{IndexedSentence, Vocab, Vocabulary};
//!
//! let vocab = Vocab::from_tokens(["cat", "sat"]);
//! let sentence = IndexedSentence::new(["cat", "sat"], 0);
//! assert_eq!(vocab.index_of(&sentence.words[1]), Some(1));
//! ```

pub mod config;
pub mod error;
pub mod sentence;
pub mod vocab;

pub use config::{Settings, SubwordSettings};
pub use error::SentvecError;
pub use sentence::IndexedSentence;
pub use vocab::{Vocab, Vocabulary};
