//! # sentvec-average
//!
//! Sentence vectors by averaging pretrained token embeddings.
//!
//! A call linearizes a batch of tokenized sentences into fixed-capacity flat
//! arrays, then writes one weighted-average vector per sentence into a
//! caller-owned output matrix.
//!
//! ## Features
//! - Plain-vocabulary averaging with per-word weights
//! - fastText-style subword fallback for out-of-vocabulary tokens
//! - No allocation per call: working memory is caller-owned and reused
//! - Deterministic accumulation order
//!
//! ## Limits
//! - `MAX_WORDS` word occurrences per call, silently truncated
//! - `MAX_NGRAMS` n-gram hashes per out-of-vocabulary token

pub mod batch;
pub mod blas;
pub mod engine;
pub mod error;
pub mod model;
pub mod ngrams;
pub mod train;

pub use batch::{
    populate_plain, populate_subword, BatchArrays, BatchCounts, MAX_NGRAMS, MAX_WORDS, OOV_WORD,
};
pub use engine::compute_averages;
pub use error::AverageError;
pub use model::{max_weight, AverageModel, AverageStrategy, MatrixView, SubwordModel};
pub use ngrams::{compute_ngrams, ft_hash, FastTextHasher, NgramHasher};
pub use train::{train_average, AverageMemory};
