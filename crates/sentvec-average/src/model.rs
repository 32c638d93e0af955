//! Borrowed model views.
//!
//! The kernel never owns embedding storage. A model is a set of slices into
//! caller-owned tables plus the configuration needed to pick a strategy.

use std::fmt;

use sentvec_types::{Settings, SubwordSettings, Vocabulary};

use crate::error::AverageError;
use crate::ngrams::{FastTextHasher, NgramHasher};

/// Read-only row-major matrix view.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    data: &'a [f32],
    dim: usize,
}

impl<'a> MatrixView<'a> {
    /// Wrap a row-major slice. Its length must be a multiple of `dim`.
    pub fn new(data: &'a [f32], dim: usize) -> Result<Self, AverageError> {
        if dim == 0 {
            return Err(AverageError::InvalidInput(
                "matrix dimension must be > 0".to_string(),
            ));
        }
        if data.len() % dim != 0 {
            return Err(AverageError::InvalidInput(format!(
                "matrix of {} values is not a whole number of rows of width {}",
                data.len(),
                dim
            )));
        }
        Ok(Self { data, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.data.len() / self.dim
    }

    /// Row `index`. Panics if out of range.
    #[inline]
    pub fn row(&self, index: usize) -> &'a [f32] {
        let start = index * self.dim;
        &self.data[start..start + self.dim]
    }
}

/// Accumulation strategy, selected by whether the model carries subword data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageStrategy {
    /// Drop out-of-vocabulary tokens
    PlainVocabulary,
    /// Represent out-of-vocabulary tokens by their hashed n-gram vectors
    SubwordFallback,
}

/// Largest value in a weight table, 0.0 when empty.
pub fn max_weight(weights: &[f32]) -> f32 {
    if weights.is_empty() {
        return 0.0;
    }
    weights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

/// N-gram side of a subword-fallback model.
pub struct SubwordModel<'a> {
    ngram_vectors: MatrixView<'a>,
    min_n: usize,
    max_n: usize,
    bucket: usize,
    /// Computed from the weight table; not applied to n-gram averages.
    max_weight: f32,
    hasher: Box<dyn NgramHasher + 'a>,
}

impl<'a> SubwordModel<'a> {
    /// Build a subword model with the fastText hasher.
    ///
    /// `ngram_vectors` must have exactly `settings.bucket` rows.
    pub fn from_settings(
        ngram_vectors: MatrixView<'a>,
        settings: &SubwordSettings,
        weights: &[f32],
    ) -> Result<Self, AverageError> {
        settings.validate()?;
        if ngram_vectors.rows() != settings.bucket {
            return Err(AverageError::DimensionMismatch {
                expected: settings.bucket,
                actual: ngram_vectors.rows(),
            });
        }
        Ok(Self {
            ngram_vectors,
            min_n: settings.min_n,
            max_n: settings.max_n,
            bucket: settings.bucket,
            max_weight: max_weight(weights),
            hasher: Box::new(FastTextHasher::from_settings(settings)),
        })
    }

    /// Replace the n-gram hasher. Indices it yields must be below `bucket`.
    pub fn with_hasher(mut self, hasher: impl NgramHasher + 'a) -> Self {
        self.hasher = Box::new(hasher);
        self
    }

    pub fn ngram_vectors(&self) -> MatrixView<'a> {
        self.ngram_vectors
    }

    pub fn min_n(&self) -> usize {
        self.min_n
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    pub fn bucket(&self) -> usize {
        self.bucket
    }

    pub fn max_weight(&self) -> f32 {
        self.max_weight
    }

    pub fn hasher(&self) -> &dyn NgramHasher {
        self.hasher.as_ref()
    }
}

impl fmt::Debug for SubwordModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubwordModel")
            .field("rows", &self.ngram_vectors.rows())
            .field("min_n", &self.min_n)
            .field("max_n", &self.max_n)
            .field("bucket", &self.bucket)
            .field("max_weight", &self.max_weight)
            .finish_non_exhaustive()
    }
}

/// Read-only view of everything the kernel needs from an embedding model.
pub struct AverageModel<'a> {
    vocab: &'a dyn Vocabulary,
    vectors: MatrixView<'a>,
    weights: &'a [f32],
    workers: usize,
    subword: Option<SubwordModel<'a>>,
}

impl<'a> AverageModel<'a> {
    /// Plain-vocabulary model. `weights` needs one entry per vector row.
    pub fn new(
        vocab: &'a dyn Vocabulary,
        vectors: MatrixView<'a>,
        weights: &'a [f32],
    ) -> Result<Self, AverageError> {
        if weights.len() < vectors.rows() {
            return Err(AverageError::DimensionMismatch {
                expected: vectors.rows(),
                actual: weights.len(),
            });
        }
        Ok(Self {
            vocab,
            vectors,
            weights,
            workers: 1,
            subword: None,
        })
    }

    /// Enable subword fallback. N-gram vectors must share the embedding width.
    pub fn with_subwords(mut self, subword: SubwordModel<'a>) -> Result<Self, AverageError> {
        let ngram_dim = subword.ngram_vectors().dim();
        if ngram_dim != self.dim() {
            return Err(AverageError::DimensionMismatch {
                expected: self.dim(),
                actual: ngram_dim,
            });
        }
        self.subword = Some(subword);
        Ok(self)
    }

    /// Apply loaded settings after validating them.
    ///
    /// Only the worker count lands on the model; subword settings are applied
    /// through `SubwordModel::from_settings`.
    pub fn with_settings(self, settings: &Settings) -> Result<Self, AverageError> {
        settings.validate()?;
        Ok(self.with_workers(settings.workers))
    }

    /// Record the worker count used by an outer dispatcher.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn strategy(&self) -> AverageStrategy {
        if self.subword.is_some() {
            AverageStrategy::SubwordFallback
        } else {
            AverageStrategy::PlainVocabulary
        }
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.vectors.dim()
    }

    pub fn vocab(&self) -> &'a dyn Vocabulary {
        self.vocab
    }

    pub fn vectors(&self) -> MatrixView<'a> {
        self.vectors
    }

    pub fn weights(&self) -> &'a [f32] {
        self.weights
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn subword(&self) -> Option<&SubwordModel<'a>> {
        self.subword.as_ref()
    }
}

impl fmt::Debug for AverageModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AverageModel")
            .field("vocab_len", &self.vocab.len())
            .field("rows", &self.vectors.rows())
            .field("dim", &self.vectors.dim())
            .field("workers", &self.workers)
            .field("subword", &self.subword)
            .finish()
    }
}
