//! Batch entry point.
//!
//! Selects the populate strategy from the model, runs the averaging engine
//! and reports effective counts.

use tracing::{debug, trace};

use sentvec_types::IndexedSentence;

use crate::batch::{populate_plain, populate_subword, BatchArrays, BatchCounts, MAX_WORDS};
use crate::engine::compute_averages;
use crate::error::AverageError;
use crate::model::{AverageModel, AverageStrategy};

/// Per-worker working memory, owned by the caller and reused across calls.
///
/// Must not be shared between concurrent calls. The scratch vector is all
/// zeros between calls.
#[derive(Debug, Clone)]
pub struct AverageMemory {
    pub batch: BatchArrays,
    pub scratch: Vec<f32>,
}

impl AverageMemory {
    /// Allocate working memory for embeddings of width `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            batch: BatchArrays::new(),
            scratch: vec![0.0; dim],
        }
    }
}

/// Average `sentences` into `output`, one row per sentence target index.
///
/// `output` is a caller-owned row-major matrix of width `model.dim()`. Rows
/// not addressed by a contributing sentence keep their previous contents.
/// At most `MAX_WORDS` words are processed; the rest is silently dropped.
///
/// Returns the effective sentence and word counts.
pub fn train_average(
    model: &AverageModel<'_>,
    sentences: &[IndexedSentence],
    output: &mut [f32],
    memory: &mut AverageMemory,
) -> Result<BatchCounts, AverageError> {
    let dim = model.dim();
    if output.len() % dim != 0 {
        return Err(AverageError::InvalidInput(format!(
            "output of {} values is not a whole number of rows of width {}",
            output.len(),
            dim
        )));
    }
    if memory.scratch.len() != dim {
        return Err(AverageError::DimensionMismatch {
            expected: dim,
            actual: memory.scratch.len(),
        });
    }

    let AverageMemory { batch, scratch } = memory;
    let strategy = model.strategy();
    let counts = match (strategy, model.subword()) {
        (AverageStrategy::SubwordFallback, Some(subword)) => {
            populate_subword(model.vocab(), subword.hasher(), sentences, batch)
        }
        _ => populate_plain(model.vocab(), sentences, batch),
    };

    if counts.truncated {
        trace!(
            max_words = MAX_WORDS,
            sentences = counts.sentences,
            input_sentences = sentences.len(),
            "Batch truncated at word capacity"
        );
    }

    compute_averages(model, batch, &counts, output, scratch);

    debug!(
        ?strategy,
        sentences = counts.sentences,
        words = counts.words,
        "Batch averaged"
    );

    Ok(counts)
}
