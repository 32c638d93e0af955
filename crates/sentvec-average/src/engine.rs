//! Averaging engine.
//!
//! Walks the boundary table of a populated batch and writes one averaged
//! vector per sentence into its target row. Touches only numeric buffers, so
//! it can run off the thread that populated the batch.
//!
//! Accumulation order is word order within a sentence and sentence order
//! within the batch. Results are bit-identical for identical inputs.

use crate::batch::{BatchArrays, BatchCounts, OOV_WORD};
use crate::blas::{saxpy, sscal};
use crate::model::{AverageModel, AverageStrategy, MatrixView};

/// Write sentence averages for a populated batch into `output`.
///
/// `output` is row-major with `model.dim()` columns and must cover every
/// target row in the batch. Sentences with an empty word range leave their
/// row untouched. `scratch` must hold `model.dim()` values; it is zero on
/// return.
///
/// Out-of-vocabulary handling follows the populator that filled `batch`, not
/// the model. A subword batch read with a plain model drops its n-gram slots
/// from the sum; they still count toward the sentence length.
///
/// # Panics
/// Panics if a word, bucket or target index is outside its matrix.
pub fn compute_averages(
    model: &AverageModel<'_>,
    batch: &BatchArrays,
    counts: &BatchCounts,
    output: &mut [f32],
    scratch: &mut [f32],
) {
    let dim = model.dim();
    let vectors = model.vectors();
    let weights = model.weights();
    let ngram_vectors = match batch.strategy() {
        AverageStrategy::PlainVocabulary => None,
        AverageStrategy::SubwordFallback => model.subword().map(|s| s.ngram_vectors()),
    };

    scratch.fill(0.0);

    for sentence in 0..counts.sentences {
        let start = batch.sentence_boundary[sentence];
        let end = batch.sentence_boundary[sentence + 1];
        if start == end {
            continue;
        }

        let row = batch.target_rows[start] * dim;
        let sentence_vector = &mut output[row..row + dim];

        for slot in start..end {
            let word = batch.word_indices[slot];
            if word != OOV_WORD {
                saxpy(weights[word], vectors.row(word), sentence_vector);
                continue;
            }
            match ngram_vectors {
                Some(ngrams) if batch.subword_count[slot] > 0 => {
                    add_ngram_average(ngrams, batch.subword_hashes(slot), sentence_vector, scratch);
                }
                // no n-grams, or no table to read them from
                _ => {}
            }
        }

        sscal(1.0 / (end - start) as f32, sentence_vector);
    }
}

/// Add the unweighted mean of the given n-gram rows to `target`.
fn add_ngram_average(
    ngrams: MatrixView<'_>,
    hashes: &[u32],
    target: &mut [f32],
    scratch: &mut [f32],
) {
    for &hash in hashes {
        saxpy(1.0, ngrams.row(hash as usize), scratch);
    }
    saxpy(1.0 / hashes.len() as f32, scratch, target);
    scratch.fill(0.0);
}
