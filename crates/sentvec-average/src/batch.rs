//! Batch population.
//!
//! Linearizes a batch of sentences into fixed-capacity flat arrays: one slot
//! per retained word, plus a boundary table delimiting each sentence's slots.
//! Capacity overflow is a silent truncation, never an error.

use sentvec_types::{IndexedSentence, Vocabulary};

use crate::model::AverageStrategy;
use crate::ngrams::NgramHasher;

/// Maximum word occurrences placed per call.
pub const MAX_WORDS: usize = 10_000;

/// Maximum n-gram hashes kept per out-of-vocabulary token.
pub const MAX_NGRAMS: usize = 40;

/// Word index recorded for out-of-vocabulary slots.
pub const OOV_WORD: usize = usize::MAX;

/// Effective counts of a populated batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounts {
    /// Sentences with a boundary entry
    pub sentences: usize,
    /// Word slots filled, at most `MAX_WORDS`
    pub words: usize,
    /// Set when the `MAX_WORDS` cutoff dropped input: a sentence with a word
    /// past the cutoff, or any non-empty sentence after a batch that filled
    /// exactly. Trailing sentences count even if all their tokens would have
    /// been dropped as out of vocabulary. Informational only.
    pub truncated: bool,
}

impl From<BatchCounts> for (usize, usize) {
    fn from(counts: BatchCounts) -> Self {
        (counts.sentences, counts.words)
    }
}

/// Pre-sized flat arrays reused across calls.
///
/// Only the first `BatchCounts::words` slots and `BatchCounts::sentences + 1`
/// boundary entries of a populated batch are meaningful. The arrays remember
/// which populator filled them last, so one arena can alternate strategies.
#[derive(Debug, Clone)]
pub struct BatchArrays {
    pub(crate) strategy: AverageStrategy,
    pub(crate) word_indices: Box<[usize]>,
    pub(crate) target_rows: Box<[usize]>,
    pub(crate) sentence_boundary: Box<[usize]>,
    pub(crate) subword_hashes: Box<[u32]>,
    pub(crate) subword_count: Box<[usize]>,
    /// Hasher output for the token being populated
    ngram_buf: Vec<u32>,
}

impl BatchArrays {
    pub fn new() -> Self {
        Self {
            strategy: AverageStrategy::PlainVocabulary,
            word_indices: vec![0; MAX_WORDS].into_boxed_slice(),
            target_rows: vec![0; MAX_WORDS].into_boxed_slice(),
            sentence_boundary: vec![0; MAX_WORDS + 1].into_boxed_slice(),
            subword_hashes: vec![0; MAX_WORDS * MAX_NGRAMS].into_boxed_slice(),
            subword_count: vec![0; MAX_WORDS].into_boxed_slice(),
            ngram_buf: Vec::new(),
        }
    }

    /// Strategy of the populator that last filled these arrays.
    pub fn strategy(&self) -> AverageStrategy {
        self.strategy
    }

    pub fn word_indices(&self) -> &[usize] {
        &self.word_indices
    }

    pub fn target_rows(&self) -> &[usize] {
        &self.target_rows
    }

    pub fn sentence_boundary(&self) -> &[usize] {
        &self.sentence_boundary
    }

    pub fn subword_count(&self) -> &[usize] {
        &self.subword_count
    }

    /// Kept n-gram bucket indices of word slot `slot`.
    pub fn subword_hashes(&self, slot: usize) -> &[u32] {
        let start = slot * MAX_NGRAMS;
        &self.subword_hashes[start..start + self.subword_count[slot]]
    }
}

impl Default for BatchArrays {
    fn default() -> Self {
        Self::new()
    }
}

/// Populate with in-vocabulary tokens only.
///
/// Out-of-vocabulary tokens are dropped. Empty sentences take no boundary
/// entry. A sentence left with zero words after dropping still takes one,
/// with an empty range. Filled slots carry no n-grams.
pub fn populate_plain(
    vocab: &dyn Vocabulary,
    sentences: &[IndexedSentence],
    batch: &mut BatchArrays,
) -> BatchCounts {
    let mut counts = BatchCounts::default();
    batch.strategy = AverageStrategy::PlainVocabulary;
    batch.sentence_boundary[0] = 0;

    'sentences: for (position, sentence) in sentences.iter().enumerate() {
        if sentence.is_empty() {
            continue;
        }
        for token in &sentence.words {
            let Some(index) = vocab.index_of(token) else {
                continue;
            };
            if counts.words == MAX_WORDS {
                counts.truncated = true;
                break 'sentences;
            }
            batch.word_indices[counts.words] = index;
            batch.target_rows[counts.words] = sentence.index;
            batch.subword_count[counts.words] = 0;
            counts.words += 1;
        }
        counts.sentences += 1;
        batch.sentence_boundary[counts.sentences] = counts.words;
        if counts.words == MAX_WORDS {
            counts.truncated = sentences[position + 1..].iter().any(|s| !s.is_empty());
            break;
        }
    }

    counts
}

/// Populate with every token, hashing out-of-vocabulary ones into n-grams.
///
/// At most `MAX_NGRAMS` hashes are kept per token, in generation order.
pub fn populate_subword(
    vocab: &dyn Vocabulary,
    hasher: &dyn NgramHasher,
    sentences: &[IndexedSentence],
    batch: &mut BatchArrays,
) -> BatchCounts {
    let mut counts = BatchCounts::default();
    batch.strategy = AverageStrategy::SubwordFallback;
    batch.sentence_boundary[0] = 0;

    'sentences: for (position, sentence) in sentences.iter().enumerate() {
        if sentence.is_empty() {
            continue;
        }
        for token in &sentence.words {
            if counts.words == MAX_WORDS {
                counts.truncated = true;
                break 'sentences;
            }
            let slot = counts.words;
            batch.target_rows[slot] = sentence.index;
            match vocab.index_of(token) {
                Some(index) => {
                    batch.word_indices[slot] = index;
                    batch.subword_count[slot] = 0;
                }
                None => {
                    batch.ngram_buf.clear();
                    hasher.bucket_indices(token, &mut batch.ngram_buf);
                    let kept = batch.ngram_buf.len().min(MAX_NGRAMS);
                    let start = slot * MAX_NGRAMS;
                    batch.subword_hashes[start..start + kept]
                        .copy_from_slice(&batch.ngram_buf[..kept]);
                    batch.word_indices[slot] = OOV_WORD;
                    batch.subword_count[slot] = kept;
                }
            }
            counts.words += 1;
        }
        counts.sentences += 1;
        batch.sentence_boundary[counts.sentences] = counts.words;
        if counts.words == MAX_WORDS {
            counts.truncated = sentences[position + 1..].iter().any(|s| !s.is_empty());
            break;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngrams::{compute_ngrams, FastTextHasher};
    use sentvec_types::Vocab;

    /// Yields `n` sequential bucket indices for every token.
    struct FixedHasher(u32);

    impl NgramHasher for FixedHasher {
        fn bucket_indices(&self, _token: &str, out: &mut Vec<u32>) {
            out.extend(0..self.0);
        }
    }

    fn vocab() -> Vocab {
        Vocab::from_tokens(["cat", "sat", "mat"])
    }

    #[test]
    fn test_plain_drops_oov_tokens() {
        let sentences = vec![IndexedSentence::new(["cat", "dog", "sat"], 4)];
        let mut batch = BatchArrays::new();
        let counts = populate_plain(&vocab(), &sentences, &mut batch);

        assert_eq!(counts.sentences, 1);
        assert_eq!(counts.words, 2);
        assert!(!counts.truncated);
        assert_eq!(&batch.word_indices()[..2], &[0, 1]);
        assert_eq!(&batch.target_rows()[..2], &[4, 4]);
        assert_eq!(&batch.sentence_boundary()[..2], &[0, 2]);
    }

    #[test]
    fn test_plain_skips_empty_sentences() {
        let sentences = vec![
            IndexedSentence::new(Vec::<String>::new(), 0),
            IndexedSentence::new(["mat"], 1),
            IndexedSentence::new(Vec::<String>::new(), 2),
        ];
        let mut batch = BatchArrays::new();
        let counts = populate_plain(&vocab(), &sentences, &mut batch);

        assert_eq!(counts.sentences, 1);
        assert_eq!(counts.words, 1);
        assert_eq!(batch.target_rows()[0], 1);
    }

    #[test]
    fn test_plain_all_oov_sentence_gets_empty_range() {
        let sentences = vec![
            IndexedSentence::new(["dog", "fish"], 0),
            IndexedSentence::new(["cat"], 1),
        ];
        let mut batch = BatchArrays::new();
        let counts = populate_plain(&vocab(), &sentences, &mut batch);

        assert_eq!(counts.sentences, 2);
        assert_eq!(counts.words, 1);
        assert_eq!(&batch.sentence_boundary()[..3], &[0, 0, 1]);
    }

    #[test]
    fn test_plain_truncates_partial_sentence() {
        let sentences = vec![
            IndexedSentence::new(vec!["cat"; MAX_WORDS - 1], 0),
            IndexedSentence::new(["sat", "mat"], 1),
            IndexedSentence::new(["cat"], 2),
        ];
        let mut batch = BatchArrays::new();
        let counts = populate_plain(&vocab(), &sentences, &mut batch);

        assert_eq!(counts.words, MAX_WORDS);
        assert_eq!(counts.sentences, 1);
        assert!(counts.truncated);
    }

    #[test]
    fn test_plain_sentence_ending_at_cutoff_is_kept() {
        let sentences = vec![
            IndexedSentence::new(vec!["cat"; MAX_WORDS - 1], 0),
            IndexedSentence::new(["sat", "dog"], 1),
            IndexedSentence::new(["cat"], 2),
        ];
        let mut batch = BatchArrays::new();
        let counts = populate_plain(&vocab(), &sentences, &mut batch);

        assert_eq!(counts.words, MAX_WORDS);
        assert_eq!(counts.sentences, 2);
        assert_eq!(batch.sentence_boundary()[2], MAX_WORDS);
        assert!(counts.truncated);
    }

    #[test]
    fn test_plain_exact_fit_is_not_truncated() {
        let sentences = vec![IndexedSentence::new(vec!["cat"; MAX_WORDS], 0)];
        let mut batch = BatchArrays::new();
        let counts = populate_plain(&vocab(), &sentences, &mut batch);

        assert_eq!(counts.words, MAX_WORDS);
        assert_eq!(counts.sentences, 1);
        assert!(!counts.truncated);
    }

    #[test]
    fn test_subword_keeps_every_token() {
        let hasher = FastTextHasher::new(3, 3, 1000);
        let sentences = vec![IndexedSentence::new(["cat", "ab"], 0)];
        let mut batch = BatchArrays::new();
        let counts = populate_subword(&vocab(), &hasher, &sentences, &mut batch);

        assert_eq!(counts.words, 2);
        assert_eq!(batch.word_indices()[0], 0);
        assert_eq!(batch.subword_count()[0], 0);
        assert_eq!(batch.word_indices()[1], OOV_WORD);
        assert_eq!(batch.subword_count()[1], compute_ngrams("ab", 3, 3).len());
        assert_eq!(
            batch.subword_hashes(1),
            &[
                crate::ngrams::ft_hash(b"<ab") % 1000,
                crate::ngrams::ft_hash(b"ab>") % 1000
            ]
        );
    }

    #[test]
    fn test_subword_caps_ngrams() {
        let sentences = vec![IndexedSentence::new(["unknown"], 0)];
        let mut batch = BatchArrays::new();
        let counts = populate_subword(&vocab(), &FixedHasher(55), &sentences, &mut batch);

        assert_eq!(counts.words, 1);
        assert_eq!(batch.subword_count()[0], MAX_NGRAMS);
        let expected: Vec<u32> = (0..MAX_NGRAMS as u32).collect();
        assert_eq!(batch.subword_hashes(0), expected.as_slice());
    }

    #[test]
    fn test_subword_truncates_on_any_token() {
        let sentences = vec![
            IndexedSentence::new(vec!["cat"; MAX_WORDS], 0),
            IndexedSentence::new(["zzz"], 1),
        ];
        let mut batch = BatchArrays::new();
        let counts = populate_subword(&vocab(), &FixedHasher(1), &sentences, &mut batch);

        assert_eq!(counts.words, MAX_WORDS);
        assert_eq!(counts.sentences, 1);
        assert!(counts.truncated);
    }

    #[test]
    fn test_subword_excludes_sentence_straddling_cutoff() {
        let sentences = vec![
            IndexedSentence::new(vec!["cat"; MAX_WORDS - 1], 0),
            IndexedSentence::new(["sat", "zzz"], 1),
        ];
        let mut batch = BatchArrays::new();
        let counts = populate_subword(&vocab(), &FixedHasher(1), &sentences, &mut batch);

        assert_eq!(counts.words, MAX_WORDS);
        assert_eq!(counts.sentences, 1);
        assert_eq!(batch.sentence_boundary()[1], MAX_WORDS - 1);
        assert!(counts.truncated);
    }

    #[test]
    fn test_truncated_set_for_trailing_oov_sentence() {
        let sentences = vec![
            IndexedSentence::new(vec!["cat"; MAX_WORDS], 0),
            IndexedSentence::new(["dog"], 1),
        ];
        let mut batch = BatchArrays::new();
        let counts = populate_plain(&vocab(), &sentences, &mut batch);

        assert_eq!(counts.sentences, 1);
        assert!(counts.truncated);
    }

    #[test]
    fn test_plain_after_subword_clears_ngram_counts() {
        let mut batch = BatchArrays::new();
        let oov = vec![IndexedSentence::new(["zz"], 0)];
        populate_subword(&vocab(), &FixedHasher(3), &oov, &mut batch);
        assert_eq!(batch.strategy(), AverageStrategy::SubwordFallback);
        assert_eq!(batch.subword_count()[0], 3);

        let known = vec![IndexedSentence::new(["cat"], 0)];
        populate_plain(&vocab(), &known, &mut batch);
        assert_eq!(batch.strategy(), AverageStrategy::PlainVocabulary);
        assert_eq!(batch.word_indices()[0], 0);
        assert_eq!(batch.subword_count()[0], 0);
    }

    #[test]
    fn test_counts_into_tuple() {
        let counts = BatchCounts {
            sentences: 3,
            words: 7,
            truncated: false,
        };
        let tuple: (usize, usize) = counts.into();
        assert_eq!(tuple, (3, 7));
    }
}
