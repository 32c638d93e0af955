//! Character n-gram generation and bucket hashing.
//!
//! Byte-compatible with fastText: n-grams are drawn from the token wrapped in
//! `<` and `>`, aligned to UTF-8 character boundaries, and hashed with a
//! 32-bit FNV-1a variant that sign-extends each byte.

use sentvec_types::SubwordSettings;

/// Maps a token to the bucket indices of its character n-grams.
///
/// Implementations must be pure and thread-safe (Send + Sync).
pub trait NgramHasher: Send + Sync {
    /// Append bucket indices for `token` to `out` in generation order.
    fn bucket_indices(&self, token: &str, out: &mut Vec<u32>);
}

/// fastText-compatible n-gram hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastTextHasher {
    pub min_n: usize,
    pub max_n: usize,
    pub bucket: u32,
}

impl FastTextHasher {
    pub fn new(min_n: usize, max_n: usize, bucket: u32) -> Self {
        Self {
            min_n,
            max_n,
            bucket,
        }
    }

    /// Build from validated settings.
    pub fn from_settings(settings: &SubwordSettings) -> Self {
        Self::new(settings.min_n, settings.max_n, settings.bucket as u32)
    }
}

impl NgramHasher for FastTextHasher {
    fn bucket_indices(&self, token: &str, out: &mut Vec<u32>) {
        for_each_ngram(token, self.min_n, self.max_n, |ngram| {
            out.push(ft_hash(ngram) % self.bucket);
        });
    }
}

/// All character n-grams of `<token>` with lengths in `min_n..=max_n`.
///
/// N-grams are ordered by start character, then by increasing length.
pub fn compute_ngrams(token: &str, min_n: usize, max_n: usize) -> Vec<Vec<u8>> {
    let mut ngrams = Vec::new();
    for_each_ngram(token, min_n, max_n, |ngram| ngrams.push(ngram.to_vec()));
    ngrams
}

fn for_each_ngram<F>(token: &str, min_n: usize, max_n: usize, mut emit: F)
where
    F: FnMut(&[u8]),
{
    let mut wrapped = String::with_capacity(token.len() + 2);
    wrapped.push('<');
    wrapped.push_str(token);
    wrapped.push('>');
    let bytes = wrapped.as_bytes();
    let num_bytes = bytes.len();

    for start in 0..num_bytes {
        if is_continuation(bytes[start]) {
            continue;
        }
        let mut end = start;
        let mut n = 1;
        while end < num_bytes && n <= max_n {
            end += 1;
            while end < num_bytes && is_continuation(bytes[end]) {
                end += 1;
            }
            // A lone bracket is not an n-gram
            let bracket_only = n == 1 && (start == 0 || end == num_bytes);
            if n >= min_n && !bracket_only {
                emit(&bytes[start..end]);
            }
            n += 1;
        }
    }
}

#[inline]
fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// fastText n-gram hash: FNV-1a over sign-extended bytes.
pub fn ft_hash(bytes: &[u8]) -> u32 {
    let mut h: u32 = 2_166_136_261;
    for &b in bytes {
        h ^= b as i8 as i32 as u32;
        h = h.wrapping_mul(16_777_619);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(ngrams: Vec<Vec<u8>>) -> Vec<String> {
        ngrams
            .into_iter()
            .map(|n| String::from_utf8(n).unwrap())
            .collect()
    }

    #[test]
    fn test_ngrams_ascii() {
        let ngrams = as_strings(compute_ngrams("ab", 3, 3));
        assert_eq!(ngrams, vec!["<ab", "ab>"]);
    }

    #[test]
    fn test_ngrams_order_by_start_then_length() {
        let ngrams = as_strings(compute_ngrams("abc", 3, 4));
        assert_eq!(ngrams, vec!["<ab", "<abc", "abc", "abc>", "bc>"]);
    }

    #[test]
    fn test_ngrams_skip_lone_brackets() {
        let ngrams = as_strings(compute_ngrams("ab", 1, 1));
        assert_eq!(ngrams, vec!["a", "b"]);
    }

    #[test]
    fn test_ngrams_respect_char_boundaries() {
        let ngrams = as_strings(compute_ngrams("é", 1, 2));
        assert_eq!(ngrams, vec!["<é", "é", "é>"]);
    }

    #[test]
    fn test_ngrams_token_shorter_than_min_n() {
        assert!(compute_ngrams("a", 4, 6).is_empty());
    }

    #[test]
    fn test_ft_hash_ascii_matches_fnv1a() {
        assert_eq!(ft_hash(b"test"), 2_949_673_445);
    }

    #[test]
    fn test_ft_hash_sign_extends_high_bytes() {
        assert_eq!(ft_hash(&[0x80]), 83_079_839);
    }

    #[test]
    fn test_hasher_bounds_indices() {
        let hasher = FastTextHasher::new(3, 6, 17);
        let mut out = Vec::new();
        hasher.bucket_indices("averaging", &mut out);
        assert_eq!(out.len(), compute_ngrams("averaging", 3, 6).len());
        assert!(out.iter().all(|&h| h < 17));
    }

    #[test]
    fn test_hasher_appends() {
        let hasher = FastTextHasher::new(3, 3, 1000);
        let mut out = vec![u32::MAX];
        hasher.bucket_indices("ab", &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], u32::MAX);
        assert_eq!(out[1], ft_hash(b"<ab") % 1000);
    }
}
