//! TF-IDF vectorization of short texts (book titles).
//!
//! - Lowercase, tokens are runs of two or more word characters
//! - Stop words removed ([`ENGLISH_STOP_WORDS`] by default)
//! - Vocabulary sorted alphabetically, so term indices are reproducible
//! - Weight = raw term count x smoothed idf, `ln((1 + N) / (1 + df)) + 1`
//! - Every document vector is L2-normalized, which makes cosine
//!   similarity a plain dot product

use crate::stop_words::ENGLISH_STOP_WORDS;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Sparse, L2-normalized document vector as `(term, weight)` ascending by term
pub type SparseVector = Vec<(usize, f32)>;

/// Tokenizer + weighting settings
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    stop_words: HashSet<String>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::english()
    }
}

impl TfidfVectorizer {
    /// Vectorizer that drops English stop words
    pub fn english() -> Self {
        Self::with_stop_words(ENGLISH_STOP_WORDS.iter().copied())
    }

    /// Vectorizer with a custom stop-word list (case-insensitive)
    pub fn with_stop_words<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Split text into lowercase terms, dropping stop words and 1-char tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= 2)
            .filter(|token| !self.is_stop_word(token))
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary and idf weights of `documents` and vectorize them
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> TfidfMatrix {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| self.tokenize(doc.as_ref()))
            .collect();

        let vocabulary: Vec<String> = tokenized
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        // Document frequency per term
        let mut df = vec![0u32; vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<&String> = tokens.iter().collect();
            for token in unique {
                if let Ok(idx) = vocabulary.binary_search(token) {
                    df[idx] += 1;
                }
            }
        }

        let n_docs = documents.len() as f32;
        let idf: Vec<f32> = df
            .iter()
            .map(|&d| ((1.0 + n_docs) / (1.0 + d as f32)).ln() + 1.0)
            .collect();

        let vectors = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
                for token in tokens {
                    if let Ok(idx) = vocabulary.binary_search(token) {
                        *counts.entry(idx).or_insert(0.0) += 1.0;
                    }
                }
                let mut vector: SparseVector = counts
                    .into_iter()
                    .map(|(idx, tf)| (idx, tf * idf[idx]))
                    .collect();
                normalize(&mut vector);
                vector
            })
            .collect();

        TfidfMatrix {
            vocabulary,
            idf,
            vectors,
        }
    }
}

fn normalize(vector: &mut SparseVector) {
    let norm = vector.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in vector.iter_mut() {
            *w /= norm;
        }
    }
}

/// Cosine similarity of two L2-normalized sparse vectors
pub fn cosine_similarity(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// Output of [`TfidfVectorizer::fit_transform`]: one vector per document
#[derive(Debug, Clone, Default)]
pub struct TfidfMatrix {
    vocabulary: Vec<String>,
    idf: Vec<f32>,
    vectors: Vec<SparseVector>,
}

impl TfidfMatrix {
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Dimensionality of every vector
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|idx| self.idf[idx])
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
