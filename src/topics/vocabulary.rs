// Vocabulary construction and TF-IDF document-term matrix.
//
// Tokens are maximal runs of word characters (letters, digits, underscore)
// of length two or more, lowercased. Stop words (English list plus any
// caller-supplied extras) are dropped before counting. Terms are pruned by
// document frequency, weighted by smoothed IDF and each row L2-normalised.
// Feature columns are in alphabetical order.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{info, warn};

use crate::documents::cleaner::english_stopwords;
use crate::error::AnalysisError;

/// One sparse document row: `(feature index, weight)` pairs sorted by index.
pub type SparseRow = Vec<(usize, f64)>;

/// Non-negative (documents x features) matrix stored row-sparse.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTermMatrix {
    n_features: usize,
    rows: Vec<SparseRow>,
}

impl DocumentTermMatrix {
    /// Build from sparse rows. Entries must reference columns below `n_features`.
    pub fn new(n_features: usize, rows: Vec<SparseRow>) -> Self {
        debug_assert!(rows
            .iter()
            .all(|row| row.iter().all(|&(col, w)| col < n_features && w >= 0.0)));
        Self { n_features, rows }
    }

    /// Build from a dense matrix, dropping zero entries.
    pub fn from_dense(dense: &[Vec<f64>]) -> Self {
        let n_features = dense.first().map_or(0, |r| r.len());
        let rows = dense
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, &w)| w != 0.0)
                    .map(|(col, &w)| (col, w))
                    .collect()
            })
            .collect();
        Self::new(n_features, rows)
    }

    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    /// Sum of every entry in the matrix.
    pub fn total_weight(&self) -> f64 {
        self.rows.iter().flatten().map(|&(_, w)| w).sum()
    }

    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| {
                let mut dense = vec![0.0; self.n_features];
                for &(col, w) in row {
                    dense[col] = w;
                }
                dense
            })
            .collect()
    }
}

/// Ordered feature names and their column indices.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    feature_names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn from_sorted(feature_names: Vec<String>) -> Self {
        let index = feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            feature_names,
            index,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn column(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }
}

/// Vectorizer settings echoed back in the analysis report.
#[derive(Debug, Clone, Serialize)]
pub struct VectorizerReport {
    pub max_df: f64,
    pub min_df: usize,
    pub stopwords_count: usize,
}

/// Turns cleaned texts into a TF-IDF document-term matrix.
pub struct VocabularyBuilder {
    stop_words: HashSet<String>,
    /// Maximum fraction of documents a term may appear in.
    max_df: f64,
    /// Minimum number of documents a term must appear in.
    min_df: usize,
}

impl VocabularyBuilder {
    /// Merge the English stop words with `extra_stopwords` (trimmed,
    /// lowercased, deduplicated, blanks ignored).
    pub fn new(extra_stopwords: &[String], max_df: f64, min_df: usize) -> Self {
        let mut stop_words = english_stopwords().clone();
        stop_words.extend(
            extra_stopwords
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        Self {
            stop_words,
            max_df,
            min_df,
        }
    }

    pub fn stopwords_count(&self) -> usize {
        self.stop_words.len()
    }

    pub fn report(&self) -> VectorizerReport {
        VectorizerReport {
            max_df: self.max_df,
            min_df: self.min_df,
            stopwords_count: self.stop_words.len(),
        }
    }

    /// Build the vocabulary and the document-term matrix for `texts`.
    ///
    /// Row `i` of the matrix corresponds to `texts[i]`.
    pub fn build(&self, texts: &[&str]) -> Result<(Vocabulary, DocumentTermMatrix), AnalysisError> {
        if texts.is_empty() {
            return Err(AnalysisError::NoValidText);
        }

        let n_docs = texts.len();
        // With bounds this tight (e.g. one document at max_df < 1) no term can
        // survive pruning, which ends in `EmptyVocabulary` below.
        let max_doc_count = self.max_df * n_docs as f64;
        if max_doc_count < self.min_df as f64 {
            warn!(
                documents = n_docs,
                max_df = self.max_df,
                min_df = self.min_df,
                "Document-frequency bounds admit no term for this corpus"
            );
        }

        let term_counts: Vec<HashMap<String, usize>> = texts
            .iter()
            .map(|text| {
                let mut counts = HashMap::new();
                for token in tokenize(text).filter(|t| !self.stop_words.contains(t)) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let kept: Vec<(&str, usize)> = document_frequency
            .into_iter()
            .filter(|&(_, df)| df as f64 <= max_doc_count && df >= self.min_df)
            .collect();

        if kept.is_empty() {
            return Err(AnalysisError::EmptyVocabulary);
        }

        let idf: Vec<f64> = kept
            .iter()
            .map(|&(_, df)| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        let vocabulary =
            Vocabulary::from_sorted(kept.iter().map(|&(term, _)| term.to_string()).collect());

        let rows = term_counts
            .iter()
            .map(|counts| {
                let mut row: SparseRow = counts
                    .iter()
                    .filter_map(|(term, &count)| {
                        vocabulary
                            .column(term)
                            .map(|col| (col, count as f64 * idf[col]))
                    })
                    .collect();
                row.sort_by_key(|&(col, _)| col);
                l2_normalize(&mut row);
                row
            })
            .collect();

        info!(
            documents = n_docs,
            features = vocabulary.len(),
            stopwords = self.stop_words.len(),
            "Built document-term matrix"
        );

        let n_features = vocabulary.len();
        Ok((vocabulary, DocumentTermMatrix::new(n_features, rows)))
    }
}

/// Lowercased word tokens of at least two characters.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(|token| token.to_lowercase())
}

fn l2_normalize(row: &mut SparseRow) {
    let norm = row.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() {
            *w /= norm;
        }
    }
}
