// Representative documents per topic.
//
// Documents are ranked by their proportion for the topic. Each carries the raw
// proportion plus a "loading factor": the proportion rescaled between the
// topic's 10th and 90th percentile and clipped to [0, 1].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::documents::metadata::DocumentMetadata;

use super::top_words::top_indices;

/// One ranked document under a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPaperEntry {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub loading_factor: f64,
    /// Filled in after ranking by the identifier lookup, if enabled.
    pub pubmed_id: Option<String>,
    pub raw_score: f64,
    /// Position of the document in the corpus.
    #[serde(skip)]
    pub document_index: usize,
}

/// Percentile with linear interpolation between closest ranks (the numpy
/// default). `q` is in [0, 100]. Empty input yields 0.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Loading factor of every score in one topic's column.
///
/// When the 10th and 90th percentiles coincide the spread is degenerate and
/// every document gets 0.
pub fn loading_factors(scores: &[f64]) -> Vec<f64> {
    let p10 = percentile(scores, 10.0);
    let p90 = percentile(scores, 90.0);
    let spread = p90 - p10;
    if spread <= 0.0 || !spread.is_finite() {
        return vec![0.0; scores.len()];
    }
    scores
        .iter()
        .map(|s| ((s - p10) / spread).clamp(0.0, 1.0))
        .collect()
}

/// The `n` highest-scoring documents of one topic column.
pub fn rank_documents(
    scores: &[f64],
    metadata: &[&DocumentMetadata],
    n: usize,
) -> Vec<TopPaperEntry> {
    let loadings = loading_factors(scores);
    top_indices(scores, n)
        .into_iter()
        .map(|i| {
            let meta = metadata.get(i).copied();
            TopPaperEntry {
                title: meta.and_then(|m| m.title.clone()),
                year: meta.and_then(|m| m.year),
                author: meta.and_then(|m| m.author.clone()),
                loading_factor: loadings[i],
                pubmed_id: None,
                raw_score: scores[i],
                document_index: i,
            }
        })
        .collect()
}

/// Top papers for every topic of a document-topic matrix, keyed by topic
/// index.
pub fn top_papers(
    doc_topic: &[Vec<f64>],
    metadata: &[&DocumentMetadata],
    n: usize,
) -> BTreeMap<usize, Vec<TopPaperEntry>> {
    let num_topics = doc_topic.first().map_or(0, |row| row.len());
    (0..num_topics)
        .map(|topic| {
            let column: Vec<f64> = doc_topic.iter().map(|row| row[topic]).collect();
            (topic, rank_documents(&column, metadata, n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 10.0) - 1.4).abs() < 1e-12);
        assert!((percentile(&values, 90.0) - 4.6).abs() < 1e-12);
        assert_eq!(percentile(&values, 50.0), 3.0);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[0.7], 90.0), 0.7);
    }

    #[test]
    fn test_loading_factors_clip_to_unit_interval() {
        let scores = [0.0, 0.1, 0.5, 0.9, 1.0];
        let loadings = loading_factors(&scores);
        assert!(loadings.iter().all(|l| (0.0..=1.0).contains(l)));
        assert_eq!(loadings[0], 0.0);
        assert_eq!(loadings[4], 1.0);
    }

    #[test]
    fn test_degenerate_spread_is_zero() {
        assert_eq!(loading_factors(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(loading_factors(&[0.4, 0.4]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_top_papers_carry_metadata() {
        let known = DocumentMetadata::parse("Smith et al. - 2001 - Cell Biology.pdf");
        let unknown = DocumentMetadata::default();
        let metadata = vec![&known, &unknown];
        let doc_topic = vec![vec![0.9, 0.1], vec![0.2, 0.8]];

        let papers = top_papers(&doc_topic, &metadata, 1);
        assert_eq!(papers.len(), 2);

        let first = &papers[&0][0];
        assert_eq!(first.document_index, 0);
        assert_eq!(first.title.as_deref(), Some("Cell Biology"));
        assert_eq!(first.year, Some(2001));

        let second = &papers[&1][0];
        assert_eq!(second.document_index, 1);
        assert_eq!(second.title, None);
        assert_eq!(second.raw_score, 0.8);
    }
}
