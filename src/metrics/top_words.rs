// Top words per topic with raw and percentage weights.

use serde::{Deserialize, Serialize};

/// Raw topic weights of the top words and their share of the top-N total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordScores {
    pub raw: Vec<f64>,
    /// `raw / sum(raw) * 100`, rounded to 2 decimals. Normalised over the
    /// top-N subset, not the whole topic distribution.
    pub percentages: Vec<f64>,
}

/// The headline words of one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// "Topic 1", "Topic 2", ...
    #[serde(rename = "Topic")]
    pub label: String,
    /// Top words joined with ", ".
    #[serde(rename = "Words")]
    pub words: String,
    #[serde(rename = "TopWords")]
    pub top_words: Vec<String>,
    #[serde(rename = "WordScores")]
    pub word_scores: WordScores,
}

/// Indices of the `n` largest weights, descending; ties keep index order.
pub fn top_indices(weights: &[f64], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..weights.len()).collect();
    // sort_by is stable, so equal weights stay in ascending index order
    indices.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    indices.truncate(n);
    indices
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Each weight's share of the total, in percent (2 decimals).
///
/// An all-zero input yields all-zero percentages.
pub fn percentages(raw: &[f64]) -> Vec<f64> {
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return vec![0.0; raw.len()];
    }
    raw.iter().map(|w| round2(w / total * 100.0)).collect()
}

/// Summarise one topic's word-weight row.
pub fn summarize_topic(
    topic_idx: usize,
    weights: &[f64],
    feature_names: &[String],
    num_words: usize,
) -> TopicSummary {
    let indices = top_indices(weights, num_words);
    let top_words: Vec<String> = indices.iter().map(|&i| feature_names[i].clone()).collect();
    let raw: Vec<f64> = indices.iter().map(|&i| weights[i]).collect();

    TopicSummary {
        label: format!("Topic {}", topic_idx + 1),
        words: top_words.join(", "),
        top_words,
        word_scores: WordScores {
            percentages: percentages(&raw),
            raw,
        },
    }
}

/// Summarise every topic of a `components` matrix.
pub fn summarize_topics(
    components: &[Vec<f64>],
    feature_names: &[String],
    num_words: usize,
) -> Vec<TopicSummary> {
    components
        .iter()
        .enumerate()
        .map(|(k, row)| summarize_topic(k, row, feature_names, num_words))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_break_by_index() {
        let weights = [1.0, 3.0, 3.0, 0.5, 3.0];
        assert_eq!(top_indices(&weights, 3), vec![1, 2, 4]);
    }

    #[test]
    fn test_summary_fields() {
        let names: Vec<String> = ["cell", "gene", "protein"].iter().map(|s| s.to_string()).collect();
        let summary = summarize_topic(0, &[1.0, 3.0, 2.0], &names, 2);
        assert_eq!(summary.label, "Topic 1");
        assert_eq!(summary.words, "gene, protein");
        assert_eq!(summary.word_scores.raw, vec![3.0, 2.0]);
        assert_eq!(summary.word_scores.percentages, vec![60.0, 40.0]);
    }

    #[test]
    fn test_n_larger_than_vocabulary() {
        assert_eq!(top_indices(&[0.2, 0.1], 10), vec![0, 1]);
    }

    #[test]
    fn test_zero_weights_give_zero_percentages() {
        assert_eq!(percentages(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
