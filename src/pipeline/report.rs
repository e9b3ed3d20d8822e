// The result record of a successful analysis.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::documents::CleaningPolicy;
use crate::metrics::{DecadeDistribution, TopPaperEntry, TopicSummary};
use crate::topics::vocabulary::VectorizerReport;

/// Everything an analysis run produces. Field names follow the JSON the web
/// endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub topics: Vec<TopicSummary>,
    pub num_words: usize,
    /// Documents that made it into the corpus.
    pub num_pdfs: usize,
    pub num_topics: usize,
    /// "min-max" of known publication years, or "N/A".
    pub time_period: String,
    /// Negated model score.
    pub model_loss: f64,
    pub perplexity: f64,
    pub average_lift_per_topic: Vec<f64>,
    /// Keyed by zero-based topic index.
    pub top_papers: BTreeMap<usize, Vec<TopPaperEntry>>,
    pub num_top_papers: usize,
    /// Present only when decade analysis was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decade_distribution: Option<DecadeDistribution>,
    pub additional_stopwords: Vec<String>,
    pub vectorizer_params: VectorizerReport,
    pub cleaning: CleaningPolicy,
    /// PDFs that yielded no usable text.
    pub skipped_documents: usize,
    pub cache_id: i64,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn summary_text(&self) -> String {
        summary_text(self.num_topics, self.num_words)
    }
}

/// One-line description of an analysis configuration.
pub fn summary_text(num_topics: usize, num_words: usize) -> String {
    format!("Analysis performed with {num_topics} topics and {num_words} words per topic.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_text() {
        assert_eq!(
            summary_text(5, 10),
            "Analysis performed with 5 topics and 10 words per topic."
        );
    }
}
