// Topic model traits: the swap-ready abstraction.
//
// The pipeline and the metrics only ever see these two traits, so the
// inference algorithm behind them can be replaced (Gibbs sampling, NMF, ...)
// without touching anything downstream. The default implementation is the
// variational Bayes LDA in `lda.rs`.

use super::vocabulary::DocumentTermMatrix;
use crate::error::AnalysisError;

/// A fitted topic model. Immutable once fitted.
pub trait TopicModel: Send + Sync {
    /// Number of topics (rows of `components`).
    fn num_topics(&self) -> usize;

    /// Unnormalised, non-negative word weights: one row per topic, one
    /// column per vocabulary feature.
    fn components(&self) -> &[Vec<f64>];

    /// Topic proportions for each document row of `matrix` (documents x topics).
    fn transform(&self, matrix: &DocumentTermMatrix) -> Vec<Vec<f64>>;

    /// Log-likelihood (or its variational lower bound) of `matrix`.
    fn score(&self, matrix: &DocumentTermMatrix) -> f64;

    /// Perplexity of `matrix` under the model. Lower is better.
    fn perplexity(&self, matrix: &DocumentTermMatrix) -> f64;
}

/// Fits a topic model with a fixed topic count.
///
/// Implementations must be deterministic: the same matrix and topic count
/// always produce the same model.
pub trait TopicModelTrainer: Send + Sync {
    fn fit(
        &self,
        matrix: &DocumentTermMatrix,
        num_topics: usize,
    ) -> Result<Box<dyn TopicModel>, AnalysisError>;
}
