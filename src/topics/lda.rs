// Latent Dirichlet Allocation fitted with batch variational Bayes.
//
// Works directly on real-valued (TF-IDF) matrices: each document's entries
// act as fractional word counts. Fitting alternates an E-step (per-document
// topic posteriors, Dirichlet `gamma`) with an M-step (topic-word posteriors,
// Dirichlet `lambda`, exposed as `components`). All randomness comes from a
// seeded `StdRng`, so a given matrix always yields the same model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::special::{dirichlet_expectation, ln_gamma, log_sum_exp};
use super::traits::{TopicModel, TopicModelTrainer};
use super::vocabulary::DocumentTermMatrix;
use crate::error::AnalysisError;

/// Guards against division by zero in the per-word normaliser.
const NORM_EPSILON: f64 = f64::EPSILON;

/// Configuration for fitting an [`LdaModel`].
#[derive(Debug, Clone)]
pub struct LdaTrainer {
    pub seed: u64,
    /// Number of EM passes over the whole corpus.
    pub max_iter: usize,
    /// Per-document E-step stops once the mean change of gamma drops below this.
    pub mean_change_tol: f64,
    pub max_doc_update_iter: usize,
    /// Dirichlet prior on document-topic proportions; `None` means 1/K.
    pub doc_topic_prior: Option<f64>,
    /// Dirichlet prior on topic-word weights; `None` means 1/K.
    pub topic_word_prior: Option<f64>,
}

impl Default for LdaTrainer {
    fn default() -> Self {
        Self {
            seed: 42,
            max_iter: 10,
            mean_change_tol: 1e-3,
            max_doc_update_iter: 100,
            doc_topic_prior: None,
            topic_word_prior: None,
        }
    }
}

impl LdaTrainer {
    pub fn new(seed: u64, max_iter: usize) -> Self {
        Self {
            seed,
            max_iter,
            ..Self::default()
        }
    }

    /// Fit and return the concrete model type.
    pub fn fit_lda(
        &self,
        matrix: &DocumentTermMatrix,
        num_topics: usize,
    ) -> Result<LdaModel, AnalysisError> {
        if num_topics == 0 {
            return Err(AnalysisError::ModelTrainingFailed);
        }
        if matrix.n_features() == 0 {
            return Err(AnalysisError::EmptyVocabulary);
        }

        let k = num_topics as f64;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let components: Vec<Vec<f64>> = (0..num_topics)
            .map(|_| (0..matrix.n_features()).map(|_| gamma_like(&mut rng)).collect())
            .collect();

        let mut model = LdaModel {
            exp_dirichlet_component: Vec::new(),
            components,
            doc_topic_prior: self.doc_topic_prior.unwrap_or(1.0 / k),
            topic_word_prior: self.topic_word_prior.unwrap_or(1.0 / k),
            mean_change_tol: self.mean_change_tol,
            max_doc_update_iter: self.max_doc_update_iter,
        };
        model.refresh_expectations();

        for iteration in 0..self.max_iter {
            let (_, suff_stats) = model.e_step(matrix, Some(&mut rng), true);
            let Some(suff_stats) = suff_stats else {
                break;
            };
            let eta = model.topic_word_prior;
            for (row, stats) in model.components.iter_mut().zip(&suff_stats) {
                for (weight, stat) in row.iter_mut().zip(stats) {
                    *weight = eta + stat;
                }
            }
            model.refresh_expectations();
            debug!(iteration = iteration + 1, of = self.max_iter, "LDA EM pass");
        }

        if model.components.is_empty() {
            return Err(AnalysisError::ModelTrainingFailed);
        }

        info!(
            topics = num_topics,
            documents = matrix.n_docs(),
            features = matrix.n_features(),
            "Trained LDA model"
        );
        Ok(model)
    }
}

impl TopicModelTrainer for LdaTrainer {
    fn fit(
        &self,
        matrix: &DocumentTermMatrix,
        num_topics: usize,
    ) -> Result<Box<dyn TopicModel>, AnalysisError> {
        Ok(Box::new(self.fit_lda(matrix, num_topics)?))
    }
}

/// A fitted LDA model.
#[derive(Debug, Clone)]
pub struct LdaModel {
    /// Variational topic-word parameters (lambda), K x V.
    components: Vec<Vec<f64>>,
    /// exp(E[log beta]) cached for the E-step.
    exp_dirichlet_component: Vec<Vec<f64>>,
    doc_topic_prior: f64,
    topic_word_prior: f64,
    mean_change_tol: f64,
    max_doc_update_iter: usize,
}

impl LdaModel {
    fn refresh_expectations(&mut self) {
        self.exp_dirichlet_component = self
            .components
            .iter()
            .map(|row| dirichlet_expectation(row).into_iter().map(f64::exp).collect())
            .collect();
    }

    /// Variational E-step over every document.
    ///
    /// Returns the unnormalised document-topic parameters (gamma) and, when
    /// requested, the sufficient statistics for the M-step.
    fn e_step(
        &self,
        matrix: &DocumentTermMatrix,
        mut rng: Option<&mut StdRng>,
        cal_sstats: bool,
    ) -> (Vec<Vec<f64>>, Option<Vec<Vec<f64>>>) {
        let n_topics = self.components.len();
        let alpha = self.doc_topic_prior;
        let mut suff_stats = cal_sstats.then(|| vec![vec![0.0; matrix.n_features()]; n_topics]);
        let mut doc_topic = Vec::with_capacity(matrix.n_docs());

        for row in matrix.rows() {
            let mut gamma: Vec<f64> = match rng.as_deref_mut() {
                Some(rng) => (0..n_topics).map(|_| gamma_like(rng)).collect(),
                None => vec![1.0; n_topics],
            };
            let mut exp_doc_topic = exp_dirichlet(&gamma);

            for _ in 0..self.max_doc_update_iter {
                let norm_phi = self.norm_phi(row, &exp_doc_topic);
                let last = gamma.clone();
                for (t, g) in gamma.iter_mut().enumerate() {
                    let weighted: f64 = row
                        .iter()
                        .zip(&norm_phi)
                        .map(|(&(col, cnt), &norm)| cnt / norm * self.exp_dirichlet_component[t][col])
                        .sum();
                    *g = exp_doc_topic[t] * weighted + alpha;
                }
                exp_doc_topic = exp_dirichlet(&gamma);

                let mean_change = last
                    .iter()
                    .zip(&gamma)
                    .map(|(a, b)| (a - b).abs())
                    .sum::<f64>()
                    / n_topics as f64;
                if mean_change < self.mean_change_tol {
                    break;
                }
            }

            if let Some(stats) = suff_stats.as_mut() {
                let norm_phi = self.norm_phi(row, &exp_doc_topic);
                for (t, stat_row) in stats.iter_mut().enumerate() {
                    for (&(col, cnt), &norm) in row.iter().zip(&norm_phi) {
                        stat_row[col] += exp_doc_topic[t] * cnt / norm;
                    }
                }
            }
            doc_topic.push(gamma);
        }

        if let Some(stats) = suff_stats.as_mut() {
            for (stat_row, exp_row) in stats.iter_mut().zip(&self.exp_dirichlet_component) {
                for (stat, e) in stat_row.iter_mut().zip(exp_row) {
                    *stat *= e;
                }
            }
        }

        (doc_topic, suff_stats)
    }

    /// Per-word normaliser: sum over topics of exp(E[log theta]) * exp(E[log beta]).
    fn norm_phi(&self, row: &[(usize, f64)], exp_doc_topic: &[f64]) -> Vec<f64> {
        row.iter()
            .map(|&(col, _)| {
                exp_doc_topic
                    .iter()
                    .zip(&self.exp_dirichlet_component)
                    .map(|(theta, beta)| theta * beta[col])
                    .sum::<f64>()
                    + NORM_EPSILON
            })
            .collect()
    }

    /// Variational lower bound on the log-likelihood of `matrix`.
    fn approx_bound(&self, matrix: &DocumentTermMatrix) -> f64 {
        let (gamma, _) = self.e_step(matrix, None, false);
        let n_topics = self.components.len();
        let n_features = matrix.n_features();

        let dirichlet_doc_topic: Vec<Vec<f64>> =
            gamma.iter().map(|g| dirichlet_expectation(g)).collect();
        let dirichlet_component: Vec<Vec<f64>> = self
            .components
            .iter()
            .map(|row| dirichlet_expectation(row))
            .collect();

        let mut score = 0.0;
        let mut scratch = vec![0.0; n_topics];
        for (row, doc_expect) in matrix.rows().iter().zip(&dirichlet_doc_topic) {
            for &(col, cnt) in row {
                for (t, slot) in scratch.iter_mut().enumerate() {
                    *slot = doc_expect[t] + dirichlet_component[t][col];
                }
                score += cnt * log_sum_exp(&scratch);
            }
        }

        score += dirichlet_log_likelihood(
            self.doc_topic_prior,
            &gamma,
            &dirichlet_doc_topic,
            n_topics,
        );
        score += dirichlet_log_likelihood(
            self.topic_word_prior,
            &self.components,
            &dirichlet_component,
            n_features,
        );
        score
    }
}

impl TopicModel for LdaModel {
    fn num_topics(&self) -> usize {
        self.components.len()
    }

    fn components(&self) -> &[Vec<f64>] {
        &self.components
    }

    fn transform(&self, matrix: &DocumentTermMatrix) -> Vec<Vec<f64>> {
        let (gamma, _) = self.e_step(matrix, None, false);
        gamma
            .into_iter()
            .map(|row| {
                let total: f64 = row.iter().sum();
                row.into_iter().map(|g| g / total).collect()
            })
            .collect()
    }

    fn score(&self, matrix: &DocumentTermMatrix) -> f64 {
        self.approx_bound(matrix)
    }

    fn perplexity(&self, matrix: &DocumentTermMatrix) -> f64 {
        let word_count = matrix.total_weight();
        if word_count <= 0.0 {
            return f64::INFINITY;
        }
        (-self.approx_bound(matrix) / word_count).exp()
    }
}

/// E[log p(distr | prior)] - E[log q(distr)] summed over rows.
fn dirichlet_log_likelihood(
    prior: f64,
    distr: &[Vec<f64>],
    dirichlet_distr: &[Vec<f64>],
    size: usize,
) -> f64 {
    let mut score = 0.0;
    for (row, expect) in distr.iter().zip(dirichlet_distr) {
        for (&d, &e) in row.iter().zip(expect) {
            score += (prior - d) * e + ln_gamma(d) - ln_gamma(prior);
        }
        score += ln_gamma(prior * size as f64) - ln_gamma(row.iter().sum());
    }
    score
}

fn exp_dirichlet(gamma: &[f64]) -> Vec<f64> {
    dirichlet_expectation(gamma).into_iter().map(f64::exp).collect()
}

/// Positive draw with mean 1 and standard deviation 0.1, the spread of a
/// Gamma(100, 0.01) initialiser.
fn gamma_like(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (1.0 + 0.1 * z).max(1e-3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_theme_matrix() -> DocumentTermMatrix {
        // Columns 0-2 belong to one theme, 3-5 to another.
        DocumentTermMatrix::from_dense(&[
            vec![3.0, 2.0, 1.0, 0.0, 0.0, 0.0],
            vec![2.0, 3.0, 1.0, 0.0, 0.0, 0.0],
            vec![3.0, 2.0, 1.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0, 3.0, 2.0],
            vec![0.0, 0.0, 0.0, 2.0, 2.0, 3.0],
        ])
    }

    #[test]
    fn test_fit_shapes() {
        let matrix = two_theme_matrix();
        let model = LdaTrainer::default().fit_lda(&matrix, 2).unwrap();
        assert_eq!(model.num_topics(), 2);
        assert!(model.components().iter().all(|r| r.len() == 6));
        assert!(model.components().iter().flatten().all(|&w| w > 0.0));

        let doc_topic = model.transform(&matrix);
        assert_eq!(doc_topic.len(), 5);
        for row in &doc_topic {
            assert_eq!(row.len(), 2);
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let matrix = two_theme_matrix();
        let a = LdaTrainer::default().fit_lda(&matrix, 3).unwrap();
        let b = LdaTrainer::default().fit_lda(&matrix, 3).unwrap();
        assert_eq!(a.components(), b.components());
        assert_eq!(a.transform(&matrix), b.transform(&matrix));
    }

    #[test]
    fn test_identical_documents_get_identical_topics() {
        let matrix = two_theme_matrix();
        let model = LdaTrainer::default().fit_lda(&matrix, 2).unwrap();
        let doc_topic = model.transform(&matrix);
        assert_eq!(doc_topic[0], doc_topic[2]);
    }

    #[test]
    fn test_score_and_perplexity_are_finite() {
        let matrix = two_theme_matrix();
        let model = LdaTrainer::default().fit_lda(&matrix, 2).unwrap();
        let score = model.score(&matrix);
        let perplexity = model.perplexity(&matrix);
        assert!(score.is_finite());
        assert!(perplexity.is_finite() && perplexity > 0.0);
    }

    #[test]
    fn test_zero_topics_fails() {
        let matrix = two_theme_matrix();
        assert!(matches!(
            LdaTrainer::default().fit_lda(&matrix, 0),
            Err(AnalysisError::ModelTrainingFailed)
        ));
    }
}
