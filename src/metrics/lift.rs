// Lift: how concentrated a topic's words are relative to the corpus.
//
// marginal[w] = (sum_k components[k][w] + eps) / (sum of all components + eps)
// lift[k][w]  = (components[k][w] + eps) / (marginal[w] + eps)
//
// The epsilon keeps all-zero columns finite.

pub const EPSILON: f64 = 1e-12;

/// Corpus-wide probability of each word under the model.
pub fn marginal_word_probabilities(components: &[Vec<f64>]) -> Vec<f64> {
    let n_features = components.first().map_or(0, |r| r.len());
    let mut column_sums = vec![0.0; n_features];
    for row in components {
        for (sum, w) in column_sums.iter_mut().zip(row) {
            *sum += w;
        }
    }
    let grand_total: f64 = column_sums.iter().sum();
    column_sums
        .into_iter()
        .map(|s| (s + EPSILON) / (grand_total + EPSILON))
        .collect()
}

/// Lift of every (topic, word) pair.
pub fn lift_scores(components: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let marginal = marginal_word_probabilities(components);
    components
        .iter()
        .map(|row| {
            row.iter()
                .zip(&marginal)
                .map(|(w, m)| (w + EPSILON) / (m + EPSILON))
                .collect()
        })
        .collect()
}

/// Mean lift over the whole vocabulary, per topic.
pub fn average_lift_per_topic(components: &[Vec<f64>]) -> Vec<f64> {
    lift_scores(components)
        .into_iter()
        .map(|row| {
            if row.is_empty() {
                0.0
            } else {
                row.iter().sum::<f64>() / row.len() as f64
            }
        })
        .collect()
}
