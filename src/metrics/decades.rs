// Decade-binned topic trends and the corpus time period.

use std::collections::BTreeMap;

/// Decade label ("1990-1999") to the mean topic vector of its documents.
pub type DecadeDistribution = BTreeMap<String, Vec<f64>>;

/// First year of the decade containing `year`.
pub fn decade_start(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

pub fn decade_label(start: i32) -> String {
    format!("{}-{}", start, start + 9)
}

/// Average the document-topic rows of each decade.
///
/// Documents without a year are left out. Decades without documents do not
/// appear in the result.
pub fn group_by_decades(years: &[Option<i32>], doc_topic: &[Vec<f64>]) -> DecadeDistribution {
    let mut sums: BTreeMap<i32, (Vec<f64>, usize)> = BTreeMap::new();

    for (year, row) in years.iter().zip(doc_topic) {
        let Some(year) = year else { continue };
        let (sum, count) = sums
            .entry(decade_start(*year))
            .or_insert_with(|| (vec![0.0; row.len()], 0));
        for (s, v) in sum.iter_mut().zip(row) {
            *s += v;
        }
        *count += 1;
    }

    sums.into_iter()
        .map(|(start, (sum, count))| {
            let mean = sum.into_iter().map(|s| s / count as f64).collect();
            (decade_label(start), mean)
        })
        .collect()
}

/// "min-max" over the known years, or "N/A" when none are known.
pub fn time_period(years: &[Option<i32>]) -> String {
    let known = years.iter().flatten();
    match (known.clone().min(), known.max()) {
        (Some(min), Some(max)) => format!("{min}-{max}"),
        _ => "N/A".to_string(),
    }
}
