// CSV export of topic summaries.
//
// Columns: Topic ID, Topic Name, Top Words, Word Scores. Word scores are the
// top-word percentages joined by ", ". Every field is double-quoted.

use std::path::Path;

use anyhow::{Context, Result};

use crate::metrics::TopicSummary;

pub const HEADER: &str = "Topic ID,Topic Name,Top Words,Word Scores";

/// Render topic summaries as CSV text (header included).
pub fn topics_to_csv(topics: &[TopicSummary]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for (idx, topic) in topics.iter().enumerate() {
        let scores: Vec<String> = topic
            .word_scores
            .percentages
            .iter()
            .map(|p| p.to_string())
            .collect();
        let fields = [
            (idx + 1).to_string(),
            topic.label.clone(),
            topic.words.clone(),
            scores.join(", "),
        ];
        let quoted: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        out.push_str(&quoted.join(","));
        out.push('\n');
    }
    out
}

/// Write the CSV export to `path`.
pub fn write_topics_csv(path: &Path, topics: &[TopicSummary]) -> Result<()> {
    std::fs::write(path, topics_to_csv(topics))
        .with_context(|| format!("Failed to write CSV to {}", path.display()))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
