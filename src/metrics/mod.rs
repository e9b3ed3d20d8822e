// Metrics derived from a fitted topic model: top words, lift, representative
// documents and decade trends.

pub mod decades;
pub mod lift;
pub mod top_papers;
pub mod top_words;

pub use decades::{group_by_decades, time_period, DecadeDistribution};
pub use lift::average_lift_per_topic;
pub use top_papers::{top_papers, TopPaperEntry};
pub use top_words::{summarize_topics, TopicSummary, WordScores};
