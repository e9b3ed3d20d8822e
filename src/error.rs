// Analysis error taxonomy.
//
// Every pipeline-fatal condition has its own variant so callers (CLI, web)
// can report a specific message instead of a generic failure. Per-document
// problems never show up here; they are logged and the document is skipped.

use thiserror::Error;

/// Terminal errors produced by an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No file uploaded")]
    NoInput,

    #[error("Uploaded archive contains no entries")]
    EmptyArchive,

    #[error("Uploaded archive could not be read: {0}")]
    UnreadableArchive(String),

    #[error("No valid text extracted from PDFs.")]
    NoValidText,

    #[error("No terms remain after stop-word and frequency filtering")]
    EmptyVocabulary,

    #[error("LDA model training failed. No topics generated.")]
    ModelTrainingFailed,

    #[error("Number of topics must be a positive integer (got {0})")]
    InvalidTopicCount(i64),

    #[error("Invalid value for {name}: {value}")]
    InvalidParameter { name: String, value: String },

    #[error("Failed to stage uploaded files: {0}")]
    Staging(#[from] std::io::Error),

    #[error("Analysis exceeded the {0}s time limit")]
    TimedOut(u64),

    #[error("Analysis task was cancelled")]
    Cancelled,

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}

impl AnalysisError {
    /// Stable machine-readable identifier for structured error output.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::NoInput => "no_input",
            AnalysisError::EmptyArchive => "empty_archive",
            AnalysisError::UnreadableArchive(_) => "unreadable_archive",
            AnalysisError::NoValidText => "no_valid_text",
            AnalysisError::EmptyVocabulary => "empty_vocabulary",
            AnalysisError::ModelTrainingFailed => "model_training_failed",
            AnalysisError::InvalidTopicCount(_) => "invalid_topic_count",
            AnalysisError::InvalidParameter { .. } => "invalid_parameter",
            AnalysisError::Staging(_) => "staging",
            AnalysisError::TimedOut(_) => "timed_out",
            AnalysisError::Cancelled => "cancelled",
            AnalysisError::TaskFailed(_) => "task_failed",
        }
    }

    /// True for errors caused by the caller's input rather than the corpus or the host.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::NoInput
                | AnalysisError::EmptyArchive
                | AnalysisError::UnreadableArchive(_)
                | AnalysisError::InvalidTopicCount(_)
                | AnalysisError::InvalidParameter { .. }
        )
    }

    pub(crate) fn invalid(name: &str, value: impl ToString) -> Self {
        AnalysisError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_valid_text_message_matches_contract() {
        assert_eq!(
            AnalysisError::NoValidText.to_string(),
            "No valid text extracted from PDFs."
        );
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            AnalysisError::NoInput,
            AnalysisError::EmptyArchive,
            AnalysisError::UnreadableArchive("bad".into()),
            AnalysisError::NoValidText,
            AnalysisError::EmptyVocabulary,
            AnalysisError::ModelTrainingFailed,
            AnalysisError::InvalidTopicCount(0),
        ];
        let kinds: std::collections::HashSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_input_errors_classified() {
        assert!(AnalysisError::NoInput.is_input_error());
        assert!(AnalysisError::InvalidTopicCount(-1).is_input_error());
        assert!(!AnalysisError::EmptyVocabulary.is_input_error());
    }
}
