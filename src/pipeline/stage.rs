// Analysis run states and the observer callback that reports them.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Where an analysis run currently is.
///
/// Runs move forward through the states in declaration order. `Failed` can
/// follow any state except `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Extracting,
    Cleaning,
    Vectorizing,
    Fitting,
    Summarizing,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Extracting => "extracting",
            Stage::Cleaning => "cleaning",
            Stage::Vectorizing => "vectorizing",
            Stage::Fitting => "fitting",
            Stage::Summarizing => "summarizing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Human-readable progress message.
    pub fn describe(self) -> &'static str {
        match self {
            Stage::Idle => "Waiting",
            Stage::Extracting => "Extracting text from PDFs",
            Stage::Cleaning => "Cleaning extracted text",
            Stage::Vectorizing => "Building vocabulary",
            Stage::Fitting => "Fitting topic model",
            Stage::Summarizing => "Summarizing topics",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked on every stage transition. Called from whichever thread
/// the transition happens on, including the blocking pool.
pub type StageObserver = Arc<dyn Fn(Stage) + Send + Sync>;

/// Forwards transitions to an optional observer and logs them.
#[derive(Clone, Default)]
pub(crate) struct StageReporter {
    observer: Option<StageObserver>,
}

impl StageReporter {
    pub(crate) fn new(observer: Option<StageObserver>) -> Self {
        Self { observer }
    }

    pub(crate) fn enter(&self, stage: Stage) {
        tracing::info!(stage = stage.as_str(), "Analysis stage");
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }
}
