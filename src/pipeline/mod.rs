// Analysis pipeline: options in, report out.
//
// `Pipeline` sequences extraction, cleaning, vectorizing, fitting and
// metrics for one uploaded archive, reporting each stage as it goes.

pub mod analysis;
pub mod options;
pub mod report;
pub mod stage;

pub use analysis::Pipeline;
pub use options::AnalysisOptions;
pub use report::{summary_text, AnalysisReport};
pub use stage::{Stage, StageObserver};
