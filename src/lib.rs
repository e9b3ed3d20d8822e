// topiclens: topic modeling and trend analysis for batches of research papers.
//
// This is the library root. Each module corresponds to a stage or concern of
// the analysis pipeline; `pipeline` ties them together.

pub mod config;
pub mod documents;
pub mod error;
pub mod lookup;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod topics;

#[cfg(feature = "web")]
pub mod web;

pub use error::AnalysisError;
