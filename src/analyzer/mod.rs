//! Post-mortem semantic-error analyzer: turns a recorded log of
//! invocation/response timestamps into a quantitative score of how far the
//! execution deviated from strict FIFO order.
//!
//! The pipeline is [`parser::parse`] → [`matcher::match_operations`] →
//! [`linearizer::linearize`] → [`cost`]/[`fairness`] scoring →
//! [`report::render`], wired together by [`executor::analyze`].

pub mod cost;
pub mod error;
pub mod executor;
pub mod fairness;
pub mod histogram;
pub mod linearizer;
pub mod matcher;
pub mod operation;
pub mod overlap;
pub mod parser;
pub mod report;

pub use error::{ConfigError, LogError};
pub use executor::{analyze, AnalysisResult};
pub use histogram::Histogram;
pub use linearizer::LinearizerKind;
pub use operation::{OpType, Operation};
