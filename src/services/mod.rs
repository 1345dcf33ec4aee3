//! Service layer for analysis runs
//!
//! This module ties normalization, indexing, detection, assembly and health
//! assessment together. Callers (the CLI, tests) drive runs through the
//! [`Analyzer`] and, for multi-file exports, the [`BatchRunner`].

mod analyzer;
mod batch;
mod cancellation;

pub use analyzer::{Analyzer, AnalyzerOptions};
pub use batch::{BatchReport, BatchRunner, RunSink};
pub use cancellation::CancellationFlag;
