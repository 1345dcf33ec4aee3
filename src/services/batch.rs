//! Batched multi-file runs
//!
//! All input files are normalized and analyzed as one run, so relationships
//! resolve across every file. `batch_size` only bounds how many resources a
//! single commit hands to the [`RunSink`]. Every commit chunk shares the run
//! id. The cancellation flag is checked between chunks, so chunks already
//! handed to the sink stay committed when a run is cancelled.

use std::path::PathBuf;

use super::{Analyzer, CancellationFlag};
use crate::error::{GraphError, GraphResult};
use crate::ingest::{discover_files, load_files};
use crate::models::{ClusterState, ParseStats};

/// Destination for the commit chunks of a run
#[cfg_attr(test, mockall::automock)]
pub trait RunSink {
    /// Persist one chunk atomically
    fn persist(&mut self, state: &ClusterState) -> GraphResult<()>;
}

/// What a batched run committed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub run_id: String,
    pub batches: usize,
    pub files: usize,
    pub resources: usize,
    pub relationships: usize,
    pub parse_stats: ParseStats,
}

pub struct BatchRunner<'a> {
    analyzer: &'a Analyzer,
    batch_size: usize,
}

impl<'a> BatchRunner<'a> {
    /// `batch_size == 0` commits the whole run at once
    pub fn new(analyzer: &'a Analyzer, batch_size: usize) -> Self {
        Self {
            analyzer,
            batch_size,
        }
    }

    pub fn run(
        &self,
        paths: &[PathBuf],
        sink: &mut dyn RunSink,
        cancel: &CancellationFlag,
    ) -> GraphResult<BatchReport> {
        let files = discover_files(paths)?;
        let loaded = load_files(&files, &self.analyzer.normalizer(), cancel)?;
        if cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }

        let state = self.analyzer.analyze(loaded.resources, loaded.stats);
        let chunks = state.commit_chunks(self.batch_size);
        let mut report = BatchReport {
            run_id: state.run_id.clone(),
            files: loaded.files,
            parse_stats: loaded.stats,
            ..BatchReport::default()
        };
        tracing::info!(
            run_id = %report.run_id,
            "Committing {} resource(s) from {} file(s) in {} batch(es)",
            state.resources.len(),
            files.len(),
            chunks.len()
        );

        for (number, chunk) in chunks.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    "Run cancelled after {} of {} batch(es)",
                    report.batches,
                    chunks.len()
                );
                return Err(GraphError::Cancelled);
            }

            sink.persist(chunk)?;

            report.batches += 1;
            report.resources += chunk.resources.len();
            report.relationships += chunk.relationships.len();
            tracing::debug!("Committed batch {}/{}", number + 1, chunks.len());
        }

        Ok(report)
    }
}
