//! Analysis run orchestration
//!
//! normalize -> index -> detect -> assemble -> assess -> [`ClusterState`].
//! Detection only starts once the index holds the complete resource set of
//! the run. Detectors then run read-only over the index, optionally across
//! the rayon pool; candidates are gathered back in resource order so the
//! assembled graph does not depend on scheduling.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use serde_json::Value;

use super::CancellationFlag;
use crate::config::Config;
use crate::error::{GraphError, GraphResult};
use crate::graph::RelationshipAssembler;
use crate::health::{HealthAssessor, HealthThresholds};
use crate::index::ResourceIndex;
use crate::ingest::{Normalizer, discover_files, load_files};
use crate::models::{
    ClusterState, HealthVerdict, NormalizedResource, ParseStats, RelationshipCandidate,
    RunSummary,
};
use crate::rules::RuleTable;

/// Knobs for a single analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    pub strict: bool,
    pub parallel_detection: bool,
    pub thresholds: HealthThresholds,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            parallel_detection: true,
            thresholds: HealthThresholds::default(),
        }
    }
}

impl From<&Config> for AnalyzerOptions {
    fn from(config: &Config) -> Self {
        Self {
            strict: config.strict,
            parallel_detection: config.parallel_detection,
            thresholds: HealthThresholds {
                large_object_bytes: config.large_object_threshold_bytes,
                restart_warning: config.restart_warning_threshold,
            },
        }
    }
}

/// Runs analyses. Holds no per-run state, so one analyzer can serve any
/// number of runs.
#[derive(Debug, Clone)]
pub struct Analyzer {
    options: AnalyzerOptions,
    rules: RuleTable,
    assessor: HealthAssessor,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerOptions::default())
    }
}

impl Analyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            rules: RuleTable::standard(),
            assessor: HealthAssessor::new(options.thresholds),
        }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.options.strict)
    }

    /// Analyze already normalized resources under a fresh run id
    pub fn analyze(&self, resources: Vec<NormalizedResource>, parse_stats: ParseStats) -> ClusterState {
        self.analyze_run(new_run_id(), resources, parse_stats)
    }

    fn analyze_run(
        &self,
        run_id: String,
        resources: Vec<NormalizedResource>,
        parse_stats: ParseStats,
    ) -> ClusterState {
        let started = Instant::now();
        let run_timestamp = Utc::now();

        let (relationships, health) = {
            let index = ResourceIndex::build(&resources);
            let candidates = self.detect(&index);
            let mut assembler = RelationshipAssembler::new();
            assembler.extend(candidates);
            (assembler.finish(), self.assess(&resources))
        };

        let mut state = ClusterState {
            run_id,
            resources,
            relationships,
            health,
            run_timestamp,
            summary: RunSummary {
                parse_stats,
                ..RunSummary::default()
            },
        };
        state.summary.analysis_duration_seconds = started.elapsed().as_secs_f64();
        state.refresh_summary();

        tracing::info!(
            run_id = %state.run_id,
            resources = state.summary.total_resources,
            relationships = state.summary.total_relationships,
            unresolved = state.summary.unresolved_relationships,
            "Analysis complete in {:.3}s",
            state.summary.analysis_duration_seconds
        );
        state
    }

    /// Normalize raw records and analyze them
    pub fn analyze_records(&self, records: Vec<Value>) -> GraphResult<ClusterState> {
        let (resources, stats) = self.normalizer().normalize_all(records, "input")?;
        Ok(self.analyze(resources, stats))
    }

    /// Discover, decode, normalize and analyze manifest files as one run
    pub fn analyze_files(
        &self,
        paths: &[PathBuf],
        cancel: &CancellationFlag,
    ) -> GraphResult<ClusterState> {
        let files = discover_files(paths)?;
        let loaded = load_files(&files, &self.normalizer(), cancel)?;
        if cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }
        Ok(self.analyze(loaded.resources, loaded.stats))
    }

    /// Run every applicable detector over the indexed resources
    pub fn detect(&self, index: &ResourceIndex<'_>) -> Vec<RelationshipCandidate> {
        let per_resource: Vec<Vec<RelationshipCandidate>> = if self.options.parallel_detection {
            index
                .resources()
                .par_iter()
                .map(|resource| self.candidates_for(resource, index))
                .collect()
        } else {
            index
                .resources()
                .iter()
                .map(|resource| self.candidates_for(resource, index))
                .collect()
        };

        per_resource.into_iter().flatten().collect()
    }

    fn candidates_for(
        &self,
        resource: &NormalizedResource,
        index: &ResourceIndex<'_>,
    ) -> Vec<RelationshipCandidate> {
        self.rules
            .rules_for(resource.kind_tag)
            .detectors
            .iter()
            .flat_map(|detector| detector.detect(resource, index))
            .collect()
    }

    /// Health verdict per resource identity
    pub fn assess(&self, resources: &[NormalizedResource]) -> BTreeMap<String, HealthVerdict> {
        resources
            .iter()
            .map(|resource| {
                let rules = self.rules.rules_for(resource.kind_tag);
                (resource.identity(), self.assessor.assess(resource, rules))
            })
            .collect()
    }
}

pub(crate) fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
