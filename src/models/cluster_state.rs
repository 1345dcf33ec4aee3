//! The result of one analysis run

use super::{HealthStatus, HealthVerdict, NormalizedResource, ResourceRelationship};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Namespace bucket used in summaries for cluster-scoped objects
pub const CLUSTER_SCOPED: &str = "cluster-scoped";

/// Counters collected at the normalization boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub parsed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ParseStats {
    pub fn merge(&mut self, other: ParseStats) {
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }
}

/// Aggregate counts for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_resources: usize,
    pub total_relationships: usize,
    pub unresolved_relationships: usize,
    pub resource_types: BTreeMap<String, usize>,
    pub namespaces: BTreeMap<String, usize>,
    pub health_status: BTreeMap<String, usize>,
    pub relationship_types: BTreeMap<String, usize>,
    /// Issue strings across all verdicts, not resources with issues
    pub issues_count: usize,
    pub analysis_duration_seconds: f64,
    pub parse_stats: ParseStats,
}

/// Plain-text report. Timing is left out so the output is stable across runs.
impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Resources: {} (parsed {}, skipped {}, errors {})",
            self.total_resources,
            self.parse_stats.parsed,
            self.parse_stats.skipped,
            self.parse_stats.errors
        )?;
        writeln!(
            f,
            "Relationships: {} ({} unresolved)",
            self.total_relationships, self.unresolved_relationships
        )?;
        let health: Vec<String> = HealthStatus::all()
            .iter()
            .map(|status| {
                let count = self.health_status.get(status.as_str()).copied().unwrap_or(0);
                format!("{}={}", status, count)
            })
            .collect();
        writeln!(f, "Health: {}", health.join(" "))?;
        writeln!(f, "Issues: {}", self.issues_count)?;

        for (title, counts) in [
            ("Kinds", &self.resource_types),
            ("Namespaces", &self.namespaces),
            ("Relationship types", &self.relationship_types),
        ] {
            if counts.is_empty() {
                continue;
            }
            writeln!(f, "{}:", title)?;
            for (name, count) in counts {
                writeln!(f, "  {}: {}", name, count)?;
            }
        }
        Ok(())
    }
}

/// Everything one analysis run produced.
///
/// Owned by the run; a later run builds a fresh value instead of patching
/// this one.
#[derive(Debug, Clone)]
pub struct ClusterState {
    pub run_id: String,
    pub resources: Vec<NormalizedResource>,
    pub relationships: Vec<ResourceRelationship>,
    /// Keyed by [`NormalizedResource::identity`]
    pub health: BTreeMap<String, HealthVerdict>,
    pub run_timestamp: DateTime<Utc>,
    pub summary: RunSummary,
}

impl ClusterState {
    pub fn health_of(&self, resource: &NormalizedResource) -> Option<&HealthVerdict> {
        self.health.get(&resource.identity())
    }

    /// Split the run into commit chunks of at most `chunk_size` resources.
    ///
    /// Every chunk keeps the run id, timestamp and the summary of the whole
    /// run. A relationship travels with the chunk holding its source, or its
    /// target when the source is not part of the run. `chunk_size == 0`
    /// yields a single chunk.
    pub fn commit_chunks(&self, chunk_size: usize) -> Vec<ClusterState> {
        let size = if chunk_size == 0 {
            self.resources.len().max(1)
        } else {
            chunk_size
        };

        let mut chunks: Vec<ClusterState> = self
            .resources
            .chunks(size)
            .map(|slice| ClusterState {
                run_id: self.run_id.clone(),
                resources: slice.to_vec(),
                relationships: Vec::new(),
                health: slice
                    .iter()
                    .filter_map(|r| {
                        let identity = r.identity();
                        self.health.get(&identity).map(|v| (identity, v.clone()))
                    })
                    .collect(),
                run_timestamp: self.run_timestamp,
                summary: self.summary.clone(),
            })
            .collect();
        if chunks.is_empty() {
            chunks.push(ClusterState {
                relationships: Vec::new(),
                ..self.clone()
            });
        }

        let chunk_of: HashMap<String, usize> = chunks
            .iter()
            .enumerate()
            .flat_map(|(i, chunk)| chunk.resources.iter().map(move |r| (r.identity(), i)))
            .collect();
        let last = chunks.len() - 1;
        for rel in &self.relationships {
            let i = chunk_of
                .get(&rel.source.identity())
                .or_else(|| chunk_of.get(&rel.target.identity()))
                .copied()
                .unwrap_or(last);
            chunks[i].relationships.push(rel.clone());
        }
        chunks
    }

    /// Relationships whose source is `resource`
    pub fn relationships_from<'a>(
        &'a self,
        resource: &'a NormalizedResource,
    ) -> impl Iterator<Item = &'a ResourceRelationship> {
        self.relationships
            .iter()
            .filter(move |rel| rel.source.points_to(resource))
    }

    /// Relationships whose target is `resource`
    pub fn relationships_to<'a>(
        &'a self,
        resource: &'a NormalizedResource,
    ) -> impl Iterator<Item = &'a ResourceRelationship> {
        self.relationships
            .iter()
            .filter(move |rel| rel.target.points_to(resource))
    }

    /// Recompute `summary` from the current contents, keeping timing and parse stats
    pub fn refresh_summary(&mut self) {
        let mut summary = RunSummary {
            total_resources: self.resources.len(),
            total_relationships: self.relationships.len(),
            analysis_duration_seconds: self.summary.analysis_duration_seconds,
            parse_stats: self.summary.parse_stats,
            ..RunSummary::default()
        };

        for status in HealthStatus::all() {
            summary.health_status.insert(status.to_string(), 0);
        }

        for resource in &self.resources {
            *summary
                .resource_types
                .entry(resource.kind.clone())
                .or_insert(0) += 1;
            let namespace = resource
                .namespace
                .clone()
                .unwrap_or_else(|| CLUSTER_SCOPED.to_string());
            *summary.namespaces.entry(namespace).or_insert(0) += 1;

            let verdict = self.health_of(resource);
            let status = verdict.map(|v| v.status).unwrap_or(HealthStatus::Unknown);
            *summary.health_status.entry(status.to_string()).or_insert(0) += 1;
            summary.issues_count += verdict.map(|v| v.issues.len()).unwrap_or(0);
        }

        for rel in &self.relationships {
            *summary
                .relationship_types
                .entry(rel.kind.to_string())
                .or_insert(0) += 1;
            if rel.is_unresolved() {
                summary.unresolved_relationships += 1;
            }
        }

        self.summary = summary;
    }

    /// JSON document with top-level `resources`, `relationships`,
    /// `analysis_timestamp` and `summary` keys
    pub fn to_json(&self) -> serde_json::Result<Value> {
        let resources = self
            .resources
            .iter()
            .map(|resource| {
                let verdict = self
                    .health_of(resource)
                    .cloned()
                    .unwrap_or_else(HealthVerdict::unknown);
                let mut entry = serde_json::to_value(resource)?;
                if let Some(obj) = entry.as_object_mut() {
                    obj.insert("health_status".to_string(), serde_json::to_value(verdict.status)?);
                    obj.insert("issues".to_string(), serde_json::to_value(&verdict.issues)?);
                }
                Ok(entry)
            })
            .collect::<serde_json::Result<Vec<Value>>>()?;

        Ok(serde_json::json!({
            "run_id": self.run_id,
            "resources": resources,
            "relationships": serde_json::to_value(&self.relationships)?,
            "analysis_timestamp": self.run_timestamp.to_rfc3339(),
            "summary": serde_json::to_value(&self.summary)?,
        }))
    }
}
