//! Raw record to [`NormalizedResource`] conversion
//!
//! This is the only place malformed input is rejected; detectors and health
//! rules assume every resource they see passed through here.

use crate::error::{GraphError, GraphResult};
use crate::models::{NormalizedResource, OwnerReference, ParseStats, ResourceKind, StringMap};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Top-level payload fields folded into `spec` for kinds that keep their
/// content outside of it (ConfigMap, Secret, RoleBinding, ...)
const FOLDED_FIELDS: &[&str] = &["data", "binaryData", "stringData", "subjects", "roleRef", "type"];

/// Expand a kubectl `List` export into its items
pub fn expand_records(record: Value) -> Vec<Value> {
    let is_list = record.get("kind").and_then(Value::as_str) == Some("List");
    match record {
        Value::Object(mut obj) if is_list => match obj.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        other => vec![other],
    }
}

/// Normalize a single decoded object
pub fn normalize_record(record: &Value) -> GraphResult<NormalizedResource> {
    let obj = record
        .as_object()
        .ok_or_else(|| GraphError::MalformedRecord("record is not an object".to_string()))?;

    let kind = non_empty_str(obj.get("kind"))
        .ok_or_else(|| GraphError::MalformedRecord("missing 'kind' field".to_string()))?;

    let metadata = obj
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let name = non_empty_str(metadata.get("name")).ok_or_else(|| {
        GraphError::MalformedRecord(format!("{} is missing 'metadata.name'", kind))
    })?;

    let mut spec = obj
        .get("spec")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for field in FOLDED_FIELDS {
        if let Some(value) = obj.get(*field) {
            spec.entry(field.to_string()).or_insert_with(|| value.clone());
        }
    }

    Ok(NormalizedResource {
        api_version: non_empty_str(obj.get("apiVersion"))
            .unwrap_or("v1")
            .to_string(),
        kind: kind.to_string(),
        kind_tag: ResourceKind::parse_optional(kind),
        name: name.to_string(),
        namespace: non_empty_str(metadata.get("namespace")).map(str::to_string),
        uid: non_empty_str(metadata.get("uid")).map(str::to_string),
        labels: string_map(metadata.get("labels")),
        annotations: string_map(metadata.get("annotations")),
        owner_references: owner_references(&metadata),
        spec,
        status: obj.get("status").and_then(Value::as_object).cloned(),
        creation_timestamp: timestamp(&metadata, "creationTimestamp"),
        deletion_timestamp: timestamp(&metadata, "deletionTimestamp"),
        resource_version: non_empty_str(metadata.get("resourceVersion")).map(str::to_string),
        generation: metadata.get("generation").and_then(Value::as_i64),
        finalizers: metadata
            .get("finalizers")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// Normalizes record streams, tolerating or rejecting malformed records
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    /// Abort on the first malformed record instead of skipping it
    pub strict: bool,
}

impl Normalizer {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Normalize every record from one origin (usually a file).
    ///
    /// `List` records are expanded; null documents are ignored.
    pub fn normalize_all(
        &self,
        records: impl IntoIterator<Item = Value>,
        origin: &str,
    ) -> GraphResult<(Vec<NormalizedResource>, ParseStats)> {
        let mut resources = Vec::new();
        let mut stats = ParseStats::default();

        for record in records.into_iter().flat_map(expand_records) {
            if record.is_null() {
                continue;
            }
            match normalize_record(&record) {
                Ok(resource) => {
                    tracing::trace!("Normalized {} from {}", resource.full_name(), origin);
                    stats.parsed += 1;
                    resources.push(resource);
                }
                Err(GraphError::MalformedRecord(reason)) if !self.strict => {
                    tracing::warn!("Skipping malformed record in {}: {}", origin, reason);
                    stats.skipped += 1;
                }
                Err(GraphError::MalformedRecord(reason)) => {
                    return Err(GraphError::MalformedRecord(format!("{}: {}", origin, reason)));
                }
                Err(e) => return Err(e),
            }
        }

        Ok((resources, stats))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn string_map(value: Option<&Value>) -> StringMap {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn owner_references(metadata: &Map<String, Value>) -> Vec<OwnerReference> {
    let Some(entries) = metadata.get("ownerReferences").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let kind = non_empty_str(entry.get("kind"));
            let name = non_empty_str(entry.get("name"));
            let (Some(kind), Some(name)) = (kind, name) else {
                tracing::debug!("Ignoring owner reference without kind/name: {}", entry);
                return None;
            };
            Some(OwnerReference {
                api_version: non_empty_str(entry.get("apiVersion")).map(str::to_string),
                kind: kind.to_string(),
                name: name.to_string(),
                uid: non_empty_str(entry.get("uid")).map(str::to_string),
                controller: entry
                    .get("controller")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            })
        })
        .collect()
}

fn timestamp(metadata: &Map<String, Value>, field: &str) -> Option<DateTime<Utc>> {
    let raw = non_empty_str(metadata.get(field))?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("Failed to parse {} '{}': {}", field, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_folds_configmap_data_into_spec() {
        let resource = normalize_record(&json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "cfg", "namespace": "default"},
            "data": {"key": "value"}
        }))
        .unwrap();

        assert_eq!(resource.spec.get("data"), Some(&json!({"key": "value"})));
        assert!(resource.status.is_none());
    }

    #[test]
    fn test_rejects_missing_name() {
        let err = normalize_record(&json!({"kind": "Pod", "metadata": {}})).unwrap_err();
        assert!(matches!(err, GraphError::MalformedRecord(_)));
    }

    #[test]
    fn test_bad_timestamp_is_dropped() {
        let resource = normalize_record(&json!({
            "kind": "Pod",
            "metadata": {"name": "web", "creationTimestamp": "yesterday"}
        }))
        .unwrap();
        assert!(resource.creation_timestamp.is_none());
        assert_eq!(resource.api_version, "v1");
    }

    #[test]
    fn test_expand_list() {
        let records = expand_records(json!({
            "kind": "List",
            "items": [{"kind": "Pod"}, {"kind": "Service"}]
        }));
        assert_eq!(records.len(), 2);
        assert_eq!(expand_records(json!({"kind": "Pod"})).len(), 1);
    }
}
