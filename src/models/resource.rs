//! Normalized resource records and lightweight references to them

use super::ResourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Label or annotation map. Ordered so that serialized output is stable.
pub type StringMap = BTreeMap<String, String>;

/// An `ownerReferences` entry as found in object metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerReference {
    pub api_version: Option<String>,
    pub kind: String,
    pub name: String,
    pub uid: Option<String>,
    /// Set when the owner is the managing controller
    pub controller: bool,
}

/// Lookup key for key-based resolution: `(kind, namespace, name)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceKey {
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceKey {
    pub fn new(kind: &str, namespace: Option<&str>, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// One Kubernetes object after normalization.
///
/// Built once per input record by the ingest boundary and never mutated
/// afterwards; analysis only ever borrows it. Kind-specific fields inside
/// `spec` and `status` are read through [`crate::models::accessors`] rather
/// than traversed directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResource {
    pub api_version: String,
    pub kind: String,
    /// Parsed kind, `None` for kinds without dedicated rules
    #[serde(skip)]
    pub kind_tag: Option<ResourceKind>,
    pub name: String,
    pub namespace: Option<String>,
    pub uid: Option<String>,
    pub labels: StringMap,
    pub annotations: StringMap,
    pub owner_references: Vec<OwnerReference>,
    pub spec: Map<String, Value>,
    /// `None` when the record carried no status block at all
    pub status: Option<Map<String, Value>>,
    pub creation_timestamp: Option<DateTime<Utc>>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
    pub resource_version: Option<String>,
    pub generation: Option<i64>,
    pub finalizers: Vec<String>,
}

impl NormalizedResource {
    /// Stable identity: the UID when present, else `Kind/namespace/name`
    pub fn identity(&self) -> String {
        match self.uid.as_deref().filter(|uid| !uid.is_empty()) {
            Some(uid) => uid.to_string(),
            None => self.key().to_string(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.kind, self.namespace.as_deref(), &self.name)
    }

    /// Reference pointing at this resource
    pub fn reference(&self) -> ResourceReference {
        ResourceReference {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            uid: self.uid.clone(),
        }
    }

    /// Human readable `Kind/namespace/name`
    pub fn full_name(&self) -> String {
        self.key().to_string()
    }
}

/// Lightweight pointer used as a relationship endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    pub uid: Option<String>,
}

impl ResourceReference {
    /// Reference to an object that was named but not found in the run
    pub fn by_name(api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            uid: None,
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.kind, self.namespace.as_deref(), &self.name)
    }

    /// Same identity scheme as [`NormalizedResource::identity`]
    pub fn identity(&self) -> String {
        match self.uid.as_deref().filter(|uid| !uid.is_empty()) {
            Some(uid) => uid.to_string(),
            None => self.key().to_string(),
        }
    }

    /// Whether this reference points at `resource`
    pub fn points_to(&self, resource: &NormalizedResource) -> bool {
        *self == resource.reference()
    }
}

/// Equality by UID when both sides carry one, else by `(kind, namespace, name)`
impl PartialEq for ResourceReference {
    fn eq(&self, other: &Self) -> bool {
        match (
            self.uid.as_deref().filter(|u| !u.is_empty()),
            other.uid.as_deref().filter(|u| !u.is_empty()),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => self.key() == other.key(),
        }
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
