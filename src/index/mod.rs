//! Run-scoped resource index
//!
//! Built once over the complete resource set of a run and never mutated
//! afterwards, so detectors may share it across threads. Every lookup
//! returns `Option`; a miss is an ordinary outcome, not an error.

use crate::models::{NormalizedResource, OwnerReference, ResourceKey, StringMap};
use std::collections::HashMap;

/// Label postings for one `(kind, namespace)` bucket
#[derive(Debug, Default)]
struct LabelBucket<'a> {
    members: Vec<usize>,
    by_pair: HashMap<(&'a str, &'a str), Vec<usize>>,
}

/// Lookup structure over one run's resources
#[derive(Debug)]
pub struct ResourceIndex<'a> {
    resources: &'a [NormalizedResource],
    by_uid: HashMap<&'a str, usize>,
    by_key: HashMap<ResourceKey, usize>,
    by_namespace_and_label: HashMap<(&'a str, Option<&'a str>), LabelBucket<'a>>,
}

impl<'a> ResourceIndex<'a> {
    /// Index every resource. On a `(kind, namespace, name)` collision the
    /// later resource wins key lookups; UID lookups stay unambiguous.
    pub fn build(resources: &'a [NormalizedResource]) -> Self {
        let mut by_uid = HashMap::with_capacity(resources.len());
        let mut by_key = HashMap::with_capacity(resources.len());
        let mut by_namespace_and_label: HashMap<(&'a str, Option<&'a str>), LabelBucket<'a>> =
            HashMap::new();

        for (position, resource) in resources.iter().enumerate() {
            if let Some(uid) = resource.uid.as_deref() {
                by_uid.insert(uid, position);
            }

            if let Some(previous) = by_key.insert(resource.key(), position) {
                let previous = &resources[previous];
                if previous.uid != resource.uid {
                    tracing::warn!(
                        "Key collision for {}: uid {:?} shadows uid {:?}",
                        resource.full_name(),
                        resource.uid,
                        previous.uid
                    );
                } else {
                    tracing::debug!("Duplicate record for {}", resource.full_name());
                }
            }

            let bucket = by_namespace_and_label
                .entry((resource.kind.as_str(), resource.namespace.as_deref()))
                .or_default();
            bucket.members.push(position);
            for (key, value) in &resource.labels {
                bucket
                    .by_pair
                    .entry((key.as_str(), value.as_str()))
                    .or_default()
                    .push(position);
            }
        }

        tracing::debug!(
            "Indexed {} resource(s): {} by uid, {} by key",
            resources.len(),
            by_uid.len(),
            by_key.len()
        );

        Self {
            resources,
            by_uid,
            by_key,
            by_namespace_and_label,
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resources(&self) -> &'a [NormalizedResource] {
        self.resources
    }

    pub fn get_by_uid(&self, uid: &str) -> Option<&'a NormalizedResource> {
        self.by_uid.get(uid).map(|&i| &self.resources[i])
    }

    pub fn get_by_key(
        &self,
        kind: &str,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<&'a NormalizedResource> {
        self.by_key
            .get(&ResourceKey::new(kind, namespace, name))
            .map(|&i| &self.resources[i])
    }

    /// Resolve an owner reference declared by a resource in `namespace`.
    ///
    /// A reference carrying a UID resolves by UID only; one without falls
    /// back to `(kind, namespace, name)`.
    pub fn resolve_owner(
        &self,
        owner: &OwnerReference,
        namespace: Option<&str>,
    ) -> Option<&'a NormalizedResource> {
        match owner.uid.as_deref() {
            Some(uid) => self.get_by_uid(uid),
            None => self
                .get_by_key(&owner.kind, namespace, &owner.name)
                .or_else(|| self.get_by_key(&owner.kind, None, &owner.name)),
        }
    }

    /// All resources of `kind` in `namespace` whose labels are a superset of
    /// `selector`, in input order. An empty selector matches every member of
    /// the bucket.
    ///
    /// Cost is proportional to the shortest posting list among the selector
    /// pairs, not to the size of the run.
    pub fn select(
        &self,
        kind: &str,
        namespace: Option<&str>,
        selector: &StringMap,
    ) -> Vec<&'a NormalizedResource> {
        let Some(bucket) = self.by_namespace_and_label.get(&(kind, namespace)) else {
            return Vec::new();
        };

        let mut candidates: &[usize] = &bucket.members;
        for (key, value) in selector {
            match bucket.by_pair.get(&(key.as_str(), value.as_str())) {
                Some(postings) if postings.len() < candidates.len() => candidates = postings,
                Some(_) => {}
                None => return Vec::new(),
            }
        }

        candidates
            .iter()
            .map(|&i| &self.resources[i])
            .filter(|resource| labels_match(&resource.labels, selector))
            .collect()
    }
}

/// Whether `labels` contains every `selector` pair
pub fn labels_match(labels: &StringMap, selector: &StringMap) -> bool {
    selector
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}
