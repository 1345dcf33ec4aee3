//! Typed accessors over the opaque `spec` / `status` maps
//!
//! Detectors and health rules read kind-specific fields only through these
//! functions. Every accessor fails closed: a missing or mistyped field yields
//! an empty collection, `None`, or `"Unknown"`, never an error.

use super::{NormalizedResource, ResourceKind, StringMap};
use serde_json::{Map, Value};

/// Walk a path of object keys
fn value_at<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(map.get(*first)?, |value, key| value.get(*key))
}

fn str_at<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a str> {
    value_at(map, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn array_at<'a>(map: &'a Map<String, Value>, path: &[&str]) -> &'a [Value] {
    value_at(map, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_map(value: Option<&Value>) -> StringMap {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn status(resource: &NormalizedResource) -> Option<&Map<String, Value>> {
    resource.status.as_ref()
}

/// A ConfigMap, Secret or claim mounted through a pod volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRef {
    pub volume: String,
    pub kind: ResourceKind,
    pub target: String,
}

/// A ConfigMap or Secret consumed through container environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvRef {
    pub container: String,
    pub kind: ResourceKind,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    pub name: String,
    pub ready: bool,
    pub waiting_reason: Option<String>,
    pub restart_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub condition_type: String,
    pub status: String,
}

/// RBAC binding subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

/// `roleRef`, `scaleTargetRef` and similar typed pointers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRef {
    pub api_version: Option<String>,
    pub kind: String,
    pub name: String,
}

// Pod

pub fn pod_phase(resource: &NormalizedResource) -> &str {
    status(resource)
        .and_then(|s| str_at(s, &["phase"]))
        .unwrap_or("Unknown")
}

/// `spec.serviceAccountName`, defaulting to `"default"`
pub fn pod_service_account(resource: &NormalizedResource) -> &str {
    str_at(&resource.spec, &["serviceAccountName"])
        .or_else(|| str_at(&resource.spec, &["serviceAccount"]))
        .unwrap_or("default")
}

/// Node the scheduler assigned, if any
pub fn pod_node_name(resource: &NormalizedResource) -> Option<&str> {
    str_at(&resource.spec, &["nodeName"])
}

pub fn pod_volume_refs(resource: &NormalizedResource) -> Vec<VolumeRef> {
    let mut refs = Vec::new();
    for volume in array_at(&resource.spec, &["volumes"]) {
        let Some(obj) = volume.as_object() else {
            continue;
        };
        let volume_name = str_at(obj, &["name"]).unwrap_or_default().to_string();
        let mut push = |kind: ResourceKind, target: Option<&str>| {
            if let Some(target) = target {
                refs.push(VolumeRef {
                    volume: volume_name.clone(),
                    kind,
                    target: target.to_string(),
                });
            }
        };

        push(ResourceKind::ConfigMap, str_at(obj, &["configMap", "name"]));
        push(ResourceKind::Secret, str_at(obj, &["secret", "secretName"]));
        push(
            ResourceKind::PersistentVolumeClaim,
            str_at(obj, &["persistentVolumeClaim", "claimName"]),
        );
        for source in array_at(obj, &["projected", "sources"]) {
            if let Some(source) = source.as_object() {
                push(ResourceKind::ConfigMap, str_at(source, &["configMap", "name"]));
                push(ResourceKind::Secret, str_at(source, &["secret", "name"]));
            }
        }
    }
    refs
}

pub fn pod_env_refs(resource: &NormalizedResource) -> Vec<EnvRef> {
    let containers = array_at(&resource.spec, &["initContainers"])
        .iter()
        .chain(array_at(&resource.spec, &["containers"]));

    let mut refs = Vec::new();
    for container in containers.filter_map(Value::as_object) {
        let container_name = str_at(container, &["name"]).unwrap_or_default();
        let mut push = |kind: ResourceKind, target: Option<&str>| {
            if let Some(target) = target {
                refs.push(EnvRef {
                    container: container_name.to_string(),
                    kind,
                    target: target.to_string(),
                });
            }
        };

        for env in array_at(container, &["env"]).iter().filter_map(Value::as_object) {
            push(
                ResourceKind::ConfigMap,
                str_at(env, &["valueFrom", "configMapKeyRef", "name"]),
            );
            push(
                ResourceKind::Secret,
                str_at(env, &["valueFrom", "secretKeyRef", "name"]),
            );
        }
        for env_from in array_at(container, &["envFrom"]).iter().filter_map(Value::as_object) {
            push(ResourceKind::ConfigMap, str_at(env_from, &["configMapRef", "name"]));
            push(ResourceKind::Secret, str_at(env_from, &["secretRef", "name"]));
        }
    }
    refs
}

pub fn container_states(resource: &NormalizedResource) -> Vec<ContainerState> {
    let Some(status) = status(resource) else {
        return Vec::new();
    };
    array_at(status, &["containerStatuses"])
        .iter()
        .filter_map(Value::as_object)
        .map(|cs| ContainerState {
            name: str_at(cs, &["name"]).unwrap_or("unknown").to_string(),
            ready: value_at(cs, &["ready"])
                .and_then(Value::as_bool)
                .unwrap_or(false),
            waiting_reason: str_at(cs, &["state", "waiting", "reason"]).map(str::to_string),
            restart_count: value_at(cs, &["restartCount"])
                .and_then(Value::as_u64)
                .unwrap_or(0),
        })
        .collect()
}

// Service

pub fn service_selector(resource: &NormalizedResource) -> StringMap {
    string_map(resource.spec.get("selector"))
}

pub fn service_type(resource: &NormalizedResource) -> &str {
    str_at(&resource.spec, &["type"]).unwrap_or("ClusterIP")
}

pub fn load_balancer_ingress_count(resource: &NormalizedResource) -> usize {
    status(resource)
        .map(|s| array_at(s, &["loadBalancer", "ingress"]).len())
        .unwrap_or(0)
}

// NetworkPolicy

pub fn network_policy_selector(resource: &NormalizedResource) -> StringMap {
    string_map(value_at(&resource.spec, &["podSelector", "matchLabels"]))
}

// Storage

/// PV name a claim is bound to
pub fn pvc_volume_name(resource: &NormalizedResource) -> Option<&str> {
    str_at(&resource.spec, &["volumeName"])
}

pub fn status_phase(resource: &NormalizedResource) -> Option<&str> {
    status(resource).and_then(|s| str_at(s, &["phase"]))
}

// ConfigMap / Secret

/// Serialized size in bytes of the `data`, `binaryData` and `stringData` payloads
pub fn data_size(resource: &NormalizedResource) -> usize {
    ["data", "binaryData", "stringData"]
        .iter()
        .filter_map(|key| resource.spec.get(*key))
        .filter(|value| value.is_object())
        .map(|value| serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0))
        .sum()
}

// RBAC

pub fn binding_subjects(resource: &NormalizedResource) -> Vec<Subject> {
    array_at(&resource.spec, &["subjects"])
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|subject| {
            Some(Subject {
                kind: str_at(subject, &["kind"])?.to_string(),
                name: str_at(subject, &["name"])?.to_string(),
                namespace: str_at(subject, &["namespace"]).map(str::to_string),
            })
        })
        .collect()
}

pub fn role_ref(resource: &NormalizedResource) -> Option<TypedRef> {
    typed_ref(&resource.spec, "roleRef", "apiGroup")
}

// Ingress

/// Backend service names, first occurrence order, without duplicates
pub fn ingress_backend_services(resource: &NormalizedResource) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: Option<&str>| {
        if let Some(name) = name {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    };

    push(str_at(&resource.spec, &["defaultBackend", "service", "name"]));
    push(str_at(&resource.spec, &["backend", "serviceName"]));
    for rule in array_at(&resource.spec, &["rules"]).iter().filter_map(Value::as_object) {
        for path in array_at(rule, &["http", "paths"]).iter().filter_map(Value::as_object) {
            push(str_at(path, &["backend", "service", "name"]));
            push(str_at(path, &["backend", "serviceName"]));
        }
    }
    names
}

// HorizontalPodAutoscaler

pub fn scale_target(resource: &NormalizedResource) -> Option<TypedRef> {
    typed_ref(&resource.spec, "scaleTargetRef", "apiVersion")
}

// Generic

pub fn conditions(resource: &NormalizedResource) -> Vec<Condition> {
    let Some(status) = status(resource) else {
        return Vec::new();
    };
    array_at(status, &["conditions"])
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|c| {
            Some(Condition {
                condition_type: str_at(c, &["type"])?.to_string(),
                status: str_at(c, &["status"]).unwrap_or("Unknown").to_string(),
            })
        })
        .collect()
}

fn typed_ref(spec: &Map<String, Value>, field: &str, version_key: &str) -> Option<TypedRef> {
    Some(TypedRef {
        api_version: str_at(spec, &[field, version_key]).map(str::to_string),
        kind: str_at(spec, &[field, "kind"])?.to_string(),
        name: str_at(spec, &[field, "name"])?.to_string(),
    })
}
