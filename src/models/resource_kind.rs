//! Kubernetes resource kind definitions
//!
//! This module provides a closed enum for the resource kinds the engine has
//! rules for. Anything else is carried through analysis as an unsupported
//! kind (`None` from [`ResourceKind::parse_optional`]) and only gets the
//! generic rule set.

use std::fmt;
use std::str::FromStr;

/// Enumeration of all resource kinds with dedicated rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    // Workloads
    Pod,
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    HorizontalPodAutoscaler,
    // Networking
    Service,
    Ingress,
    NetworkPolicy,
    // Configuration
    ConfigMap,
    Secret,
    // Storage
    PersistentVolume,
    PersistentVolumeClaim,
    // Identity and RBAC
    ServiceAccount,
    Role,
    ClusterRole,
    RoleBinding,
    ClusterRoleBinding,
    // Cluster
    Node,
    Namespace,
}

impl ResourceKind {
    /// Get the kind name as it appears in manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "Pod",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::Job => "Job",
            ResourceKind::CronJob => "CronJob",
            ResourceKind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
            ResourceKind::Service => "Service",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::NetworkPolicy => "NetworkPolicy",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::PersistentVolume => "PersistentVolume",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::Role => "Role",
            ResourceKind::ClusterRole => "ClusterRole",
            ResourceKind::RoleBinding => "RoleBinding",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceKind::Node => "Node",
            ResourceKind::Namespace => "Namespace",
        }
    }

    /// Try to parse a string into a ResourceKind, returning None if unsupported
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all supported kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Pod,
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::Job,
            ResourceKind::CronJob,
            ResourceKind::HorizontalPodAutoscaler,
            ResourceKind::Service,
            ResourceKind::Ingress,
            ResourceKind::NetworkPolicy,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::PersistentVolume,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::ServiceAccount,
            ResourceKind::Role,
            ResourceKind::ClusterRole,
            ResourceKind::RoleBinding,
            ResourceKind::ClusterRoleBinding,
            ResourceKind::Node,
            ResourceKind::Namespace,
        ]
    }

    /// Whether objects of this kind live outside any namespace
    pub fn is_cluster_scoped(&self) -> bool {
        matches!(
            self,
            ResourceKind::PersistentVolume
                | ResourceKind::ClusterRole
                | ResourceKind::ClusterRoleBinding
                | ResourceKind::Node
                | ResourceKind::Namespace
        )
    }

    /// Try to parse a string (case-insensitive, with kubectl short names)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pod" | "pods" | "po" => Some(ResourceKind::Pod),
            "deployment" | "deployments" | "deploy" => Some(ResourceKind::Deployment),
            "replicaset" | "replicasets" | "rs" => Some(ResourceKind::ReplicaSet),
            "statefulset" | "statefulsets" | "sts" => Some(ResourceKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(ResourceKind::DaemonSet),
            "job" | "jobs" => Some(ResourceKind::Job),
            "cronjob" | "cronjobs" | "cj" => Some(ResourceKind::CronJob),
            "horizontalpodautoscaler" | "horizontalpodautoscalers" | "hpa" => {
                Some(ResourceKind::HorizontalPodAutoscaler)
            }
            "service" | "services" | "svc" => Some(ResourceKind::Service),
            "ingress" | "ingresses" | "ing" => Some(ResourceKind::Ingress),
            "networkpolicy" | "networkpolicies" | "netpol" => Some(ResourceKind::NetworkPolicy),
            "configmap" | "configmaps" | "cm" => Some(ResourceKind::ConfigMap),
            "secret" | "secrets" => Some(ResourceKind::Secret),
            "persistentvolume" | "persistentvolumes" | "pv" => {
                Some(ResourceKind::PersistentVolume)
            }
            "persistentvolumeclaim" | "persistentvolumeclaims" | "pvc" => {
                Some(ResourceKind::PersistentVolumeClaim)
            }
            "serviceaccount" | "serviceaccounts" | "sa" => Some(ResourceKind::ServiceAccount),
            "role" | "roles" => Some(ResourceKind::Role),
            "clusterrole" | "clusterroles" => Some(ResourceKind::ClusterRole),
            "rolebinding" | "rolebindings" => Some(ResourceKind::RoleBinding),
            "clusterrolebinding" | "clusterrolebindings" => {
                Some(ResourceKind::ClusterRoleBinding)
            }
            "node" | "nodes" | "no" => Some(ResourceKind::Node),
            "namespace" | "namespaces" | "ns" => Some(ResourceKind::Namespace),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unsupported resource kind: {}", s))
    }
}
