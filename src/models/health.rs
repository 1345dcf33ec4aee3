//! Health verdicts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Error,
    /// The status block needed for evaluation was absent
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Error => "error",
            HealthStatus::Unknown => "unknown",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            HealthStatus::Healthy,
            HealthStatus::Warning,
            HealthStatus::Error,
            HealthStatus::Unknown,
        ]
    }

    /// Rank on the `Healthy < Warning < Error` scale. `Unknown` ranks lowest
    /// so any triggered rule replaces it.
    fn severity(&self) -> u8 {
        match self {
            HealthStatus::Unknown => 0,
            HealthStatus::Healthy => 1,
            HealthStatus::Warning => 2,
            HealthStatus::Error => 3,
        }
    }

    /// The more severe of `self` and `other`
    pub fn max(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "healthy" => Ok(HealthStatus::Healthy),
            "warning" => Ok(HealthStatus::Warning),
            "error" => Ok(HealthStatus::Error),
            "unknown" => Ok(HealthStatus::Unknown),
            _ => Err(format!("Unknown health status: {}", s)),
        }
    }
}

/// Health status plus the issues that produced it, in rule evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthVerdict {
    pub status: HealthStatus,
    pub issues: Vec<String>,
}

impl HealthVerdict {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            issues: Vec::new(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            status: HealthStatus::Unknown,
            issues: Vec::new(),
        }
    }

    /// Record a triggered rule, escalating the status if needed
    pub fn raise(&mut self, status: HealthStatus, issue: impl Into<String>) {
        self.status = self.status.max(status);
        self.issues.push(issue.into());
    }
}
