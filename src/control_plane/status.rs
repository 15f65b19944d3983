//! Instance status as reported by the control plane.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a managed database instance.
///
/// The control plane owns the state machine; this type only names what it
/// reports. Parsing is case-insensitive and accepts the aliases `ready`,
/// `provisioning` and `error`. Unknown statuses are preserved verbatim in
/// [`Self::Other`].
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    /// Provisioning is in progress.
    Creating,
    /// Ready to accept connections.
    Available,
    /// Transitioning from stopped to available.
    Starting,
    /// Transitioning from available to stopped.
    Stopping,
    /// Powered off; storage is retained.
    Stopped,
    /// A configuration change is being applied.
    Modifying,
    /// A backup is in progress.
    BackingUp,
    /// Deletion is in progress.
    Deleting,
    /// The provider gave up on the instance.
    Failed,
    /// Any status not listed above.
    Other(String),
}

impl InstanceStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::Starting => "starting",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Modifying => "modifying",
            Self::BackingUp => "backing-up",
            Self::Deleting => "deleting",
            Self::Failed => "failed",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Returns true when an instance in this status can no longer reach
    /// `available` without outside intervention.
    #[must_use]
    pub fn cannot_become_available(&self) -> bool {
        match self {
            Self::Deleting | Self::Failed => true,
            Self::Other(value) => value == "deleted" || value.starts_with("incompatible-"),
            _ => false,
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(value: &str) -> Self {
        let normalised = value.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "creating" | "provisioning" => Self::Creating,
            "available" | "ready" => Self::Available,
            "starting" => Self::Starting,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "modifying" => Self::Modifying,
            "backing-up" => Self::BackingUp,
            "deleting" => Self::Deleting,
            "failed" | "error" => Self::Failed,
            _ => Self::Other(normalised),
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<InstanceStatus> for String {
    fn from(value: InstanceStatus) -> Self {
        match value {
            InstanceStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
