//! Request and response shapes exchanged with the control plane.

use serde::{Deserialize, Serialize};

use super::InstanceStatus;
use crate::secret::{SecretString, serialize_exposed};

/// Network address assigned to an instance once it is available.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Endpoint {
    /// DNS name or IP address.
    pub host: String,
    /// TCP port the engine listens on.
    pub port: u16,
}

/// Descriptor of one provisioned instance as reported by the provider.
///
/// Credentials are never part of a descriptor.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InstanceRecord {
    /// Identifier, unique per region.
    #[serde(rename = "name")]
    pub identifier: String,
    /// Current lifecycle status.
    pub status: InstanceStatus,
    /// Engine name (for example `postgres`).
    pub engine: String,
    /// Engine version (for example `16.1`).
    pub engine_version: String,
    /// Instance class (for example `db.t3.micro`).
    pub instance_class: String,
    /// Allocated storage in gigabytes.
    pub allocated_storage_gb: u32,
    /// Whether storage is encrypted at rest.
    #[serde(default)]
    pub storage_encrypted: bool,
    /// Whether the endpoint resolves to a public address.
    #[serde(default)]
    pub publicly_accessible: bool,
    /// Automated backup retention in days.
    #[serde(default)]
    pub backup_retention_days: u32,
    /// Endpoint, populated once the instance is available.
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
    /// Availability zone hosting the instance.
    #[serde(default)]
    pub availability_zone: Option<String>,
    /// Creation timestamp as reported by the provider.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Organisational tag applied to provisioned instances.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Builds a tag from a key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Body of a provisioning request.
///
/// The master password is sent to the provider but redacted from `Debug`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreateInstancePayload {
    /// Instance identifier.
    pub name: String,
    /// Name of the initial database.
    pub db_name: String,
    /// Master username.
    pub username: String,
    /// Master password.
    #[serde(serialize_with = "serialize_exposed")]
    pub password: SecretString,
    /// Instance class.
    pub instance_class: String,
    /// Allocated storage in gigabytes.
    pub allocated_storage_gb: u32,
    /// Engine name.
    pub engine: String,
    /// Resolved engine version.
    pub engine_version: String,
    /// Storage type.
    pub storage_type: String,
    /// Whether storage is encrypted at rest.
    pub storage_encrypted: bool,
    /// Whether the endpoint is publicly reachable.
    pub publicly_accessible: bool,
    /// Automated backup retention in days.
    pub backup_retention_days: u32,
    /// Whether minor engine upgrades are applied automatically.
    pub auto_minor_version_upgrade: bool,
    /// Whether performance insights are collected.
    pub performance_insights: bool,
    /// Whether a standby is provisioned in a second zone.
    pub multi_az: bool,
    /// Whether the instance refuses deletion requests.
    pub deletion_protection: bool,
    /// Organisational tags.
    pub tags: Vec<Tag>,
}

/// Engine version entry returned by the provider.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EngineVersion {
    /// Engine name.
    pub name: String,
    /// Version string.
    pub version: String,
    /// Whether the provider uses this version when none is requested.
    #[serde(default)]
    pub is_default: bool,
}

/// Options for a deletion request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeleteOptions {
    /// Skip the final snapshot before deletion.
    pub skip_final_snapshot: bool,
    /// Name of the final snapshot, required by the provider when the
    /// snapshot is not skipped.
    pub final_snapshot_name: Option<String>,
}

impl DeleteOptions {
    /// Deletes without taking a final snapshot.
    #[must_use]
    pub const fn skip_final_snapshot() -> Self {
        Self {
            skip_final_snapshot: true,
            final_snapshot_name: None,
        }
    }

    /// Takes a final snapshot with the given name before deletion.
    #[must_use]
    pub fn with_final_snapshot(name: impl Into<String>) -> Self {
        Self {
            skip_final_snapshot: false,
            final_snapshot_name: Some(name.into()),
        }
    }

    /// Returns the snapshot name to send, if any.
    ///
    /// A name is only sent when the snapshot is requested. When it is
    /// requested without a name nothing is sent and the provider rejects the
    /// request.
    #[must_use]
    pub fn snapshot_name_to_send(&self) -> Option<&str> {
        if self.skip_final_snapshot {
            return None;
        }
        self.final_snapshot_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self::skip_final_snapshot()
    }
}
