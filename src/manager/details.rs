//! Display-oriented views derived from instance descriptors.

use std::fmt;

use crate::control_plane::{Endpoint, InstanceRecord, InstanceStatus};

/// Placeholder substituted with the master username.
pub const USERNAME_PLACEHOLDER: &str = "{username}";
/// Placeholder substituted with the master password.
pub const PASSWORD_PLACEHOLDER: &str = "{password}";
/// Placeholder substituted with the database name.
pub const DBNAME_PLACEHOLDER: &str = "{dbname}";

/// Flattened descriptor returned by `describe`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstanceDetails {
    /// Instance identifier.
    pub identifier: String,
    /// Current status.
    pub status: InstanceStatus,
    /// Engine name and version, for example `postgres 16.1`.
    pub engine: String,
    /// Raw engine name, used to pick the connection scheme.
    pub engine_name: String,
    /// Instance class.
    pub instance_class: String,
    /// Allocated storage, for example `20GB`.
    pub storage: String,
    /// Endpoint, absent until the instance is available.
    pub endpoint: Option<Endpoint>,
    /// Availability zone, when reported.
    pub availability_zone: Option<String>,
    /// Whether the endpoint is publicly reachable.
    pub publicly_accessible: bool,
    /// Automated backup retention in days.
    pub backup_retention_days: u32,
    /// Whether storage is encrypted at rest.
    pub storage_encrypted: bool,
    /// Creation time, when reported.
    pub created_at: Option<String>,
}

impl From<&InstanceRecord> for InstanceDetails {
    fn from(record: &InstanceRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            status: record.status.clone(),
            engine: format!("{} {}", record.engine, record.engine_version),
            engine_name: record.engine.clone(),
            instance_class: record.instance_class.clone(),
            storage: format!("{}GB", record.allocated_storage_gb),
            endpoint: record.endpoint.clone(),
            availability_zone: record.availability_zone.clone(),
            publicly_accessible: record.publicly_accessible,
            backup_retention_days: record.backup_retention_days,
            storage_encrypted: record.storage_encrypted,
            created_at: record.created_at.clone(),
        }
    }
}

/// Simplified entry returned by `list_all`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstanceSummary {
    /// Instance identifier.
    pub identifier: String,
    /// Current status.
    pub status: InstanceStatus,
    /// Engine name and version.
    pub engine: String,
    /// Endpoint host, absent until the instance is available.
    pub endpoint_host: Option<String>,
}

impl From<&InstanceRecord> for InstanceSummary {
    fn from(record: &InstanceRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            status: record.status.clone(),
            engine: format!("{} {}", record.engine, record.engine_version),
            endpoint_host: record.endpoint.as_ref().map(|endpoint| endpoint.host.clone()),
        }
    }
}

/// Connection address with credential placeholders left for the caller.
///
/// The template never contains credentials; [`Self::render`] produces a
/// string that does and must not be logged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionTemplate {
    scheme: String,
    host: String,
    port: u16,
}

impl ConnectionTemplate {
    /// Builds the template for an engine and endpoint.
    #[must_use]
    pub fn new(engine: &str, endpoint: &Endpoint) -> Self {
        Self {
            scheme: scheme_for(engine),
            host: endpoint.host.clone(),
            port: endpoint.port,
        }
    }

    /// Fills in the placeholder positions. Values are inserted verbatim in a
    /// single pass, so text in one value is never substituted again.
    #[must_use]
    pub fn render(&self, username: &str, password: &str, dbname: &str) -> String {
        format!(
            "{}://{username}:{password}@{}:{}/{dbname}",
            self.scheme, self.host, self.port
        )
    }
}

impl fmt::Display for ConnectionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{USERNAME_PLACEHOLDER}:{PASSWORD_PLACEHOLDER}@{}:{}/{DBNAME_PLACEHOLDER}",
            self.scheme, self.host, self.port
        )
    }
}

fn scheme_for(engine: &str) -> String {
    let normalized = engine.trim().to_ascii_lowercase();
    if normalized.starts_with("postgres") {
        return String::from("postgresql");
    }
    if normalized.starts_with("mysql") || normalized.starts_with("mariadb") {
        return String::from("mysql");
    }
    normalized
}
