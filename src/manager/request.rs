//! Provisioning request construction and the fixed policy overlay.

use crate::control_plane::{CreateInstancePayload, Tag};
use crate::secret::SecretString;

use super::ManagerError;

/// Instance class requested when none is given.
pub const DEFAULT_INSTANCE_CLASS: &str = "db.t3.micro";
/// Allocated storage requested when none is given.
pub const DEFAULT_STORAGE_GB: u32 = 20;
/// Engine requested when none is given.
pub const DEFAULT_ENGINE: &str = "postgres";
/// Backup retention requested when none is given.
pub const DEFAULT_BACKUP_RETENTION_DAYS: u32 = 7;

/// General-purpose SSD storage.
const STORAGE_TYPE: &str = "gp3";

/// Fixed settings applied to every provisioning request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProvisioningPolicy {
    /// Storage type requested from the provider.
    pub storage_type: &'static str,
    /// Whether minor engine upgrades are applied automatically.
    pub auto_minor_version_upgrade: bool,
    /// Whether performance insights are collected.
    pub performance_insights: bool,
    /// Whether a standby is provisioned in a second zone.
    pub multi_az: bool,
    /// Whether the instance refuses deletion requests.
    pub deletion_protection: bool,
}

impl ProvisioningPolicy {
    /// Policy applied by [`super::InstanceManager::create`].
    pub const STANDARD: Self = Self {
        storage_type: STORAGE_TYPE,
        auto_minor_version_upgrade: true,
        performance_insights: false,
        multi_az: false,
        deletion_protection: false,
    };

    /// Organisational tags attached to every instance.
    #[must_use]
    pub fn tags() -> Vec<Tag> {
        vec![
            Tag::new("Environment", "Development"),
            Tag::new("ManagedBy", env!("CARGO_PKG_NAME")),
            Tag::new("Purpose", "Learning"),
        ]
    }
}

/// Parameters required to provision a new database instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateInstanceRequest {
    /// Instance identifier, unique per region.
    pub identifier: String,
    /// Name of the initial database.
    pub db_name: String,
    /// Master username.
    pub username: String,
    /// Master password. Never logged.
    pub password: SecretString,
    /// Instance class (for example `db.t3.micro`).
    pub instance_class: String,
    /// Allocated storage in gigabytes.
    pub allocated_storage_gb: u32,
    /// Engine name.
    pub engine: String,
    /// Engine version; resolved from the provider's default when absent.
    pub engine_version: Option<String>,
    /// Whether the endpoint is publicly reachable.
    pub publicly_accessible: bool,
    /// Automated backup retention in days.
    pub backup_retention_days: u32,
    /// Whether storage is encrypted at rest.
    pub storage_encrypted: bool,
}

impl CreateInstanceRequest {
    /// Starts a builder for a [`CreateInstanceRequest`].
    #[must_use]
    pub fn builder() -> CreateInstanceRequestBuilder {
        CreateInstanceRequestBuilder::new()
    }

    /// Validates the request, returning the first missing field.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Validation`] when a required string field is
    /// empty, when an explicit engine version is blank, or when the storage
    /// size is zero.
    pub fn validate(&self) -> Result<(), ManagerError> {
        let required = [
            ("identifier", self.identifier.as_str()),
            ("db_name", self.db_name.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.expose().as_str()),
            ("instance_class", self.instance_class.as_str()),
            ("engine", self.engine.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ManagerError::Validation((*field).to_owned()));
        }
        if self
            .engine_version
            .as_deref()
            .is_some_and(|version| version.trim().is_empty())
        {
            return Err(ManagerError::Validation(String::from("engine_version")));
        }
        if self.allocated_storage_gb == 0 {
            return Err(ManagerError::Validation(String::from(
                "allocated_storage_gb",
            )));
        }
        Ok(())
    }

    /// Combines the request with a resolved engine version and the standard
    /// policy overlay.
    #[must_use]
    pub fn to_payload(&self, engine_version: String) -> CreateInstancePayload {
        let policy = ProvisioningPolicy::STANDARD;
        CreateInstancePayload {
            name: self.identifier.clone(),
            db_name: self.db_name.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            instance_class: self.instance_class.clone(),
            allocated_storage_gb: self.allocated_storage_gb,
            engine: self.engine.clone(),
            engine_version,
            storage_type: policy.storage_type.to_owned(),
            storage_encrypted: self.storage_encrypted,
            publicly_accessible: self.publicly_accessible,
            backup_retention_days: self.backup_retention_days,
            auto_minor_version_upgrade: policy.auto_minor_version_upgrade,
            performance_insights: policy.performance_insights,
            multi_az: policy.multi_az,
            deletion_protection: policy.deletion_protection,
            tags: ProvisioningPolicy::tags(),
        }
    }
}

/// Builder for [`CreateInstanceRequest`] that trims inputs and validates on
/// build.
#[derive(Clone, Debug)]
pub struct CreateInstanceRequestBuilder {
    identifier: String,
    db_name: String,
    username: String,
    password: SecretString,
    instance_class: String,
    allocated_storage_gb: u32,
    engine: String,
    engine_version: Option<String>,
    publicly_accessible: bool,
    backup_retention_days: u32,
    storage_encrypted: bool,
}

impl Default for CreateInstanceRequestBuilder {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            db_name: String::new(),
            username: String::new(),
            password: SecretString::new(String::new()),
            instance_class: DEFAULT_INSTANCE_CLASS.to_owned(),
            allocated_storage_gb: DEFAULT_STORAGE_GB,
            engine: DEFAULT_ENGINE.to_owned(),
            engine_version: None,
            publicly_accessible: true,
            backup_retention_days: DEFAULT_BACKUP_RETENTION_DAYS,
            storage_encrypted: true,
        }
    }
}

impl CreateInstanceRequestBuilder {
    /// Creates a builder populated with the default class, storage, engine,
    /// and retention.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance identifier.
    #[must_use]
    pub fn identifier(mut self, value: impl Into<String>) -> Self {
        self.identifier = value.into();
        self
    }

    /// Sets the initial database name.
    #[must_use]
    pub fn db_name(mut self, value: impl Into<String>) -> Self {
        self.db_name = value.into();
        self
    }

    /// Sets the master username.
    #[must_use]
    pub fn username(mut self, value: impl Into<String>) -> Self {
        self.username = value.into();
        self
    }

    /// Sets the master password.
    #[must_use]
    pub fn password(mut self, value: SecretString) -> Self {
        self.password = value;
        self
    }

    /// Sets the instance class.
    #[must_use]
    pub fn instance_class(mut self, value: impl Into<String>) -> Self {
        self.instance_class = value.into();
        self
    }

    /// Sets the allocated storage in gigabytes.
    #[must_use]
    pub const fn allocated_storage_gb(mut self, value: u32) -> Self {
        self.allocated_storage_gb = value;
        self
    }

    /// Sets the engine name.
    #[must_use]
    pub fn engine(mut self, value: impl Into<String>) -> Self {
        self.engine = value.into();
        self
    }

    /// Pins the engine version instead of using the provider default.
    #[must_use]
    pub fn engine_version(mut self, value: Option<String>) -> Self {
        self.engine_version = value;
        self
    }

    /// Sets whether the endpoint is publicly reachable.
    #[must_use]
    pub const fn publicly_accessible(mut self, value: bool) -> Self {
        self.publicly_accessible = value;
        self
    }

    /// Sets the backup retention in days.
    #[must_use]
    pub const fn backup_retention_days(mut self, value: u32) -> Self {
        self.backup_retention_days = value;
        self
    }

    /// Sets whether storage is encrypted at rest.
    #[must_use]
    pub const fn storage_encrypted(mut self, value: bool) -> Self {
        self.storage_encrypted = value;
        self
    }

    /// Builds and validates the request, trimming string inputs. The
    /// password is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Validation`] when a required field is empty.
    pub fn build(self) -> Result<CreateInstanceRequest, ManagerError> {
        let request = CreateInstanceRequest {
            identifier: self.identifier.trim().to_owned(),
            db_name: self.db_name.trim().to_owned(),
            username: self.username.trim().to_owned(),
            password: self.password,
            instance_class: self.instance_class.trim().to_owned(),
            allocated_storage_gb: self.allocated_storage_gb,
            engine: self.engine.trim().to_owned(),
            engine_version: self.engine_version.map(|value| value.trim().to_owned()),
            publicly_accessible: self.publicly_accessible,
            backup_retention_days: self.backup_retention_days,
            storage_encrypted: self.storage_encrypted,
        };
        request.validate()?;
        Ok(request)
    }
}
