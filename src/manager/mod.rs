//! Instance lifecycle manager.
//!
//! [`InstanceManager`] translates lifecycle intents into control-plane
//! requests. Mutating operations (create, start, stop, delete) surface
//! provider errors to the caller. Read operations (describe, list, connection
//! template, waits) log provider errors and degrade to an empty, `None`, or
//! unsuccessful result instead.

mod advisory;
mod details;
mod error;
mod request;
mod wait;

use tracing::{error, info, warn};

use crate::control_plane::{ControlPlane, DeleteOptions, InstanceRecord, ProviderError};

pub use advisory::Advisory;
pub use details::{
    ConnectionTemplate, DBNAME_PLACEHOLDER, InstanceDetails, InstanceSummary,
    PASSWORD_PLACEHOLDER, USERNAME_PLACEHOLDER,
};
pub use error::ManagerError;
pub use request::{
    CreateInstanceRequest, CreateInstanceRequestBuilder, DEFAULT_BACKUP_RETENTION_DAYS,
    DEFAULT_ENGINE, DEFAULT_INSTANCE_CLASS, DEFAULT_STORAGE_GB, ProvisioningPolicy,
};
pub use wait::{RetryPolicy, WaitOutcome};

/// Immutable settings shared by every manager call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManagerSettings {
    /// Region every request is keyed by.
    pub region: String,
    /// Engine version used when the provider reports no default.
    pub fallback_engine_version: String,
}

impl ManagerSettings {
    /// Builds settings from a region and fallback engine version.
    pub fn new(region: impl Into<String>, fallback_engine_version: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            fallback_engine_version: fallback_engine_version.into(),
        }
    }
}

/// Issues lifecycle commands against a control plane in one region.
#[derive(Clone, Debug)]
pub struct InstanceManager<P> {
    plane: P,
    settings: ManagerSettings,
}

impl<P: ControlPlane> InstanceManager<P> {
    /// Creates a manager bound to a control plane and settings.
    #[must_use]
    pub fn new(plane: P, settings: ManagerSettings) -> Self {
        info!(region = %settings.region, "instance manager initialised");
        Self { plane, settings }
    }

    /// Returns the configured region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.settings.region
    }

    /// Submits a provisioning request with the standard policy overlay.
    ///
    /// When the request pins no engine version, the provider's default for
    /// the engine is used, falling back to the configured version when the
    /// provider reports none.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Validation`] when the request is incomplete
    /// and [`ManagerError::Provider`] when the version lookup or the
    /// provisioning request is rejected. No retry is attempted.
    pub async fn create(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<InstanceRecord, ManagerError> {
        request.validate()?;
        info!(
            operation = "create",
            identifier = %request.identifier,
            "creating database instance"
        );

        let engine_version = self
            .resolve_engine_version(request)
            .await
            .inspect_err(|err| log_rejection("create", &request.identifier, err))?;
        let payload = request.to_payload(engine_version);

        let record = self
            .plane
            .create_instance(&self.settings.region, &payload)
            .await
            .inspect_err(|err| log_rejection("create", &request.identifier, err))?;

        info!(
            operation = "create",
            identifier = %record.identifier,
            status = %record.status,
            engine_version = %payload.engine_version,
            "instance creation initiated"
        );
        Ok(record)
    }

    async fn resolve_engine_version(
        &self,
        request: &CreateInstanceRequest,
    ) -> Result<String, ProviderError> {
        if let Some(version) = &request.engine_version {
            return Ok(version.clone());
        }

        info!(
            operation = "create",
            engine = %request.engine,
            "no engine version specified, looking up provider default"
        );
        let versions = self
            .plane
            .default_engine_versions(&self.settings.region, &request.engine)
            .await?;

        let resolved = versions
            .iter()
            .find(|version| version.is_default)
            .or_else(|| versions.first())
            .map(|version| version.version.clone());

        if let Some(version) = resolved {
            info!(operation = "create", engine_version = %version, "using default engine version");
            return Ok(version);
        }

        let fallback = self.settings.fallback_engine_version.clone();
        info!(operation = "create", engine_version = %fallback, "using fallback engine version");
        Ok(fallback)
    }

    /// Fetches the instance and flattens it for display.
    ///
    /// Returns `Value(None)` when the provider reports no matching instance
    /// and [`Advisory::Degraded`] when the provider call fails.
    pub async fn describe(&self, identifier: &str) -> Advisory<Option<InstanceDetails>> {
        match self
            .plane
            .find_instances(&self.settings.region, identifier)
            .await
        {
            Ok(records) => {
                let Some(record) = records
                    .iter()
                    .find(|record| record.identifier == identifier)
                else {
                    warn!(operation = "describe", identifier, "instance not found");
                    return Advisory::Value(None);
                };
                info!(operation = "describe", identifier, "retrieved instance details");
                Advisory::Value(Some(InstanceDetails::from(record)))
            }
            Err(err) => {
                log_rejection("describe", identifier, &err);
                Advisory::degraded(err.to_string())
            }
        }
    }

    /// Builds a connection template from the instance endpoint.
    ///
    /// Returns `Value(None)` while no endpoint is assigned or when the
    /// instance does not exist.
    pub async fn connection_template(
        &self,
        identifier: &str,
    ) -> Advisory<Option<ConnectionTemplate>> {
        self.describe(identifier).await.map(|found| {
            let details = found?;
            let Some(endpoint) = details.endpoint.as_ref() else {
                warn!(
                    operation = "connection_template",
                    identifier, "instance endpoint not available yet"
                );
                return None;
            };
            info!(
                operation = "connection_template",
                identifier, "connection string template generated"
            );
            Some(ConnectionTemplate::new(&details.engine_name, endpoint))
        })
    }

    /// Requests the instance to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Provider`] when the provider rejects the
    /// transition, for example because the instance is not available.
    pub async fn stop(&self, identifier: &str) -> Result<InstanceRecord, ManagerError> {
        require_identifier(identifier)?;
        info!(operation = "stop", identifier, "stopping instance");
        let record = self
            .plane
            .stop_instance(&self.settings.region, identifier)
            .await
            .inspect_err(|err| log_rejection("stop", identifier, err))?;
        info!(operation = "stop", identifier, status = %record.status, "instance stop initiated");
        Ok(record)
    }

    /// Requests the instance to start.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Provider`] when the provider rejects the
    /// transition, for example because the instance is not stopped.
    pub async fn start(&self, identifier: &str) -> Result<InstanceRecord, ManagerError> {
        require_identifier(identifier)?;
        info!(operation = "start", identifier, "starting instance");
        let record = self
            .plane
            .start_instance(&self.settings.region, identifier)
            .await
            .inspect_err(|err| log_rejection("start", identifier, err))?;
        info!(operation = "start", identifier, status = %record.status, "instance start initiated");
        Ok(record)
    }

    /// Requests deletion of the instance.
    ///
    /// The final snapshot name is only sent when a snapshot is requested;
    /// requesting one without a name leaves the provider to reject the call.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Provider`] when the provider rejects the
    /// deletion.
    pub async fn delete(
        &self,
        identifier: &str,
        options: &DeleteOptions,
    ) -> Result<InstanceRecord, ManagerError> {
        require_identifier(identifier)?;
        warn!(
            operation = "delete",
            identifier,
            skip_final_snapshot = options.skip_final_snapshot,
            "deleting instance"
        );
        let record = self
            .plane
            .delete_instance(&self.settings.region, identifier, options)
            .await
            .inspect_err(|err| log_rejection("delete", identifier, err))?;
        warn!(operation = "delete", identifier, "instance deletion initiated");
        Ok(record)
    }

    /// Lists every instance visible in the region.
    ///
    /// Returns [`Advisory::Degraded`] (empty through
    /// [`Advisory::unwrap_or_default`]) when the provider call fails.
    pub async fn list_all(&self) -> Advisory<Vec<InstanceSummary>> {
        match self.plane.list_instances(&self.settings.region).await {
            Ok(records) => {
                info!(operation = "list_all", count = records.len(), "listed instances");
                Advisory::Value(records.iter().map(InstanceSummary::from).collect())
            }
            Err(err) => {
                log_rejection("list_all", "*", &err);
                Advisory::degraded(err.to_string())
            }
        }
    }
}

fn require_identifier(identifier: &str) -> Result<(), ManagerError> {
    if identifier.trim().is_empty() {
        return Err(ManagerError::Validation(String::from("identifier")));
    }
    Ok(())
}

fn log_rejection(operation: &str, identifier: &str, err: &ProviderError) {
    error!(
        operation,
        identifier,
        code = %err.code,
        message = %err.message,
        "control plane request failed"
    );
}
