//! Control-plane abstraction for managed database instances.
//!
//! The [`ControlPlane`] trait is the seam between the lifecycle manager and
//! the remote provider. Every method issues exactly one request (or one paged
//! listing) and reports provider rejections as [`ProviderError`].

mod status;
mod types;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use status::InstanceStatus;
pub use types::{
    CreateInstancePayload, DeleteOptions, Endpoint, EngineVersion, InstanceRecord, Tag,
};

/// Error reported by the control plane when it rejects or fails a request.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    /// Provider error code (for example `invalid_arguments`).
    pub code: String,
    /// Human readable message returned by the provider.
    pub message: String,
}

impl ProviderError {
    /// Builds a provider error from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Future returned by control-plane operations.
pub type PlaneFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Request/response operations offered by a managed database control plane.
///
/// Implementations hold no per-call state; every call is keyed by region and,
/// where relevant, by instance identifier.
pub trait ControlPlane {
    /// Submits a provisioning request and returns the accepted descriptor.
    fn create_instance<'a>(
        &'a self,
        region: &'a str,
        payload: &'a CreateInstancePayload,
    ) -> PlaneFuture<'a, InstanceRecord>;

    /// Returns the instances whose identifier matches exactly (zero or one).
    fn find_instances<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, Vec<InstanceRecord>>;

    /// Returns every instance visible to the caller in the region.
    fn list_instances<'a>(&'a self, region: &'a str) -> PlaneFuture<'a, Vec<InstanceRecord>>;

    /// Requests a stopped instance to start.
    fn start_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, InstanceRecord>;

    /// Requests an available instance to stop.
    fn stop_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, InstanceRecord>;

    /// Requests deletion of an instance.
    fn delete_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
        options: &'a DeleteOptions,
    ) -> PlaneFuture<'a, InstanceRecord>;

    /// Lists the default engine versions the provider reports for `engine`.
    fn default_engine_versions<'a>(
        &'a self,
        region: &'a str,
        engine: &'a str,
    ) -> PlaneFuture<'a, Vec<EngineVersion>>;
}
