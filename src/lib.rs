//! Lifecycle management for managed relational database instances.
//!
//! The crate exposes a control-plane abstraction for a managed database
//! service, an HTTP implementation of it, and an [`InstanceManager`] that
//! drives the instance lifecycle (create → wait for availability → describe →
//! stop/start → delete) with bounded polling and structured logging.

pub mod config;
pub mod control_plane;
pub mod manager;
pub mod rdb;
pub mod secret;
pub mod test_support;

pub use config::{ConfigError, RdbConfig};
pub use control_plane::{
    ControlPlane, CreateInstancePayload, DeleteOptions, Endpoint, EngineVersion, InstanceRecord,
    InstanceStatus, ProviderError,
};
pub use manager::{
    Advisory, ConnectionTemplate, CreateInstanceRequest, CreateInstanceRequestBuilder,
    InstanceDetails, InstanceManager, InstanceSummary, ManagerError, ManagerSettings, RetryPolicy,
    WaitOutcome,
};
pub use rdb::RdbClient;
pub use secret::{Secret, SecretString};
