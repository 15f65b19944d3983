//! Response envelopes returned by the managed database API.

use serde::Deserialize;

use crate::control_plane::{EngineVersion, InstanceRecord};

#[derive(Debug, Deserialize)]
pub(super) struct InstanceList {
    #[serde(default)]
    pub(super) instances: Vec<InstanceRecord>,
    #[serde(default)]
    pub(super) total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EngineList {
    #[serde(default)]
    pub(super) engines: Vec<EngineVersion>,
}
