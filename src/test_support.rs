//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::control_plane::{
    ControlPlane, CreateInstancePayload, DeleteOptions, Endpoint, EngineVersion, InstanceRecord,
    InstanceStatus, PlaneFuture, ProviderError,
};

/// Port assigned to instances by [`FakeControlPlane`] once available.
pub const FAKE_ENDPOINT_PORT: u16 = 5432;

/// Control-plane operations recorded by [`FakeControlPlane`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FakeOperation {
    /// `create_instance`.
    Create,
    /// `find_instances`.
    Find,
    /// `list_instances`.
    List,
    /// `start_instance`.
    Start,
    /// `stop_instance`.
    Stop,
    /// `delete_instance`.
    Delete,
    /// `default_engine_versions`.
    EngineVersions,
}

/// In-memory control plane that follows the provider's state machine
/// closely enough to drive the manager without network access.
///
/// Created instances start in `creating` and only change status through
/// scripted statuses ([`Self::script_statuses`]) or lifecycle calls. Deleted
/// instances stay visible in `deleting` for a configurable number of lookups
/// before disappearing.
#[derive(Clone, Debug, Default)]
pub struct FakeControlPlane {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Debug)]
struct FakeState {
    instances: BTreeMap<String, InstanceRecord>,
    scripted: BTreeMap<String, VecDeque<InstanceStatus>>,
    pending_removal: BTreeMap<String, u32>,
    deletion_lag: u32,
    engine_versions: BTreeMap<String, Vec<EngineVersion>>,
    failures: BTreeMap<FakeOperation, ProviderError>,
    calls: Vec<(FakeOperation, String)>,
    payloads: Vec<CreateInstancePayload>,
    delete_requests: Vec<(String, DeleteOptions)>,
    regions: Vec<String>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            instances: BTreeMap::new(),
            scripted: BTreeMap::new(),
            pending_removal: BTreeMap::new(),
            deletion_lag: 1,
            engine_versions: BTreeMap::new(),
            failures: BTreeMap::new(),
            calls: Vec::new(),
            payloads: Vec::new(),
            delete_requests: Vec::new(),
            regions: Vec::new(),
        }
    }
}

impl FakeControlPlane {
    /// Creates an empty control plane. Deleted instances disappear after one
    /// further lookup. Equivalent to [`Default::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds an existing instance.
    pub fn insert_instance(&self, record: InstanceRecord) {
        self.lock()
            .instances
            .insert(record.identifier.clone(), record);
    }

    /// Queues statuses applied to the instance on successive lookups. Once
    /// the queue is empty the last status sticks.
    pub fn script_statuses(
        &self,
        identifier: &str,
        statuses: impl IntoIterator<Item = InstanceStatus>,
    ) {
        self.lock()
            .scripted
            .entry(identifier.to_owned())
            .or_default()
            .extend(statuses);
    }

    /// Sets the engine versions reported as defaults for `engine`.
    pub fn set_engine_versions(&self, engine: &str, versions: Vec<EngineVersion>) {
        self.lock()
            .engine_versions
            .insert(engine.to_owned(), versions);
    }

    /// Sets how many lookups still report a deleted instance.
    pub fn set_deletion_lag(&self, lookups: u32) {
        self.lock().deletion_lag = lookups;
    }

    /// Makes every call of `operation` fail with `error`.
    pub fn fail(&self, operation: FakeOperation, error: ProviderError) {
        self.lock().failures.insert(operation, error);
    }

    /// Returns how many times `operation` was called.
    #[must_use]
    pub fn calls(&self, operation: FakeOperation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(recorded, _)| *recorded == operation)
            .count()
    }

    /// Returns every provisioning payload received.
    #[must_use]
    pub fn payloads(&self) -> Vec<CreateInstancePayload> {
        self.lock().payloads.clone()
    }

    /// Returns every deletion request received.
    #[must_use]
    pub fn delete_requests(&self) -> Vec<(String, DeleteOptions)> {
        self.lock().delete_requests.clone()
    }

    /// Returns the regions passed to each call, in order.
    #[must_use]
    pub fn regions(&self) -> Vec<String> {
        self.lock().regions.clone()
    }

    /// Returns the current status of an instance, if present.
    #[must_use]
    pub fn status_of(&self, identifier: &str) -> Option<InstanceStatus> {
        self.lock()
            .instances
            .get(identifier)
            .map(|record| record.status.clone())
    }

    fn begin(
        &self,
        operation: FakeOperation,
        region: &str,
        identifier: &str,
    ) -> Result<MutexGuard<'_, FakeState>, ProviderError> {
        let mut state = self.lock();
        state.calls.push((operation, identifier.to_owned()));
        state.regions.push(region.to_owned());
        if let Some(err) = state.failures.get(&operation) {
            return Err(err.clone());
        }
        Ok(state)
    }

    fn create(
        &self,
        region: &str,
        payload: &CreateInstancePayload,
    ) -> Result<InstanceRecord, ProviderError> {
        let mut state = self.begin(FakeOperation::Create, region, &payload.name)?;
        if state.instances.contains_key(&payload.name) {
            return Err(ProviderError::new(
                "already_exists",
                format!("instance {} already exists", payload.name),
            ));
        }
        let record = InstanceRecord {
            identifier: payload.name.clone(),
            status: InstanceStatus::Creating,
            engine: payload.engine.clone(),
            engine_version: payload.engine_version.clone(),
            instance_class: payload.instance_class.clone(),
            allocated_storage_gb: payload.allocated_storage_gb,
            storage_encrypted: payload.storage_encrypted,
            publicly_accessible: payload.publicly_accessible,
            backup_retention_days: payload.backup_retention_days,
            endpoint: None,
            availability_zone: Some(format!("{region}-1")),
            created_at: None,
        };
        state.payloads.push(payload.clone());
        state
            .instances
            .insert(record.identifier.clone(), record.clone());
        Ok(record)
    }

    fn find(&self, region: &str, identifier: &str) -> Result<Vec<InstanceRecord>, ProviderError> {
        let mut state = self.begin(FakeOperation::Find, region, identifier)?;

        if let Some(remaining) = state.pending_removal.get(identifier).copied() {
            if remaining == 0 {
                state.pending_removal.remove(identifier);
                state.instances.remove(identifier);
                return Ok(Vec::new());
            }
            state
                .pending_removal
                .insert(identifier.to_owned(), remaining - 1);
        }

        let next = state
            .scripted
            .get_mut(identifier)
            .and_then(VecDeque::pop_front);
        let Some(record) = state.instances.get_mut(identifier) else {
            return Ok(Vec::new());
        };
        if let Some(status) = next {
            set_status(record, status);
        }
        Ok(vec![record.clone()])
    }

    fn transition(
        &self,
        operation: FakeOperation,
        region: &str,
        identifier: &str,
    ) -> Result<InstanceRecord, ProviderError> {
        let mut state = self.begin(operation, region, identifier)?;
        let Some(record) = state.instances.get_mut(identifier) else {
            return Err(not_found(identifier));
        };
        let (required, next) = match operation {
            FakeOperation::Start => (InstanceStatus::Stopped, InstanceStatus::Starting),
            _ => (InstanceStatus::Available, InstanceStatus::Stopping),
        };
        if record.status != required {
            return Err(ProviderError::new(
                "invalid_state",
                format!(
                    "instance {identifier} is {} and cannot transition",
                    record.status
                ),
            ));
        }
        set_status(record, next);
        Ok(record.clone())
    }

    fn delete(
        &self,
        region: &str,
        identifier: &str,
        options: &DeleteOptions,
    ) -> Result<InstanceRecord, ProviderError> {
        let mut state = self.begin(FakeOperation::Delete, region, identifier)?;
        state
            .delete_requests
            .push((identifier.to_owned(), options.clone()));
        if !options.skip_final_snapshot && options.snapshot_name_to_send().is_none() {
            return Err(ProviderError::new(
                "invalid_arguments",
                "final snapshot name is required unless the final snapshot is skipped",
            ));
        }
        let lag = state.deletion_lag;
        let Some(record) = state.instances.get_mut(identifier) else {
            return Err(not_found(identifier));
        };
        set_status(record, InstanceStatus::Deleting);
        let accepted = record.clone();
        state.scripted.remove(identifier);
        state.pending_removal.insert(identifier.to_owned(), lag);
        Ok(accepted)
    }
}

fn set_status(record: &mut InstanceRecord, status: InstanceStatus) {
    if status == InstanceStatus::Available && record.endpoint.is_none() {
        record.endpoint = Some(Endpoint {
            host: format!("{}.db.example.internal", record.identifier),
            port: FAKE_ENDPOINT_PORT,
        });
    }
    record.status = status;
}

fn not_found(identifier: &str) -> ProviderError {
    ProviderError::new("not_found", format!("instance {identifier} not found"))
}

/// Builds a descriptor with typical defaults for tests.
#[must_use]
pub fn instance_record(identifier: &str, status: InstanceStatus) -> InstanceRecord {
    let mut record = InstanceRecord {
        identifier: identifier.to_owned(),
        status: InstanceStatus::Creating,
        engine: String::from("postgres"),
        engine_version: String::from("16.1"),
        instance_class: String::from("db.t3.micro"),
        allocated_storage_gb: 20,
        storage_encrypted: true,
        publicly_accessible: true,
        backup_retention_days: 7,
        endpoint: None,
        availability_zone: Some(String::from("fr-par-1")),
        created_at: Some(String::from("2026-01-01T00:00:00Z")),
    };
    set_status(&mut record, status);
    record
}

impl ControlPlane for FakeControlPlane {
    fn create_instance<'a>(
        &'a self,
        region: &'a str,
        payload: &'a CreateInstancePayload,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move { self.create(region, payload) })
    }

    fn find_instances<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, Vec<InstanceRecord>> {
        Box::pin(async move { self.find(region, identifier) })
    }

    fn list_instances<'a>(&'a self, region: &'a str) -> PlaneFuture<'a, Vec<InstanceRecord>> {
        Box::pin(async move {
            let state = self.begin(FakeOperation::List, region, "*")?;
            Ok(state.instances.values().cloned().collect())
        })
    }

    fn start_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move { self.transition(FakeOperation::Start, region, identifier) })
    }

    fn stop_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move { self.transition(FakeOperation::Stop, region, identifier) })
    }

    fn delete_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
        options: &'a DeleteOptions,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move { self.delete(region, identifier, options) })
    }

    fn default_engine_versions<'a>(
        &'a self,
        region: &'a str,
        engine: &'a str,
    ) -> PlaneFuture<'a, Vec<EngineVersion>> {
        Box::pin(async move {
            let state = self.begin(FakeOperation::EngineVersions, region, engine)?;
            Ok(state
                .engine_versions
                .get(engine)
                .cloned()
                .unwrap_or_default())
        })
    }
}
