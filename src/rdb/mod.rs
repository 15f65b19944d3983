//! HTTP implementation of the control plane.
//!
//! [`RdbClient`] speaks this crate's own JSON contract, not any vendor's
//! native API: a provider is reached through a gateway that exposes these
//! routes under the configured `api_url`.
//!
//! | operation | route |
//! |-----------|-------|
//! | create | `POST /regions/{region}/instances` |
//! | find | `GET /regions/{region}/instances?name={identifier}` |
//! | list | `GET /regions/{region}/instances?page={n}&page_size=100` |
//! | start, stop | `POST /regions/{region}/instances/{identifier}/start` (or `/stop`) |
//! | delete | `DELETE /regions/{region}/instances/{identifier}?skip_final_snapshot=..` |
//! | engine defaults | `GET /regions/{region}/database-engines?name={engine}&default_only=true` |
//!
//! Bodies use the field names of [`CreateInstancePayload`] and
//! [`InstanceRecord`]. Path parameters are sent as single percent-encoded
//! segments. Requests carry the `X-Auth-Token` header and non-success
//! responses are decoded into [`ProviderError`].

mod error;
mod wire;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ConfigError, RdbConfig};
use crate::control_plane::{
    ControlPlane, CreateInstancePayload, DeleteOptions, EngineVersion, InstanceRecord,
    PlaneFuture, ProviderError,
};
use crate::secret::SecretString;
use wire::{EngineList, InstanceList};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const AUTH_HEADER: &str = "X-Auth-Token";
const PAGE_SIZE: u32 = 100;

/// Control-plane client backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct RdbClient {
    http: Client,
    base_url: Url,
    secret_key: SecretString,
}

impl RdbClient {
    /// Constructs a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn new(config: &RdbConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_url = config.api_base_url()?;
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Ok(Self {
            http,
            base_url,
            secret_key: config.secret_key(),
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one so an
    /// identifier can never introduce extra path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ProviderError::new(
                    error::INVALID_URL_CODE,
                    format!("{} cannot carry path segments", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn instances_url(&self, region: &str) -> Result<Url, ProviderError> {
        self.url(&["regions", region, "instances"])
    }

    fn instance_url(
        &self,
        region: &str,
        identifier: &str,
        action: Option<&str>,
    ) -> Result<Url, ProviderError> {
        match action {
            Some(verb) => self.url(&["regions", region, "instances", identifier, verb]),
            None => self.url(&["regions", region, "instances", identifier]),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request
            .header(AUTH_HEADER, self.secret_key.expose().as_str())
            .send()
            .await
            .map_err(|err| ProviderError::new(error::TRANSPORT_CODE, err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| ProviderError::new(error::DECODE_CODE, err.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(error::from_response(status.as_u16(), &body))
    }

    async fn list_page(
        &self,
        region: &str,
        page: u32,
    ) -> Result<InstanceList, ProviderError> {
        debug!(region, page, "listing instances");
        self.send(
            self.http
                .get(self.instances_url(region)?)
                .query(&[("page", page), ("page_size", PAGE_SIZE)]),
        )
        .await
    }
}

impl ControlPlane for RdbClient {
    fn create_instance<'a>(
        &'a self,
        region: &'a str,
        payload: &'a CreateInstancePayload,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move {
            debug!(region, identifier = %payload.name, "POST instance");
            self.send(self.http.post(self.instances_url(region)?).json(payload))
                .await
        })
    }

    fn find_instances<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, Vec<InstanceRecord>> {
        Box::pin(async move {
            debug!(region, identifier, "GET instance by name");
            let list: InstanceList = self
                .send(
                    self.http
                        .get(self.instances_url(region)?)
                        .query(&[("name", identifier)]),
                )
                .await?;
            Ok(list
                .instances
                .into_iter()
                .filter(|record| record.identifier == identifier)
                .collect())
        })
    }

    fn list_instances<'a>(&'a self, region: &'a str) -> PlaneFuture<'a, Vec<InstanceRecord>> {
        Box::pin(async move {
            let mut collected = Vec::new();
            let mut page = 1;
            loop {
                let list = self.list_page(region, page).await?;
                let fetched = list.instances.len();
                collected.extend(list.instances);

                let short_page = u32::try_from(fetched).is_ok_and(|count| count < PAGE_SIZE);
                let reached_total = list.total_count.is_some_and(|total| {
                    collected.len() >= usize::try_from(total).unwrap_or(usize::MAX)
                });
                if short_page || reached_total {
                    return Ok(collected);
                }
                page += 1;
            }
        })
    }

    fn start_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move {
            debug!(region, identifier, "POST start");
            let url = self.instance_url(region, identifier, Some("start"))?;
            self.send(self.http.post(url)).await
        })
    }

    fn stop_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move {
            debug!(region, identifier, "POST stop");
            let url = self.instance_url(region, identifier, Some("stop"))?;
            self.send(self.http.post(url)).await
        })
    }

    fn delete_instance<'a>(
        &'a self,
        region: &'a str,
        identifier: &'a str,
        options: &'a DeleteOptions,
    ) -> PlaneFuture<'a, InstanceRecord> {
        Box::pin(async move {
            debug!(region, identifier, "DELETE instance");
            let mut request = self
                .http
                .delete(self.instance_url(region, identifier, None)?)
                .query(&[("skip_final_snapshot", options.skip_final_snapshot)]);
            if let Some(name) = options.snapshot_name_to_send() {
                request = request.query(&[("final_snapshot_name", name)]);
            }
            self.send(request).await
        })
    }

    fn default_engine_versions<'a>(
        &'a self,
        region: &'a str,
        engine: &'a str,
    ) -> PlaneFuture<'a, Vec<EngineVersion>> {
        Box::pin(async move {
            debug!(region, engine, "GET default engine versions");
            let url = self.url(&["regions", region, "database-engines"])?;
            let list: EngineList = self
                .send(
                    self.http
                        .get(url)
                        .query(&[("name", engine), ("default_only", "true")]),
                )
                .await?;
            Ok(list.engines)
        })
    }
}
