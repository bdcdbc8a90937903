use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::description::{fetch_description, RendererDescription};
use super::interfaces::NetInterface;
use super::renderer::UpnpRenderer;
use super::ssdp::{msearch, SsdpResponse};
use crate::kernel::device::{Device, DeviceDirectory, DeviceError, DeviceListing};

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub interface: NetInterface,
    pub search_target: String,
    pub timeout: Duration,
    pub request_timeout: Duration,
}

/// Renderers found by one SSDP search, named and sorted.
pub struct UpnpDirectory {
    client: reqwest::Client,
    entries: Vec<DeviceListing<RendererDescription>>,
}

impl UpnpDirectory {
    pub async fn discover(config: &DiscoveryConfig) -> Result<Self, DeviceError> {
        // Renderers live on the LAN; never route them through an HTTP proxy.
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .no_proxy()
            .build()?;

        // MX must stay below the listen window or late replies are lost.
        let mx = (config.timeout.as_secs().saturating_sub(1)).clamp(1, 5) as u8;
        let responses = msearch(
            config.interface.addr,
            &config.search_target,
            mx,
            config.timeout,
        )
        .await?;
        info!(
            "SSDP search on {} returned {} responses",
            config.interface,
            responses.len()
        );

        Ok(Self::describe_all(client, responses).await)
    }

    /// Describes and names each distinct location. Failed describes are dropped.
    pub async fn describe_all(client: reqwest::Client, responses: Vec<SsdpResponse>) -> Self {
        // Embedded devices of one box answer separately but share a description.
        let mut seen_locations = HashSet::new();
        let mut join = JoinSet::new();
        for resp in responses {
            if !seen_locations.insert(resp.location.clone()) {
                continue;
            }
            let client = client.clone();
            join.spawn(async move {
                let description = fetch_description(&client, &resp.location).await?;
                let renderer = UpnpRenderer::new(client, description);
                let name = renderer.name().await?;
                Ok::<_, DeviceError>(DeviceListing {
                    name,
                    handle: renderer.description().clone(),
                })
            });
        }

        let mut entries = Vec::new();
        while let Some(res) = join.join_next().await {
            match res {
                Ok(Ok(entry)) => entries.push(entry),
                Ok(Err(e)) => debug!("describe failed: {}", e),
                Err(e) => debug!("describe task join error: {}", e),
            }
        }
        entries.sort_by_key(|e| e.name.to_lowercase());

        Self { client, entries }
    }
}

#[async_trait]
impl DeviceDirectory for UpnpDirectory {
    type Handle = RendererDescription;
    type Device = UpnpRenderer;

    async fn list(&self) -> Result<Vec<DeviceListing<Self::Handle>>, DeviceError> {
        Ok(self.entries.clone())
    }

    async fn connect(&self, handle: &Self::Handle) -> Result<Self::Device, DeviceError> {
        Ok(UpnpRenderer::new(self.client.clone(), handle.clone()))
    }
}
