use async_trait::async_trait;

use super::description::RendererDescription;
use super::soap::{escape_xml, soap_call, soap_text, soap_u16};
use crate::kernel::device::{Device, DeviceError};

const CHANNEL: &str = "Master";

/// RenderingControl client for one described renderer.
#[derive(Clone)]
pub struct UpnpRenderer {
    client: reqwest::Client,
    description: RendererDescription,
}

impl UpnpRenderer {
    pub fn new(client: reqwest::Client, description: RendererDescription) -> Self {
        Self {
            client,
            description,
        }
    }

    pub fn description(&self) -> &RendererDescription {
        &self.description
    }

    /// Sonos zone name, when the device exposes DeviceProperties.
    pub async fn zone_name(&self) -> Result<Option<String>, DeviceError> {
        let Some(props) = &self.description.device_properties else {
            return Ok(None);
        };
        let resp = soap_call(
            &self.client,
            &props.control_url,
            &props.service_type,
            "GetZoneAttributes",
            "",
        )
        .await?;
        Ok(soap_text(&resp, "CurrentZoneName").filter(|name| !name.is_empty()))
    }
}

#[async_trait]
impl Device for UpnpRenderer {
    async fn name(&self) -> Result<String, DeviceError> {
        match self.zone_name().await {
            Ok(Some(name)) => Ok(name),
            Ok(None) => Ok(self.description.friendly_name.clone()),
            Err(e) => {
                tracing::debug!(
                    "zone name lookup failed for {}: {}",
                    self.description.location,
                    e
                );
                Ok(self.description.friendly_name.clone())
            }
        }
    }

    async fn get_volume(&self) -> Result<u16, DeviceError> {
        let rc = &self.description.rendering_control;
        let body = format!(
            "<InstanceID>0</InstanceID><Channel>{}</Channel>",
            escape_xml(CHANNEL)
        );
        let resp = soap_call(&self.client, &rc.control_url, &rc.service_type, "GetVolume", &body).await?;
        soap_u16(&resp, "CurrentVolume")
    }

    async fn set_volume(&self, volume: u16) -> Result<(), DeviceError> {
        let rc = &self.description.rendering_control;
        let body = format!(
            "<InstanceID>0</InstanceID>\
<Channel>{}</Channel>\
<DesiredVolume>{}</DesiredVolume>",
            escape_xml(CHANNEL),
            volume
        );
        soap_call(&self.client, &rc.control_url, &rc.service_type, "SetVolume", &body).await?;
        Ok(())
    }
}
