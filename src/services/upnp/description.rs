use roxmltree::{Document, Node};
use url::Url;

use crate::kernel::device::DeviceError;

pub const ST_RENDERING_CONTROL: &str = "urn:schemas-upnp-org:service:RenderingControl:";
pub const ST_DEVICE_PROPERTIES: &str = "urn:schemas-upnp-org:service:DeviceProperties:";

const DEFAULT_FRIENDLY_NAME: &str = "UPnP Renderer";

/// A service's type URN and absolute control URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub service_type: String,
    pub control_url: String,
}

/// What we need from a device description to sample its volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererDescription {
    pub location: String,
    pub friendly_name: String,
    pub rendering_control: ServiceEndpoint,
    /// Sonos-style zone naming; absent on generic renderers.
    pub device_properties: Option<ServiceEndpoint>,
}

pub async fn fetch_description(
    client: &reqwest::Client,
    location: &str,
) -> Result<RendererDescription, DeviceError> {
    let url = Url::parse(location)
        .map_err(|e| DeviceError::Malformed(format!("location {location}: {e}")))?;

    let resp = client.get(url.clone()).send().await?.error_for_status()?;
    let body = resp.text().await?;
    parse_description(&url, &body)
}

/// Parses a root device description. Services of embedded devices count too.
pub fn parse_description(location: &Url, xml: &str) -> Result<RendererDescription, DeviceError> {
    let doc = Document::parse(xml)
        .map_err(|e| DeviceError::Malformed(format!("description at {location}: {e}")))?;

    let base_url = find_text(&doc, &["URLBase"])
        .and_then(|s| Url::parse(s.trim()).ok())
        .unwrap_or_else(|| location.clone());

    let friendly_name = find_text(&doc, &["device", "friendlyName"])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_FRIENDLY_NAME)
        .to_string();

    let mut rendering_control = None;
    let mut device_properties = None;

    for service in find_services(&doc) {
        let Some(service_type) = child_text(service, "serviceType") else {
            continue;
        };
        let Some(control_url) = child_text(service, "controlURL") else {
            continue;
        };
        let Some(control_url) = resolve(&base_url, control_url) else {
            continue;
        };

        let endpoint = ServiceEndpoint {
            service_type: service_type.to_string(),
            control_url,
        };
        if rendering_control.is_none() && service_type.starts_with(ST_RENDERING_CONTROL) {
            rendering_control = Some(endpoint);
        } else if device_properties.is_none() && service_type.starts_with(ST_DEVICE_PROPERTIES) {
            device_properties = Some(endpoint);
        }
    }

    Ok(RendererDescription {
        location: location.to_string(),
        friendly_name,
        rendering_control: rendering_control.ok_or(DeviceError::MissingService("RenderingControl"))?,
        device_properties,
    })
}

fn resolve(base: &Url, raw: &str) -> Option<String> {
    match Url::parse(raw) {
        Ok(abs) => Some(abs.to_string()),
        Err(_) => base.join(raw).ok().map(|u| u.to_string()),
    }
}

fn find_text<'a>(doc: &'a Document<'a>, path: &[&str]) -> Option<&'a str> {
    let mut node = doc.root_element();
    for name in path {
        node = node
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == *name)?;
    }
    node.text()
}

fn find_services<'a>(doc: &'a Document<'a>) -> impl Iterator<Item = Node<'a, 'a>> {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "service")
}

fn child_text<'a>(node: Node<'a, 'a>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
}
