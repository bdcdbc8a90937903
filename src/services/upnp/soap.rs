use roxmltree::Document;

use crate::kernel::device::DeviceError;

const MAX_ERROR_BODY: usize = 600;

/// POSTs a SOAP action and returns the raw response body.
pub async fn soap_call(
    client: &reqwest::Client,
    control_url: &str,
    service: &str,
    action: &str,
    inner_xml: &str,
) -> Result<String, DeviceError> {
    let envelope = envelope(service, action, inner_xml);
    tracing::debug!("soap {}#{} -> {}", service, action, control_url);

    let resp = client
        .post(control_url)
        .header("SOAPACTION", format!("\"{}#{}\"", service, action))
        .header("CONTENT-TYPE", "text/xml; charset=\"utf-8\"")
        .body(envelope)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(DeviceError::Soap {
            action: action.to_string(),
            status: status.as_u16(),
            fault: soap_text(&text, "errorCode"),
            body: truncate(&text, MAX_ERROR_BODY),
        });
    }
    Ok(resp.text().await?)
}

pub fn envelope(service: &str, action: &str, inner_xml: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">\
<s:Body>\
<u:{action} xmlns:u=\"{service}\">{inner_xml}</u:{action}>\
</s:Body>\
</s:Envelope>"
    )
}

/// Trimmed text of the first element named `tag_local_name`, ignoring namespaces.
pub fn soap_text(xml: &str, tag_local_name: &str) -> Option<String> {
    let doc = Document::parse(xml).ok()?;
    let node = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == tag_local_name)?;
    Some(node.text()?.trim().to_string())
}

pub fn soap_u16(xml: &str, tag_local_name: &str) -> Result<u16, DeviceError> {
    let text = soap_text(xml, tag_local_name)
        .ok_or_else(|| DeviceError::Malformed(format!("missing <{tag_local_name}>")))?;
    text.parse::<u16>()
        .map_err(|e| DeviceError::Malformed(format!("<{tag_local_name}>{text}</{tag_local_name}>: {e}")))
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = s[..end].to_string();
    out.push_str("...");
    out
}
