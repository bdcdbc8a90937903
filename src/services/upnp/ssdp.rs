use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::kernel::device::DeviceError;

pub const SSDP_ADDR_V4: &str = "239.255.255.250:1900";
pub const ST_MEDIA_RENDERER: &str = "urn:schemas-upnp-org:device:MediaRenderer:1";

/// A unicast reply to an M-SEARCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsdpResponse {
    pub usn: String,
    pub st: String,
    pub location: String,
    pub server: Option<String>,
}

pub fn msearch_request(st: &str, mx: u8) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
HOST: {SSDP_ADDR_V4}\r\n\
MAN: \"ssdp:discover\"\r\n\
MX: {mx}\r\n\
ST: {st}\r\n\
\r\n"
    )
}

/// Sends one M-SEARCH from `local_ip` and collects matching replies until `timeout`.
pub async fn msearch(
    local_ip: Ipv4Addr,
    st: &str,
    mx: u8,
    timeout: Duration,
) -> Result<Vec<SsdpResponse>, DeviceError> {
    let socket = bind_udp_on_iface(local_ip)?;
    let req = msearch_request(st, mx);
    tracing::debug!(
        "ssdp m-search st={st} mx={mx} timeout_ms={} local_ip={}",
        timeout.as_millis(),
        local_ip
    );
    socket.send_to(req.as_bytes(), SSDP_ADDR_V4).await?;

    let deadline = Instant::now() + timeout;
    let mut buf = [0u8; 8192];
    let mut responses = Vec::new();
    let mut seen_usn: HashSet<String> = HashSet::new();

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let remaining = (deadline - now).min(Duration::from_millis(250));

        match tokio::time::timeout(remaining, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, from))) => {
                let Some(resp) = parse_response(&buf[..len]) else {
                    continue;
                };
                if !resp.st.eq_ignore_ascii_case(st) {
                    continue;
                }
                if seen_usn.insert(resp.usn.clone()) {
                    tracing::debug!(
                        "ssdp response from={} usn={} location={} server={}",
                        from,
                        resp.usn,
                        resp.location,
                        resp.server.as_deref().unwrap_or("-")
                    );
                    responses.push(resp);
                }
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => continue,
        }
    }

    Ok(responses)
}

fn bind_udp_on_iface(local_ip: Ipv4Addr) -> Result<UdpSocket, DeviceError> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_broadcast(true)?;
    // Not every platform accepts these; discovery still works on the default route.
    let _ = socket.set_multicast_ttl_v4(2);
    let _ = socket.set_multicast_if_v4(&local_ip);
    socket.bind(&SocketAddrV4::new(local_ip, 0).into())?;
    socket.set_nonblocking(true)?;
    let socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(socket)?)
}

/// Parses an `HTTP/1.1 200 OK` search reply. Header names are case-insensitive.
pub fn parse_response(bytes: &[u8]) -> Option<SsdpResponse> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.split("\r\n");
    let status = lines.next()?.trim();
    if !status.starts_with("HTTP/1.1 200") {
        return None;
    }

    let mut usn = None;
    let mut st = None;
    let mut location = None;
    let mut server = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((k, v)) = line.split_once(':') else {
            continue;
        };
        let value = v.trim().to_string();
        match k.trim().to_ascii_lowercase().as_str() {
            "usn" => usn = Some(value),
            "st" => st = Some(value),
            "location" => location = Some(value),
            "server" => server = Some(value),
            _ => {}
        }
    }

    Some(SsdpResponse {
        usn: usn?,
        st: st?,
        location: location?,
        server,
    })
}
