use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// An IPv4 address bound to a named network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetInterface {
    pub name: String,
    pub addr: Ipv4Addr,
}

impl fmt::Display for NetInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.addr)
    }
}

/// Interfaces usable for SSDP, home LAN ranges first.
pub fn ipv4_interfaces() -> std::io::Result<Vec<NetInterface>> {
    let found = get_if_addrs::get_if_addrs()?
        .into_iter()
        .filter_map(|iface| match iface.ip() {
            IpAddr::V4(addr) => Some(NetInterface {
                name: iface.name,
                addr,
            }),
            IpAddr::V6(_) => None,
        })
        .collect();
    Ok(rank_interfaces(found))
}

/// Drops loopback and link-local addresses, then sorts private RFC1918 ranges ahead of the rest.
pub fn rank_interfaces(mut interfaces: Vec<NetInterface>) -> Vec<NetInterface> {
    interfaces.retain(|i| !i.addr.is_loopback() && !i.addr.is_link_local());
    interfaces.sort_by(|a, b| {
        (private_ipv4_rank(a.addr), a.addr, &a.name).cmp(&(private_ipv4_rank(b.addr), b.addr, &b.name))
    });
    interfaces.dedup();
    interfaces
}

pub fn find_by_name<'a>(interfaces: &'a [NetInterface], name: &str) -> Option<&'a NetInterface> {
    interfaces.iter().find(|i| i.name == name)
}

fn private_ipv4_rank(ip: Ipv4Addr) -> u8 {
    let [a, b, _, _] = ip.octets();
    if a == 192 && b == 168 {
        0
    } else if a == 10 {
        1
    } else if a == 172 && (16..=31).contains(&b) {
        2
    } else {
        3
    }
}
