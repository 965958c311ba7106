//! Address ranges that carry no public routing data.

use std::net::{Ipv4Addr, Ipv6Addr};

use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

const RESERVED_V4: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 0, 0, 0), 29),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(192, 88, 99, 0), 24),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(198, 18, 0, 0), 15),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(224, 0, 0, 0), 4),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
];

const RESERVED_V6: &[(Ipv6Addr, u8)] = &[
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1), 128),
    (Ipv6Addr::new(0x0100, 0, 0, 0, 0, 0, 0, 0), 64),
    (Ipv6Addr::new(0x2001, 0, 0, 0, 0, 0, 0, 0), 23),
    (Ipv6Addr::new(0x2001, 0x0db8, 0, 0, 0, 0, 0, 0), 32),
    (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
    (Ipv6Addr::new(0xff00, 0, 0, 0, 0, 0, 0, 0), 8),
];

/// All reserved ranges, IPv4 first.
pub fn reserved_networks() -> impl Iterator<Item = IpNetwork> {
    let v4 = RESERVED_V4.iter().filter_map(|&(addr, prefix)| {
        Ipv4Network::new(addr, prefix).ok().map(IpNetwork::V4)
    });
    let v6 = RESERVED_V6.iter().filter_map(|&(addr, prefix)| {
        Ipv6Network::new(addr, prefix).ok().map(IpNetwork::V6)
    });
    v4.chain(v6)
}

/// Whether `network` lies wholly inside a reserved range.
///
/// ```rust
/// use prefixdb::store::is_reserved;
///
/// assert!(is_reserved("192.168.1.0/24".parse().unwrap()));
/// assert!(!is_reserved("1.1.1.0/24".parse().unwrap()));
/// assert!(!is_reserved("0.0.0.0/0".parse().unwrap()));
/// ```
#[must_use]
pub fn is_reserved(network: IpNetwork) -> bool {
    reserved_networks().any(|reserved| covers(reserved, network))
}

/// Whether `outer` contains every address of `inner`.
pub(crate) fn covers(outer: IpNetwork, inner: IpNetwork) -> bool {
    outer.is_ipv4() == inner.is_ipv4()
        && outer.prefix() <= inner.prefix()
        && outer.contains(inner.network())
}
