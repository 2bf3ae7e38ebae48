//! # Target Enumeration
//!
//! Expands CIDR text such as `192.168.1.0/24` or `fd00::/120` into the
//! ordered list of host addresses a scan should visit.
//!
//! IPv4 blocks are expanded through [`cidr_range`] into an inclusive
//! [`Ipv4Range`]. IPv6 blocks are walked from the masked base address
//! upwards, one big-endian increment at a time, for as long as the block
//! still contains the address. Blocks with more than two addresses lose their first
//! (network) and last (broadcast) entries; `/31`, `/32` and their IPv6
//! equivalents are returned whole.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use pnet::ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

use crate::error::RangeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self { start_addr, end_addr }
    }

    /// Every address from `start_addr` to `end_addr`, both inclusive.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = IpAddr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }

    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        u64::from(end.saturating_sub(start)) + u64::from(start <= end)
    }

    pub fn is_empty(&self) -> bool {
        self.start_addr > self.end_addr
    }
}

/// Network-to-broadcast range of the block `ip/prefix`.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, RangeError> {
    let network: Ipv4Network =
        Ipv4Network::new(ip, prefix).map_err(|e| RangeError::invalid(&format!("{ip}/{prefix}"), e))?;
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

/// Largest block [`enumerate`] will expand (a `/12` in IPv4 terms).
pub const MAX_TARGETS: u128 = 1 << 20;

/// Parses `cidr` and returns every usable host address in ascending order.
///
/// A bare address without a prefix length is rejected, as is any block
/// larger than [`MAX_TARGETS`].
pub fn enumerate(cidr: &str) -> Result<Vec<IpAddr>, RangeError> {
    let text: &str = cidr.trim();
    if !text.contains('/') {
        return Err(RangeError::invalid(text, "missing prefix length"));
    }

    let network: IpNetwork = IpNetwork::from_str(text).map_err(|e| RangeError::invalid(text, e))?;

    let size: u128 = block_size(&network);
    if size > MAX_TARGETS {
        return Err(RangeError::TooLarge {
            cidr: text.to_string(),
            size,
            limit: MAX_TARGETS,
        });
    }

    let mut ips: Vec<IpAddr> = match network {
        IpNetwork::V4(net) => cidr_range(net.ip(), net.prefix())?.iter().collect(),
        IpNetwork::V6(net) => walk_v6(net),
    };

    if ips.len() > 2 {
        ips.pop();
        ips.remove(0);
    }

    Ok(ips)
}

/// Adds one to a big-endian byte sequence, carrying into higher bytes.
///
/// Returns `false` when the carry runs off the most significant byte, in
/// which case every byte has wrapped to zero.
pub fn increment(octets: &mut [u8]) -> bool {
    for byte in octets.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            return true;
        }
    }
    false
}

/// Canonical numeric ordering key of an address.
///
/// IPv4 addresses map to their `u32` value and IPv6 addresses to their
/// `u128` value, both read big-endian.
pub fn sort_key(addr: &IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(*v4)),
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

fn block_size(network: &IpNetwork) -> u128 {
    let total_bits: u32 = match network {
        IpNetwork::V4(_) => 32,
        IpNetwork::V6(_) => 128,
    };
    let host_bits: u32 = total_bits - u32::from(network.prefix());
    1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
}

fn walk_v6(net: Ipv6Network) -> Vec<IpAddr> {
    let mut octets: [u8; 16] = net.network().octets();
    let mut ips: Vec<IpAddr> = Vec::new();
    while net.contains(Ipv6Addr::from(octets)) {
        ips.push(IpAddr::V6(Ipv6Addr::from(octets)));
        if !increment(&mut octets) {
            break;
        }
    }
    ips
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn test_enumerate_slash_30_strips_network_and_broadcast() {
        let ips = enumerate("10.0.0.0/30").unwrap();
        assert_eq!(ips, vec![v4(10, 0, 0, 1), v4(10, 0, 0, 2)]);
    }

    #[test]
    fn test_enumerate_slash_24() {
        let ips = enumerate("192.168.1.0/24").unwrap();
        assert_eq!(ips.len(), 254);
        assert_eq!(ips.first(), Some(&v4(192, 168, 1, 1)));
        assert_eq!(ips.last(), Some(&v4(192, 168, 1, 254)));
    }

    #[test]
    fn test_enumerate_masks_host_bits() {
        let ips = enumerate("192.168.1.77/29").unwrap();
        assert_eq!(ips.first(), Some(&v4(192, 168, 1, 73)));
        assert_eq!(ips.last(), Some(&v4(192, 168, 1, 78)));
        assert_eq!(ips.len(), 6);
    }

    #[test]
    fn test_enumerate_slash_32_keeps_single_address() {
        let ips = enumerate("172.16.0.1/32").unwrap();
        assert_eq!(ips, vec![v4(172, 16, 0, 1)]);
    }

    #[test]
    fn test_enumerate_slash_31_keeps_both_addresses() {
        let ips = enumerate("10.0.0.4/31").unwrap();
        assert_eq!(ips, vec![v4(10, 0, 0, 4), v4(10, 0, 0, 5)]);
    }

    #[test]
    fn test_enumerate_top_of_address_space_terminates() {
        let ips = enumerate("255.255.255.252/30").unwrap();
        assert_eq!(ips, vec![v4(255, 255, 255, 253), v4(255, 255, 255, 254)]);

        let ips = enumerate("255.255.255.255/32").unwrap();
        assert_eq!(ips, vec![v4(255, 255, 255, 255)]);
    }

    #[test]
    fn test_enumerate_crosses_octet_boundary() {
        let ips = enumerate("10.0.0.0/23").unwrap();
        assert_eq!(ips.len(), 510);
        assert!(ips.contains(&v4(10, 0, 0, 255)));
        assert!(ips.contains(&v4(10, 0, 1, 0)));
    }

    #[test]
    fn test_enumerate_is_strictly_ascending() {
        let ips = enumerate("10.1.0.0/22").unwrap();
        assert!(ips.windows(2).all(|w| sort_key(&w[0]) < sort_key(&w[1])));
    }

    #[test]
    fn test_enumerate_ipv6() {
        let ips = enumerate("fd00::/126").unwrap();
        let expected: Vec<IpAddr> = vec!["fd00::1".parse().unwrap(), "fd00::2".parse().unwrap()];
        assert_eq!(ips, expected);

        let ips = enumerate("fd00::10/128").unwrap();
        assert_eq!(ips, vec!["fd00::10".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn test_enumerate_trims_whitespace() {
        assert_eq!(enumerate("  10.0.0.0/30\n").unwrap().len(), 2);
    }

    #[test]
    fn test_enumerate_invalid_input() {
        for input in ["", "not-a-cidr", "10.0.0.1", "10.0.0.0/33", "10.0.0.256/24", "fd00::/129"] {
            assert!(
                matches!(enumerate(input), Err(RangeError::InvalidRange { .. })),
                "expected InvalidRange for {input:?}"
            );
        }
    }

    #[test]
    fn test_enumerate_rejects_huge_blocks() {
        let err = enumerate("fd00::/64").unwrap_err();
        assert!(matches!(err, RangeError::TooLarge { size, .. } if size == 1u128 << 64));

        assert!(matches!(enumerate("10.0.0.0/11"), Err(RangeError::TooLarge { .. })));
        assert_eq!(enumerate("10.0.0.0/16").unwrap().len(), 65_534);
    }

    #[test]
    fn test_cidr_range_bounds() {
        let range = cidr_range(Ipv4Addr::new(192, 168, 1, 77), 29).unwrap();
        assert_eq!(range.start_addr, Ipv4Addr::new(192, 168, 1, 72));
        assert_eq!(range.end_addr, Ipv4Addr::new(192, 168, 1, 79));
        assert_eq!(range.len(), 8);

        let range = cidr_range(Ipv4Addr::new(0, 0, 0, 0), 0).unwrap();
        assert_eq!(range.end_addr, Ipv4Addr::BROADCAST);
        assert_eq!(range.len(), 1 << 32);

        assert!(matches!(
            cidr_range(Ipv4Addr::new(10, 0, 0, 0), 33),
            Err(RangeError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_ipv4_range_iter_is_inclusive_and_double_ended() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 254), Ipv4Addr::new(10, 0, 1, 1));
        let forward: Vec<IpAddr> = range.iter().collect();
        assert_eq!(forward, vec![v4(10, 0, 0, 254), v4(10, 0, 0, 255), v4(10, 0, 1, 0), v4(10, 0, 1, 1)]);

        let mut iter = range.iter();
        assert_eq!(iter.next_back(), Some(v4(10, 0, 1, 1)));
        assert_eq!(iter.next(), Some(v4(10, 0, 0, 254)));
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn test_ipv4_range_reversed_is_empty() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 1));
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn test_increment_carries() {
        let mut octets = [10, 0, 0, 255];
        assert!(increment(&mut octets));
        assert_eq!(octets, [10, 0, 1, 0]);

        let mut octets = [255, 255];
        assert!(!increment(&mut octets));
        assert_eq!(octets, [0, 0]);
    }

    #[test]
    fn test_sort_key_is_big_endian() {
        assert!(sort_key(&v4(10, 0, 0, 2)) < sort_key(&v4(10, 0, 0, 10)));
        assert!(sort_key(&v4(9, 255, 255, 255)) < sort_key(&v4(10, 0, 0, 0)));
        assert_eq!(sort_key(&v4(0, 0, 1, 0)), 256);
    }
}
