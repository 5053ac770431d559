//! The 16-byte canonical address form.
//!
//! The routing engine stores every address in 16 bytes. IPv6 addresses are
//! kept as-is; IPv4 addresses are carried as IPv4-mapped IPv6
//! (`::ffff:a.b.c.d`), and their prefix lengths are offset by 96 so that they
//! stay relative to the 128-bit form.

use crate::ip::{IpAddress, IpPrefix, Ipv4Address, Ipv6Address};
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// The upper 96 bits of every IPv4-mapped IPv6 address.
pub const V4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

/// Prefix-length offset of an IPv4 prefix inside the canonical form.
pub const V4_MAPPED_PREFIX_LEN: u8 = 96;

/// A 16-byte canonical address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalAddress([u8; 16]);

impl CanonicalAddress {
    pub const UNSPECIFIED: Self = CanonicalAddress([0; 16]);

    pub const fn new(octets: [u8; 16]) -> Self {
        CanonicalAddress(octets)
    }

    /// Builds the IPv4-mapped form of `addr`.
    pub const fn from_ipv4(addr: Ipv4Address) -> Self {
        let v4 = addr.octets();
        CanonicalAddress([
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, v4[0], v4[1], v4[2], v4[3],
        ])
    }

    pub const fn from_ipv6(addr: Ipv6Address) -> Self {
        CanonicalAddress(addr.octets())
    }

    pub const fn octets(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns true if the upper 96 bits hold the IPv4-mapped prefix.
    pub fn is_v4mapped(&self) -> bool {
        self.0[..12] == V4_MAPPED_PREFIX
    }

    /// The low 32 bits as an IPv4 address.
    ///
    /// No check is made that the address is actually mapped.
    pub fn to_ipv4(&self) -> Ipv4Address {
        Ipv4Address::from([self.0[12], self.0[13], self.0[14], self.0[15]])
    }

    /// All 128 bits as an IPv6 address.
    pub fn to_ipv6(&self) -> Ipv6Address {
        Ipv6Address::from(self.0)
    }

    /// Converts to the native family: mapped addresses become IPv4.
    pub fn to_ip(&self) -> IpAddress {
        if self.is_v4mapped() {
            IpAddress::V4(self.to_ipv4())
        } else {
            IpAddress::V6(self.to_ipv6())
        }
    }
}

impl From<IpAddress> for CanonicalAddress {
    fn from(addr: IpAddress) -> Self {
        match addr {
            IpAddress::V4(v4) => CanonicalAddress::from_ipv4(v4),
            IpAddress::V6(v6) => CanonicalAddress::from_ipv6(v6),
        }
    }
}

impl From<IpAddr> for CanonicalAddress {
    fn from(addr: IpAddr) -> Self {
        CanonicalAddress::from(IpAddress::from(addr))
    }
}

impl From<[u8; 16]> for CanonicalAddress {
    fn from(octets: [u8; 16]) -> Self {
        CanonicalAddress(octets)
    }
}

impl From<IpAddress> for IpAddr {
    fn from(addr: IpAddress) -> Self {
        match addr {
            IpAddress::V4(v4) => IpAddr::V4(v4.into()),
            IpAddress::V6(v6) => IpAddr::V6(v6.into()),
        }
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => IpAddress::from(v4),
            IpAddr::V6(v6) => IpAddress::from(v6),
        }
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_ip().fmt(f)
    }
}

impl FromStr for CanonicalAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddress>().map(CanonicalAddress::from)
    }
}

impl TryFrom<String> for CanonicalAddress {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CanonicalAddress> for String {
    fn from(addr: CanonicalAddress) -> String {
        addr.to_string()
    }
}

/// Lifts a native prefix into canonical form.
///
/// IPv4 prefix lengths gain the 96-bit mapped offset; IPv6 lengths are kept.
pub fn canonical_prefix(prefix: &IpPrefix) -> (CanonicalAddress, u8) {
    let address = CanonicalAddress::from(*prefix.address());
    let prefix_len = if prefix.is_ipv4() {
        prefix.prefix_len() + V4_MAPPED_PREFIX_LEN
    } else {
        prefix.prefix_len()
    };
    (address, prefix_len)
}
