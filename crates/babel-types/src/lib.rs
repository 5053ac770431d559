//! Shared value types for the babel kernel route layer.
//!
//! - [`IpAddress`], [`Ipv4Address`], [`Ipv6Address`]: family-native addresses
//! - [`IpPrefix`]: CIDR prefixes with host-bit normalization
//! - [`CanonicalAddress`]: the 16-byte form the routing engine works in, where
//!   IPv4 is carried as an IPv4-mapped IPv6 address
//! - [`HardwareAddress`]: variable-length link-layer address of an interface
//! - [`InterfaceIdentifier`]: 64-bit IPv6 interface identifier

mod canonical;
mod hwaddr;
mod ip;

pub use canonical::{canonical_prefix, CanonicalAddress, V4_MAPPED_PREFIX, V4_MAPPED_PREFIX_LEN};
pub use hwaddr::{HardwareAddress, InterfaceIdentifier};
pub use ip::{AddressFamily, IpAddress, IpPrefix, Ipv4Address, Ipv6Address};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid hardware address format: {0}")]
    InvalidHardwareAddress(String),

    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),
}
