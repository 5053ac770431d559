//! Address-family selection for canonical routes.
//!
//! A route is IPv4 when its prefix is IPv4-mapped and at least 96 bits long;
//! everything else is IPv6. The gateway must then be of the same kind. This
//! check runs before any request is built.

use crate::error::{Result, RouteError};
use babel_types::{AddressFamily, CanonicalAddress, IpAddress, IpPrefix, V4_MAPPED_PREFIX_LEN};

/// Per-family parameters of the route installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyParams {
    pub family: AddressFamily,
    /// Subtracted from the canonical prefix length before submission.
    pub prefix_offset: u8,
    /// Whether delete requests carry the metric of the removed route.
    pub delete_carries_metric: bool,
}

impl FamilyParams {
    pub const IPV4: FamilyParams = FamilyParams {
        family: AddressFamily::V4,
        prefix_offset: V4_MAPPED_PREFIX_LEN,
        delete_carries_metric: true,
    };

    pub const IPV6: FamilyParams = FamilyParams {
        family: AddressFamily::V6,
        prefix_offset: 0,
        delete_carries_metric: false,
    };

    /// Narrows a canonical address to this family's native width.
    pub fn native_address(&self, addr: &CanonicalAddress) -> IpAddress {
        match self.family {
            AddressFamily::V4 => IpAddress::V4(addr.to_ipv4()),
            AddressFamily::V6 => IpAddress::V6(addr.to_ipv6()),
        }
    }

    /// Builds the normalized native prefix for a canonical prefix.
    pub fn native_prefix(&self, prefix: &CanonicalAddress, prefix_len: u8) -> Result<IpPrefix> {
        let native_len = prefix_len
            .checked_sub(self.prefix_offset)
            .ok_or(RouteError::InvalidPrefixLength(prefix_len))?;
        let prefix = IpPrefix::new(self.native_address(prefix), native_len)
            .map_err(|_| RouteError::InvalidPrefixLength(prefix_len))?;
        Ok(prefix.normalized())
    }
}

/// Determines the family of a route and checks the gateway agrees with it.
pub fn validate_family(
    prefix: &CanonicalAddress,
    prefix_len: u8,
    gateway: &CanonicalAddress,
) -> Result<&'static FamilyParams> {
    if prefix_len > 128 {
        return Err(RouteError::InvalidPrefixLength(prefix_len));
    }

    let ipv4 = prefix_len >= V4_MAPPED_PREFIX_LEN && prefix.is_v4mapped();
    if ipv4 != gateway.is_v4mapped() {
        return Err(RouteError::FamilyMismatch {
            prefix: *prefix,
            prefix_len,
            gateway: *gateway,
        });
    }

    Ok(if ipv4 {
        &FamilyParams::IPV4
    } else {
        &FamilyParams::IPV6
    })
}
