//! Kernel RIB client seam.
//!
//! The message framing and session handling used to reach the kernel's
//! routing manager live behind [`KernelRibClient`]. This layer only builds
//! fully-formed [`RouteRequest`]s and hands them over one at a time.

use crate::error::KernelError;
use babel_types::{AddressFamily, IpAddress, IpPrefix};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Linux `RTPROT_BABEL`.
pub const RTPROT_BABEL: u8 = 42;

/// Linux `RT_TABLE_MAIN`.
pub const RT_TABLE_MAIN: u32 = 254;

/// Whether a request installs or removes a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAction {
    Add,
    Delete,
}

impl fmt::Display for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteAction::Add => f.write_str("add"),
            RouteAction::Delete => f.write_str("delete"),
        }
    }
}

/// Subsequent address family identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Safi {
    #[default]
    Unicast,
    Multicast,
}

/// Identity stamped on every route this daemon owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteSource {
    /// Routing protocol tag (`rtm_protocol`).
    pub protocol: u8,
    /// Routing table the route lives in.
    pub table: u32,
    pub safi: Safi,
    /// Request flags, always zero for babel routes.
    pub flags: u32,
}

impl RouteSource {
    pub const BABEL: Self = RouteSource {
        protocol: RTPROT_BABEL,
        table: RT_TABLE_MAIN,
        safi: Safi::Unicast,
        flags: 0,
    };
}

impl Default for RouteSource {
    fn default() -> Self {
        RouteSource::BABEL
    }
}

/// The single next hop of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NextHop {
    pub gateway: IpAddress,
    pub ifindex: u32,
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.gateway, self.ifindex)
    }
}

/// One route mutation, in the family-native form the kernel expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteRequest {
    pub action: RouteAction,
    pub source: RouteSource,
    /// Destination, already normalized.
    pub prefix: IpPrefix,
    pub next_hop: NextHop,
    /// `None` when the request carries no metric attribute.
    pub metric: Option<u32>,
}

impl RouteRequest {
    pub fn family(&self) -> AddressFamily {
        self.prefix.family()
    }
}

impl fmt::Display for RouteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} via {} proto {} table {}",
            self.action,
            self.family(),
            self.prefix,
            self.next_hop,
            self.source.protocol,
            self.source.table
        )?;
        if let Some(metric) = self.metric {
            write!(f, " metric {}", metric)?;
        }
        Ok(())
    }
}

/// Client for the kernel's routing manager.
///
/// Requests are issued strictly one after another; a blocked call blocks
/// the caller. Timeouts and transport retries belong to the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait KernelRibClient {
    fn submit_route(&self, request: &RouteRequest) -> Result<(), KernelError>;
}

/// Client that logs each request and reports success without touching the
/// kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRibClient;

impl KernelRibClient for DryRunRibClient {
    fn submit_route(&self, request: &RouteRequest) -> Result<(), KernelError> {
        info!(
            action = %request.action,
            family = %request.family(),
            prefix = %request.prefix,
            next_hop = %request.next_hop,
            metric = ?request.metric,
            "dry-run route request"
        );
        Ok(())
    }
}
