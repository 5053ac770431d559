//! Route operation dispatch.
//!
//! [`KernelRoutes`] is the entry point the routing engine calls with its
//! decisions. It validates the address family, picks the matching installer
//! and turns a modify into delete-then-add.
//!
//! Modify is not transactional: the old route is removed first and its
//! removal result ignored, then the new one is added. If that add fails for
//! any reason other than the route already existing, the destination is left
//! without a kernel route and the error is returned so the caller can retry.

use crate::error::{KernelError, Result, RouteError};
use crate::family::{validate_family, FamilyParams};
use crate::installer::RouteInstaller;
use crate::rib::{KernelRibClient, RouteSource};
use babel_types::CanonicalAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, warn};

/// What to do with a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Flush,
    Modify,
}

impl Operation {
    /// Numeric code used by the routing engine.
    pub const fn code(&self) -> i32 {
        match self {
            Operation::Add => 0,
            Operation::Flush => 1,
            Operation::Modify => 2,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Operation::Add),
            1 => Some(Operation::Flush),
            2 => Some(Operation::Modify),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => f.write_str("add"),
            Operation::Flush => f.write_str("flush"),
            Operation::Modify => f.write_str("modify"),
        }
    }
}

/// A forwarding-table entry in canonical form.
///
/// IPv4 routes carry IPv4-mapped prefix and gateway and a prefix length
/// offset by 96.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey {
    pub prefix: CanonicalAddress,
    pub prefix_len: u8,
    pub gateway: CanonicalAddress,
    pub ifindex: u32,
    pub metric: u32,
}

impl RouteKey {
    /// The same destination reached through `next_hop`.
    pub fn with_next_hop(&self, next_hop: &NextHopUpdate) -> RouteKey {
        RouteKey {
            gateway: next_hop.gateway,
            ifindex: next_hop.ifindex,
            metric: next_hop.metric,
            ..*self
        }
    }

    fn next_hop(&self) -> NextHopUpdate {
        NextHopUpdate {
            gateway: self.gateway,
            ifindex: self.ifindex,
            metric: self.metric,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} via {}@{} metric {}",
            self.prefix, self.prefix_len, self.gateway, self.ifindex, self.metric
        )
    }
}

/// Replacement next hop for a modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NextHopUpdate {
    pub gateway: CanonicalAddress,
    pub ifindex: u32,
    pub metric: u32,
}

/// A route plus, for modify, the next hop it should move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteChange {
    pub key: RouteKey,
    #[serde(default)]
    pub new: Option<NextHopUpdate>,
}

impl RouteChange {
    pub fn new(key: RouteKey) -> Self {
        Self { key, new: None }
    }

    pub fn with_update(key: RouteKey, new: NextHopUpdate) -> Self {
        Self {
            key,
            new: Some(new),
        }
    }
}

/// Successful result of a route operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteOutcome {
    /// The kernel accepted the change.
    Applied,
    /// Modify to an identical next hop; the kernel was not contacted.
    Unchanged,
    /// Modify found the new route already installed.
    AlreadyPresent,
}

impl RouteOutcome {
    /// Numeric return code: 0 for success, 1 for already present.
    pub const fn code(&self) -> i32 {
        match self {
            RouteOutcome::Applied | RouteOutcome::Unchanged => 0,
            RouteOutcome::AlreadyPresent => 1,
        }
    }
}

/// Kernel route synchronization over an injected RIB client.
pub struct KernelRoutes<'a, C: ?Sized> {
    client: &'a C,
    source: RouteSource,
}

impl<'a, C: KernelRibClient + ?Sized> KernelRoutes<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self::with_source(client, RouteSource::BABEL)
    }

    pub fn with_source(client: &'a C, source: RouteSource) -> Self {
        Self { client, source }
    }

    pub fn source(&self) -> RouteSource {
        self.source
    }

    fn installer(&self, params: &'static FamilyParams) -> RouteInstaller<'a, C> {
        RouteInstaller::new(self.client, params, self.source)
    }

    /// Applies `operation` to the kernel routing table.
    ///
    /// Add and flush return the installer's result unchanged, so adding a
    /// route twice reports [`KernelError::AlreadyExists`]. Modify reports
    /// [`RouteOutcome::Unchanged`] when the next hop is identical and
    /// [`RouteOutcome::AlreadyPresent`] when the new route already exists.
    pub fn install_or_update_route(
        &self,
        operation: Operation,
        change: &RouteChange,
    ) -> Result<RouteOutcome> {
        let key = &change.key;
        let params = validate_family(&key.prefix, key.prefix_len, &key.gateway)?;

        match operation {
            Operation::Add => {
                self.installer(params).add(key)?;
                Ok(RouteOutcome::Applied)
            }
            Operation::Flush => {
                self.installer(params).delete(key)?;
                Ok(RouteOutcome::Applied)
            }
            Operation::Modify => self.modify(params, change),
        }
    }

    /// Numeric-code entry point.
    ///
    /// # Panics
    ///
    /// Panics on any code outside add, flush and modify. Release builds abort.
    pub fn kernel_route(&self, code: i32, change: &RouteChange) -> Result<RouteOutcome> {
        let Some(operation) = Operation::from_code(code) else {
            error!(code, "invalid route operation code");
            panic!("invalid route operation code {}", code);
        };
        self.install_or_update_route(operation, change)
    }

    fn modify(&self, params: &'static FamilyParams, change: &RouteChange) -> Result<RouteOutcome> {
        let old = &change.key;
        let new = match change.new {
            Some(new) if new != old.next_hop() => new,
            _ => return Ok(RouteOutcome::Unchanged),
        };

        let new_params = validate_family(&old.prefix, old.prefix_len, &new.gateway)?;
        if new_params != params {
            return Err(RouteError::FamilyMismatch {
                prefix: old.prefix,
                prefix_len: old.prefix_len,
                gateway: new.gateway,
            });
        }

        debug!(route = %old, "Modify route: delete old; add new.");
        let installer = self.installer(params);

        if let Err(e) = installer.delete(old) {
            debug!(route = %old, error = %e, "ignoring failure to remove old route");
        }

        let replacement = old.with_next_hop(&new);
        match installer.add(&replacement) {
            Ok(()) => Ok(RouteOutcome::Applied),
            Err(RouteError::Kernel(KernelError::AlreadyExists)) => Ok(RouteOutcome::AlreadyPresent),
            Err(e) => {
                warn!(route = %replacement, error = %e, "route left uninstalled after failed modify");
                Err(e)
            }
        }
    }
}
