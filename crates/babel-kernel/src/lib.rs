//! Kernel route synchronization for the babel routing daemon.
//!
//! Translates the routing engine's decisions into forwarding-table requests
//! for the kernel and derives the interface identifiers used to form IPv6
//! link-local addresses.
//!
//! # Architecture
//!
//! ```text
//!  routing engine
//!        │ Operation + RouteChange (canonical 16-byte addresses)
//!        ▼
//!  KernelRoutes ── validate_family ──▶ FamilyParams (IPv4 | IPv6)
//!        │
//!        ▼
//!  RouteInstaller ── RouteRequest ──▶ KernelRibClient ──▶ kernel RIB
//!
//!  InterfaceTable ── HardwareAddress ──▶ derive_interface_identifier
//! ```
//!
//! The RIB client is passed in by reference; nothing in this crate holds
//! global state or retains routes between calls.

pub mod config;
pub mod error;
pub mod eui64;
pub mod family;
pub mod installer;
pub mod interface;
pub mod rib;
pub mod route;

pub use config::{KernelConfig, LoggingConfig, RouteConfig};
pub use error::{ConfigError, IdentifierError, KernelError, Result, RouteError};
pub use eui64::derive_interface_identifier;
pub use family::{validate_family, FamilyParams};
pub use installer::RouteInstaller;
pub use interface::{
    derive_interface_identifier_for, interface_is_operational, interface_is_wireless,
    interface_mtu, InterfaceInfo, InterfaceTable,
};
pub use rib::{
    DryRunRibClient, KernelRibClient, NextHop, RouteAction, RouteRequest, RouteSource, Safi,
};
pub use route::{KernelRoutes, NextHopUpdate, Operation, RouteChange, RouteKey, RouteOutcome};
