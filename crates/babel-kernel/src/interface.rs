//! Interface table lookups.
//!
//! Interface enumeration and operational-state tracking happen elsewhere;
//! this module only reads from whatever table the daemon maintains.

use crate::eui64::derive_interface_identifier;
use crate::error::IdentifierError;
use babel_types::{HardwareAddress, InterfaceIdentifier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of one interface as seen by the interface table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub ifindex: u32,
    pub name: String,
    #[serde(default)]
    pub hardware_address: HardwareAddress,
    /// IPv4 MTU.
    pub mtu: u32,
    /// IPv6 MTU.
    pub mtu6: u32,
    /// Administratively up with carrier.
    pub operative: bool,
}

impl InterfaceInfo {
    /// The MTU usable by both families.
    pub fn effective_mtu(&self) -> u32 {
        self.mtu.min(self.mtu6)
    }
}

/// Read access to the daemon's interface table.
#[cfg_attr(test, mockall::automock)]
pub trait InterfaceTable {
    fn lookup_interface(&self, ifindex: u32) -> Option<InterfaceInfo>;
}

impl InterfaceTable for HashMap<u32, InterfaceInfo> {
    fn lookup_interface(&self, ifindex: u32) -> Option<InterfaceInfo> {
        self.get(&ifindex).cloned()
    }
}

/// Returns true if the interface exists and is operative.
pub fn interface_is_operational<T: InterfaceTable + ?Sized>(table: &T, ifindex: u32) -> bool {
    table
        .lookup_interface(ifindex)
        .is_some_and(|intf| intf.operative)
}

/// The smaller of the interface's IPv4 and IPv6 MTUs.
pub fn interface_mtu<T: InterfaceTable + ?Sized>(table: &T, ifindex: u32) -> Option<u32> {
    table
        .lookup_interface(ifindex)
        .map(|intf| intf.effective_mtu())
}

/// Wireless links cannot be detected through the interface table, so every
/// interface is treated as wired.
pub fn interface_is_wireless<T: InterfaceTable + ?Sized>(_table: &T, _ifindex: u32) -> bool {
    false
}

/// Derives the interface identifier from the hardware address of `ifindex`.
pub fn derive_interface_identifier_for<T: InterfaceTable + ?Sized>(
    table: &T,
    ifindex: u32,
) -> Result<InterfaceIdentifier, IdentifierError> {
    let intf = table
        .lookup_interface(ifindex)
        .ok_or(IdentifierError::InterfaceNotFound(ifindex))?;
    derive_interface_identifier(&intf.hardware_address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn eth0() -> InterfaceInfo {
        InterfaceInfo {
            ifindex: 2,
            name: "eth0".to_string(),
            hardware_address: "aa:bb:cc:dd:ee:ff".parse().unwrap(),
            mtu: 1500,
            mtu6: 1480,
            operative: true,
        }
    }

    fn table() -> HashMap<u32, InterfaceInfo> {
        let tun0 = InterfaceInfo {
            ifindex: 9,
            name: "tun0".to_string(),
            hardware_address: HardwareAddress::empty(),
            mtu: 1400,
            mtu6: 1400,
            operative: false,
        };
        HashMap::from([(2, eth0()), (9, tun0)])
    }

    #[test]
    fn test_operational() {
        let table = table();
        assert!(interface_is_operational(&table, 2));
        assert!(!interface_is_operational(&table, 9));
        assert!(!interface_is_operational(&table, 42));
    }

    #[test]
    fn test_mtu_is_minimum() {
        let table = table();
        assert_eq!(interface_mtu(&table, 2), Some(1480));
        assert_eq!(interface_mtu(&table, 9), Some(1400));
        assert_eq!(interface_mtu(&table, 42), None);
    }

    #[test]
    fn test_never_wireless() {
        let table = table();
        assert!(!interface_is_wireless(&table, 2));
        assert!(!interface_is_wireless(&table, 42));
    }

    #[test]
    fn test_identifier_by_index() {
        let table = table();
        let id = derive_interface_identifier_for(&table, 2).unwrap();
        assert_eq!(id.to_string(), "aa:bb:cc:ff:fe:dd:ee:ff");

        assert_eq!(
            derive_interface_identifier_for(&table, 9),
            Err(IdentifierError::NoHardwareAddress)
        );
        assert_eq!(
            derive_interface_identifier_for(&table, 42),
            Err(IdentifierError::InterfaceNotFound(42))
        );
    }

    #[test]
    fn test_lookup_goes_through_table() {
        let mut table = MockInterfaceTable::new();
        table
            .expect_lookup_interface()
            .with(eq(2))
            .times(2)
            .returning(|_| Some(eth0()));

        assert!(interface_is_operational(&table, 2));
        assert_eq!(interface_mtu(&table, 2), Some(1480));
    }
}
