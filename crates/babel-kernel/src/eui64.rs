//! Interface identifiers from link-layer addresses.
//!
//! The derivation follows the modified EUI-64 layout with one deliberate
//! quirk: the universal/local bit is inverted only for 8-byte hardware
//! addresses. A 6-byte MAC is expanded with `ff:fe` but keeps its U/L bit as
//! is, so `aa:bb:cc:dd:ee:ff` yields `aa:bb:cc:ff:fe:dd:ee:ff` rather than
//! the RFC 4291 `a8:bb:cc:ff:fe:dd:ee:ff`. Changing this changes the
//! link-local addresses of existing interfaces.

use crate::error::IdentifierError;
use babel_types::{HardwareAddress, InterfaceIdentifier};

const EUI64_LEN: usize = 8;
const MAC48_LEN: usize = 6;
const UNIVERSAL_LOCAL_BIT: u8 = 0x02;

/// Derives the 64-bit interface identifier for `hwaddr`.
///
/// | length | result                                         |
/// |--------|------------------------------------------------|
/// | 0      | [`IdentifierError::NoHardwareAddress`]         |
/// | 1-5, 7 | left-padded with zeros                         |
/// | 6      | `ff:fe` inserted after the third byte          |
/// | 8      | copied, universal/local bit inverted           |
/// | > 8    | first 8 bytes                                  |
pub fn derive_interface_identifier(
    hwaddr: &HardwareAddress,
) -> Result<InterfaceIdentifier, IdentifierError> {
    let bytes = hwaddr.as_bytes();
    let mut eui = [0u8; EUI64_LEN];

    match bytes.len() {
        0 => return Err(IdentifierError::NoHardwareAddress),
        EUI64_LEN => {
            eui.copy_from_slice(bytes);
            eui[0] ^= UNIVERSAL_LOCAL_BIT;
        }
        MAC48_LEN => {
            eui[..3].copy_from_slice(&bytes[..3]);
            eui[3] = 0xff;
            eui[4] = 0xfe;
            eui[5..].copy_from_slice(&bytes[3..]);
        }
        len if len > EUI64_LEN => eui.copy_from_slice(&bytes[..EUI64_LEN]),
        len => eui[EUI64_LEN - len..].copy_from_slice(bytes),
    }

    Ok(InterfaceIdentifier::new(eui))
}
