//! Link-layer hardware addresses and IPv6 interface identifiers.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A link-layer hardware address of arbitrary length.
///
/// Ethernet gives 6 bytes, FireWire and some tunnels 8, InfiniBand 20, and
/// point-to-point links often none at all.
///
/// # Examples
///
/// ```
/// use babel_types::HardwareAddress;
///
/// let mac: HardwareAddress = "00:11:22:33:44:55".parse().unwrap();
/// assert_eq!(mac.len(), 6);
/// assert_eq!(mac.to_string(), "00:11:22:33:44:55");
///
/// let dashed: HardwareAddress = "00-11-22-33-44-55".parse().unwrap();
/// assert_eq!(mac, dashed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HardwareAddress(Vec<u8>);

impl HardwareAddress {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        HardwareAddress(bytes.into())
    }

    /// An interface without a hardware address.
    pub const fn empty() -> Self {
        HardwareAddress(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_colon_hex(f, &self.0)
    }
}

impl FromStr for HardwareAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(HardwareAddress::default());
        }

        // Support both colon and hyphen separators
        let separator = if s.contains(':') { ':' } else { '-' };

        s.split(separator)
            .map(|part| {
                if part.is_empty() || part.len() > 2 {
                    return Err(ParseError::InvalidHardwareAddress(s.to_string()));
                }
                u8::from_str_radix(part, 16)
                    .map_err(|_| ParseError::InvalidHardwareAddress(s.to_string()))
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(HardwareAddress)
    }
}

impl TryFrom<String> for HardwareAddress {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HardwareAddress> for String {
    fn from(addr: HardwareAddress) -> String {
        addr.to_string()
    }
}

impl From<[u8; 6]> for HardwareAddress {
    fn from(bytes: [u8; 6]) -> Self {
        HardwareAddress(bytes.to_vec())
    }
}

impl From<&[u8]> for HardwareAddress {
    fn from(bytes: &[u8]) -> Self {
        HardwareAddress(bytes.to_vec())
    }
}

/// A 64-bit IPv6 interface identifier (the low half of an address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceIdentifier([u8; 8]);

impl InterfaceIdentifier {
    pub const fn new(bytes: [u8; 8]) -> Self {
        InterfaceIdentifier(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Returns true if the universal/local bit of the first byte is set.
    pub const fn is_local(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl fmt::Display for InterfaceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_colon_hex(f, &self.0)
    }
}

impl From<InterfaceIdentifier> for [u8; 8] {
    fn from(id: InterfaceIdentifier) -> [u8; 8] {
        id.0
    }
}

fn write_colon_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(":")?;
        }
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}
