//! Art-Net port addresses
//!
//! A universe is addressed by a 15-bit Port-Address made of a 7-bit Net,
//! a 4-bit Sub-Net and a 4-bit Universe:
//!
//! ```text
//!  bit 14 ........ 8 | 7 ..... 4 | 3 ..... 0
//!        Net         |  Sub-Net  |  Universe
//! ```
//!
//! On the wire the low byte (`SubUni`) carries Sub-Net and Universe and the
//! high byte (`Net`) carries the Net.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{error::CoreError, Result};

/// 15-bit Net:Sub-Net:Universe address of a DMX universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "PortAddressRepr", into = "u16")]
pub struct PortAddress(u16);

impl PortAddress {
    /// Highest flat address (`net 127, sub-net 15, universe 15`).
    pub const MAX: u16 = 0x7FFF;

    /// Build an address from its hierarchical parts.
    pub fn new(net: u8, sub_net: u8, universe: u8) -> Result<Self> {
        if net > 0x7F {
            return Err(CoreError::InvalidPortAddress(format!(
                "net {} out of range (0-127)",
                net
            )));
        }
        if sub_net > 0x0F {
            return Err(CoreError::InvalidPortAddress(format!(
                "sub-net {} out of range (0-15)",
                sub_net
            )));
        }
        if universe > 0x0F {
            return Err(CoreError::InvalidPortAddress(format!(
                "universe {} out of range (0-15)",
                universe
            )));
        }

        Ok(Self(
            (net as u16) << 8 | (sub_net as u16) << 4 | universe as u16,
        ))
    }

    /// Build an address from its flat 0-32767 form.
    pub fn from_flat(flat: u16) -> Result<Self> {
        if flat > Self::MAX {
            return Err(CoreError::InvalidPortAddress(format!(
                "{} exceeds the 15-bit address space (0-32767)",
                flat
            )));
        }
        Ok(Self(flat))
    }

    /// Flat 0-32767 address.
    pub fn flat(self) -> u16 {
        self.0
    }

    /// 7-bit Net.
    pub fn net(self) -> u8 {
        (self.0 >> 8) as u8 & 0x7F
    }

    /// 4-bit Sub-Net.
    pub fn sub_net(self) -> u8 {
        (self.0 >> 4) as u8 & 0x0F
    }

    /// 4-bit Universe within the Sub-Net.
    pub fn universe(self) -> u8 {
        self.0 as u8 & 0x0F
    }

    /// Low byte as written into the `SubUni` field.
    pub fn sub_uni(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.net(), self.sub_net(), self.universe())
    }
}

impl From<PortAddress> for u16 {
    fn from(address: PortAddress) -> Self {
        address.0
    }
}

impl TryFrom<u16> for PortAddress {
    type Error = CoreError;

    fn try_from(flat: u16) -> Result<Self> {
        Self::from_flat(flat)
    }
}

/// Accepts `"3"` (flat) or `"0:0:3"` (net:sub-net:universe).
impl FromStr for PortAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidPortAddress(format!("cannot parse '{}'", s));
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [flat] => Self::from_flat(flat.parse().map_err(|_| invalid())?),
            [net, sub_net, universe] => Self::new(
                net.parse().map_err(|_| invalid())?,
                sub_net.parse().map_err(|_| invalid())?,
                universe.parse().map_err(|_| invalid())?,
            ),
            _ => Err(invalid()),
        }
    }
}

/// Config representation: either a flat integer or a table of parts.
#[derive(Deserialize)]
#[serde(untagged)]
enum PortAddressRepr {
    Flat(u16),
    Parts {
        #[serde(default)]
        net: u8,
        #[serde(default)]
        sub_net: u8,
        universe: u8,
    },
}

impl TryFrom<PortAddressRepr> for PortAddress {
    type Error = CoreError;

    fn try_from(repr: PortAddressRepr) -> Result<Self> {
        match repr {
            PortAddressRepr::Flat(flat) => Self::from_flat(flat),
            PortAddressRepr::Parts {
                net,
                sub_net,
                universe,
            } => Self::new(net, sub_net, universe),
        }
    }
}
