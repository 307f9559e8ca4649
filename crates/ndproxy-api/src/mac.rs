// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use alloc::str::FromStr;
use alloc::string::String;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::ops::Deref;
use serde::Deserialize;
use serde::Serialize;

/// The length of an IEEE 802.3 MAC address, in bytes.
pub const ETHER_ADDR_LEN: usize = 6;

/// A MAC address.
///
/// Serialized in its human-friendly `aa:bb:cc:dd:ee:ff` form so that it
/// reads naturally in configuration files.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Hash,
)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddr {
    inner: [u8; ETHER_ADDR_LEN],
}

impl MacAddr {
    pub const BROADCAST: Self = Self { inner: [0xFF; ETHER_ADDR_LEN] };
    pub const ZERO: Self = Self { inner: [0x00; ETHER_ADDR_LEN] };

    /// Return the bytes of the MAC address.
    #[inline]
    pub fn bytes(&self) -> [u8; ETHER_ADDR_LEN] {
        self.inner
    }

    pub const fn from_const(bytes: [u8; ETHER_ADDR_LEN]) -> Self {
        Self { inner: bytes }
    }

    /// Build a MAC address from the first six bytes of `src`, as found
    /// in the body of a link-layer address option.
    ///
    /// Returns `None` if `src` is too short.
    pub fn from_slice(src: &[u8]) -> Option<Self> {
        let bytes: [u8; ETHER_ADDR_LEN] =
            src.get(..ETHER_ADDR_LEN)?.try_into().ok()?;
        Some(Self { inner: bytes })
    }
}

impl From<[u8; ETHER_ADDR_LEN]> for MacAddr {
    fn from(bytes: [u8; ETHER_ADDR_LEN]) -> Self {
        Self { inner: bytes }
    }
}

impl From<&[u8; ETHER_ADDR_LEN]> for MacAddr {
    fn from(bytes: &[u8; ETHER_ADDR_LEN]) -> Self {
        Self { inner: *bytes }
    }
}

impl AsRef<[u8]> for MacAddr {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl Deref for MacAddr {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets: Vec<u8> = s
            .split(':')
            .map(|s| {
                u8::from_str_radix(s, 16).map_err(|_| format!("bad octet: {s}"))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        if octets.len() != ETHER_ADDR_LEN {
            return Err(format!("incorrect number of bytes: {}", octets.len()));
        }

        let bytes =
            [octets[0], octets[1], octets[2], octets[3], octets[4], octets[5]];

        Ok(MacAddr { inner: bytes })
    }
}

impl TryFrom<String> for MacAddr {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddr> for String {
    fn from(mac: MacAddr) -> Self {
        mac.to_string()
    }
}

impl Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.inner[0],
            self.inner[1],
            self.inner[2],
            self.inner[3],
            self.inner[4],
            self.inner[5]
        )
    }
}

// There's no reason to view the MAC address as its raw array, so just
// present it in a human-friendly manner.
impl Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacAddr {{ inner: {self} }}")
    }
}
