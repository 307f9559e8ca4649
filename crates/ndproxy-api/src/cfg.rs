// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Gateway interfaces and proxy configuration.

use super::mac::MacAddr;
use core::fmt;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;

/// The length of an Ethernet II header: destination, source, and
/// EtherType.
pub const ETHER_HDR_SZ: usize = 14;

/// The link types a packet can arrive on or leave by.
///
/// The gateway bridges an Ethernet segment (where the router lives)
/// and the low-power side, reached either directly over the 802.15.4
/// radio or through the serial (SLIP) line. The interface value
/// carries the capabilities that used to be fixed at build time.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub enum Interface {
    #[default]
    Undefined,
    Ieee8023,
    Ieee802154,
    Slip,
}

impl Interface {
    /// The length of the link-layer header that precedes the IPv6
    /// header in frames on this interface.
    ///
    /// The 6LoWPAN and serial drivers hand over bare, decompressed
    /// IPv6 packets.
    pub const fn link_hdr_len(&self) -> usize {
        match self {
            Self::Ieee8023 => ETHER_HDR_SZ,
            _ => 0,
        }
    }

    /// Return `true` if this interface leads to the low-power side of
    /// the gateway.
    pub const fn is_lowpan_side(&self) -> bool {
        matches!(self, Self::Ieee802154 | Self::Slip)
    }

    /// Return `true` if ND link-layer address options on this link use
    /// the Ethernet (6-byte MAC) format.
    pub const fn supports_eth_llao(&self) -> bool {
        matches!(self, Self::Ieee8023)
    }
}

impl Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Undefined => "undefined",
            Self::Ieee8023 => "ieee802.3",
            Self::Ieee802154 => "ieee802.15.4",
            Self::Slip => "slip",
        };
        write!(f, "{s}")
    }
}

/// Configuration of the ND proxy.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProxyCfg {
    /// The gateway's own Ethernet MAC. It is the source of the cached
    /// Ethernet header and the payload of every Target Link-Layer
    /// Address option the proxy emits.
    pub gateway_mac: MacAddr,
}

#[cfg(feature = "std")]
impl ProxyCfg {
    /// Parse a configuration from a TOML document, e.g.
    ///
    /// ```text
    /// gateway_mac = "02:00:00:00:00:01"
    /// ```
    pub fn from_toml(doc: &str) -> Result<Self, std::string::String> {
        toml::from_str(doc).map_err(|e| format!("bad proxy config: {e}"))
    }
}
