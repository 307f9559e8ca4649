// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Neighbor Discovery message and option definitions (RFC 4861).

pub mod opt;

use bitflags::bitflags;
use core::fmt;
use core::fmt::Display;

/// ICMPv6 type of a Neighbor Solicitation.
pub const ICMP6_NS: u8 = 135;

/// ICMPv6 type of a Neighbor Advertisement.
pub const ICMP6_NA: u8 = 136;

/// Every ND message is sent, and must be received, with this hop
/// limit. Anything else was forwarded by a router and is discarded.
pub const ND_HOP_LIMIT: u8 = 255;

/// ND option lengths are expressed in units of 8 bytes.
pub const ND_OPT_UNIT: usize = 8;

/// The offset of the body within an ND option, past the type and
/// length bytes.
pub const ND_OPT_DATA_OFFSET: usize = 2;

/// The size of a link-layer address option carrying an Ethernet MAC.
pub const ND_OPT_ETH_LLAO_LEN: usize = 8;

bitflags! {
/// The flags of a Neighbor Advertisement.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NdiscFlags: u8 {
    /// The sender is a router.
    const ROUTER = 0x80;
    /// The advertisement answers a solicitation.
    const SOLICITED = 0x40;
    /// The advertisement should override a cached link-layer address.
    const OVERRIDE = 0x20;
}
}

pub const ND_OPT_SLLAO: u8 = 1;
pub const ND_OPT_TLLAO: u8 = 2;
pub const ND_OPT_PREFIX_INFO: u8 = 3;
pub const ND_OPT_REDIRECTED_HDR: u8 = 4;
pub const ND_OPT_MTU: u8 = 5;

/// The kind of an ND option.
///
/// Only the link-layer address options carry meaning for the proxy;
/// the others are named so they read well in logs.
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub enum NdOptType {
    SourceLinkLayerAddr,
    TargetLinkLayerAddr,
    PrefixInfo,
    RedirectedHdr,
    Mtu,
    Unknown(u8),
}

impl NdOptType {
    /// Return `true` for the source and target link-layer address
    /// options.
    pub fn is_lladdr(&self) -> bool {
        matches!(self, Self::SourceLinkLayerAddr | Self::TargetLinkLayerAddr)
    }
}

impl From<u8> for NdOptType {
    fn from(raw: u8) -> Self {
        match raw {
            ND_OPT_SLLAO => Self::SourceLinkLayerAddr,
            ND_OPT_TLLAO => Self::TargetLinkLayerAddr,
            ND_OPT_PREFIX_INFO => Self::PrefixInfo,
            ND_OPT_REDIRECTED_HDR => Self::RedirectedHdr,
            ND_OPT_MTU => Self::Mtu,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<NdOptType> for u8 {
    fn from(ot: NdOptType) -> Self {
        use NdOptType::*;

        match ot {
            SourceLinkLayerAddr => ND_OPT_SLLAO,
            TargetLinkLayerAddr => ND_OPT_TLLAO,
            PrefixInfo => ND_OPT_PREFIX_INFO,
            RedirectedHdr => ND_OPT_REDIRECTED_HDR,
            Mtu => ND_OPT_MTU,
            Unknown(val) => val,
        }
    }
}

impl Display for NdOptType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::SourceLinkLayerAddr => write!(f, "SLLAO"),
            Self::TargetLinkLayerAddr => write!(f, "TLLAO"),
            Self::PrefixInfo => write!(f, "PrefixInfo"),
            Self::RedirectedHdr => write!(f, "RedirectedHdr"),
            Self::Mtu => write!(f, "MTU"),
            Self::Unknown(val) => write!(f, "Unknown({val})"),
        }
    }
}

/// We are never really interested in internal representation of
/// [`NdOptType`].
impl fmt::Debug for NdOptType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}
