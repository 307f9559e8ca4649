// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Link-layer state bridging the Ethernet and 6LoWPAN sides.
//!
//! The gateway learns the MAC of its Ethernet peer, the router, from
//! the first Source Link-Layer Address option it sees, and caches the
//! Ethernet header used for every frame it sends that way.

use ndproxy_api::ETHER_HDR_SZ;
use ndproxy_api::Ipv6Addr;
use ndproxy_api::MacAddr;

pub const ETHER_TYPE_IPV6: u16 = 0x86DD;

/// A ready-to-send Ethernet header: destination, source, EtherType.
pub type EtherHdrBytes = [u8; ETHER_HDR_SZ];

/// Build an Ethernet header addressed from `src` to `dst` carrying
/// IPv6.
pub fn build_ethernet_header(dst: MacAddr, src: MacAddr) -> EtherHdrBytes {
    let mut hdr = [0u8; ETHER_HDR_SZ];
    hdr[..6].copy_from_slice(&dst);
    hdr[6..12].copy_from_slice(&src);
    hdr[12..].copy_from_slice(&ETHER_TYPE_IPV6.to_be_bytes());
    hdr
}

/// Derive the link-local form of `addr`: `fe80::/64` followed by the
/// interface identifier (low 64 bits) of `addr`.
pub fn link_local_from_global(addr: &Ipv6Addr) -> Ipv6Addr {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&Ipv6Addr::LINK_LOCAL_PREFIX);
    bytes[8..].copy_from_slice(&addr.iid());
    Ipv6Addr::from(bytes)
}

/// The learned router link-layer state.
#[derive(Clone, Debug)]
pub struct LinkBridge {
    gateway_mac: MacAddr,
    router: Option<LearnedRouter>,
}

#[derive(Clone, Copy, Debug)]
struct LearnedRouter {
    mac: MacAddr,
    eth_hdr: EtherHdrBytes,
}

impl LinkBridge {
    pub fn new(gateway_mac: MacAddr) -> Self {
        Self { gateway_mac, router: None }
    }

    pub fn gateway_mac(&self) -> MacAddr {
        self.gateway_mac
    }

    pub fn router_mac(&self) -> Option<MacAddr> {
        self.router.map(|r| r.mac)
    }

    /// The cached Ethernet header toward the router, once learned.
    pub fn eth_header(&self) -> Option<&EtherHdrBytes> {
        self.router.as_ref().map(|r| &r.eth_hdr)
    }

    /// Learn the router's MAC and build the cached Ethernet header.
    ///
    /// A router that is already known is kept; returns `true` only if
    /// this call learned `mac`.
    pub fn learn_router_mac(&mut self, mac: MacAddr) -> bool {
        if self.router.is_some() {
            return false;
        }

        let eth_hdr = build_ethernet_header(mac, self.gateway_mac);
        self.router = Some(LearnedRouter { mac, eth_hdr });
        true
    }

    /// Drop the learned router so the next SLLAO is learned afresh.
    /// Returns the MAC that was forgotten, if any.
    pub fn forget_router(&mut self) -> Option<MacAddr> {
        self.router.take().map(|r| r.mac)
    }
}
