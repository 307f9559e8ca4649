// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use alloc::string::String;
use core::fmt;
use core::ops::Deref;
use core::result;
use core::str::FromStr;
use serde::Deserialize;
use serde::Serialize;

/// The length of an IPv6 address, in bytes.
pub const IPV6_ADDR_LEN: usize = 16;

/// The ICMPv6 protocol number, as carried in the IPv6 Next Header
/// field.
pub const PROTO_ICMPV6: u8 = 0x3A;

/// An IPv6 address.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Ipv6Addr {
    inner: [u8; IPV6_ADDR_LEN],
}

impl Ipv6Addr {
    /// The unspecified IPv6 address, i.e., `::` or all zeros.
    pub const ANY_ADDR: Self = Self { inner: [0; IPV6_ADDR_LEN] };

    /// The All-Nodes multicast address, used in the Neighbor Discovery
    /// Protocol.
    pub const ALL_NODES: Self = Self::from_const([0xff02, 0, 0, 0, 0, 0, 0, 1]);

    /// The `fe80::/64` prefix shared by every link-local unicast
    /// address.
    pub const LINK_LOCAL_PREFIX: [u8; 8] = [0xfe, 0x80, 0, 0, 0, 0, 0, 0];

    /// Return the solicited-node multicast IPv6 address corresponding to
    /// `self`.
    ///
    /// See [RFC 4291 §2.7.1] for details.
    ///
    /// [RFC 4291 §2.7.1]: https://www.rfc-editor.org/rfc/rfc4291#section-2.7.1
    pub const fn solicited_node_multicast(&self) -> Ipv6Addr {
        let bytes = &self.inner;
        let w0 = u16::from_be_bytes([0xff, bytes[13]]);
        let w1 = u16::from_be_bytes([bytes[14], bytes[15]]);
        Self::from_const([0xff02, 0, 0, 0, 0, 1, w0, w1])
    }

    /// Return `true` if this is a solicited node multicast address.
    pub fn is_solicited_node_multicast(&self) -> bool {
        const EXPECTED: &[u8] =
            &[0xff, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, 0xff];
        &self.inner[..EXPECTED.len()] == EXPECTED
    }

    /// Return `true` if this is the solicited-node multicast address
    /// of `target`.
    pub fn is_solicited_node_multicast_of(&self, target: &Ipv6Addr) -> bool {
        *self == target.solicited_node_multicast()
    }

    /// Return `true` if this is a multicast IPv6 address, and `false` otherwise
    pub const fn is_multicast(&self) -> bool {
        self.inner[0] == 0xFF
    }

    /// Return `true` if this is a link-local unicast address
    /// (`fe80::/10`).
    pub const fn is_link_local(&self) -> bool {
        self.inner[0] == 0xfe && (self.inner[1] & 0xc0) == 0x80
    }

    /// Return `true` if this is the unspecified address.
    pub fn is_unspecified(&self) -> bool {
        *self == Self::ANY_ADDR
    }

    /// Return the bytes of the address.
    pub fn bytes(&self) -> [u8; IPV6_ADDR_LEN] {
        self.inner
    }

    /// Return the low 64 bits of the address: the interface
    /// identifier.
    pub fn iid(&self) -> [u8; 8] {
        let mut iid = [0u8; 8];
        iid.copy_from_slice(&self.inner[8..]);
        iid
    }

    pub const fn from_const(words: [u16; 8]) -> Self {
        let w0 = words[0].to_be_bytes();
        let w1 = words[1].to_be_bytes();
        let w2 = words[2].to_be_bytes();
        let w3 = words[3].to_be_bytes();
        let w4 = words[4].to_be_bytes();
        let w5 = words[5].to_be_bytes();
        let w6 = words[6].to_be_bytes();
        let w7 = words[7].to_be_bytes();
        Self {
            inner: [
                w0[0], w0[1], w1[0], w1[1], w2[0], w2[1], w3[0], w3[1], w4[0],
                w4[1], w5[0], w5[1], w6[0], w6[1], w7[0], w7[1],
            ],
        }
    }
}

impl fmt::Display for Ipv6Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ip6 = core::net::Ipv6Addr::from(self.inner);
        write!(f, "{ip6}")
    }
}

impl From<core::net::Ipv6Addr> for Ipv6Addr {
    fn from(ip6: core::net::Ipv6Addr) -> Self {
        Self { inner: ip6.octets() }
    }
}

impl From<Ipv6Addr> for core::net::Ipv6Addr {
    fn from(ip6: Ipv6Addr) -> Self {
        Self::from(ip6.inner)
    }
}

impl From<&[u8; IPV6_ADDR_LEN]> for Ipv6Addr {
    fn from(bytes: &[u8; IPV6_ADDR_LEN]) -> Ipv6Addr {
        Ipv6Addr { inner: *bytes }
    }
}

impl From<[u8; IPV6_ADDR_LEN]> for Ipv6Addr {
    fn from(bytes: [u8; IPV6_ADDR_LEN]) -> Ipv6Addr {
        Ipv6Addr { inner: bytes }
    }
}

impl From<Ipv6Addr> for [u8; IPV6_ADDR_LEN] {
    fn from(ip: Ipv6Addr) -> [u8; IPV6_ADDR_LEN] {
        ip.inner
    }
}

impl From<[u16; 8]> for Ipv6Addr {
    fn from(words: [u16; 8]) -> Ipv6Addr {
        Self::from_const(words)
    }
}

impl FromStr for Ipv6Addr {
    type Err = String;

    fn from_str(val: &str) -> result::Result<Self, Self::Err> {
        let ip = val
            .parse::<core::net::Ipv6Addr>()
            .map_err(|_| String::from("Invalid IPv6 address"))?;
        Ok(ip.into())
    }
}

impl AsRef<[u8]> for Ipv6Addr {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl Deref for Ipv6Addr {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
