// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Types for calculating the internet checksum.
//!
//! The [`Checksum`] type provides a rolling one's complement sum which
//! is finalized into a [`HeaderChecksum`], the value stored in the
//! actual header bytes. [`icmpv6_checksum`] covers the one checksum
//! the proxy ever writes: that of an outgoing Neighbor Advertisement.
//!
//! # Checksums and Endianness
//!
//! The internet checksum is a sequence of two bytes, not a logical
//! `u16`. The sum treats each pair of bytes (both the bytes being
//! summed and the checksum itself) as a native 16-bit integer, so no
//! byte-order conversion is ever performed on it: we use
//! `{to,from}_ne_bytes()`. Because the summed bytes are in network
//! order, storing the result back into memory puts it in network order
//! as well. See RFC 1071 §1.B.
//!
//! # Relevant RFCs
//!
//! * 1071 Computing the Internet Checksum
//!
//! * 8200 §8.1 Upper-Layer Checksums

use ndproxy_api::Ipv6Addr;
use ndproxy_api::PROTO_ICMPV6;

/// The checksum values, as it is contained in a network header.
///
/// This holds the bytes as they are stored in the header itself.
/// Notably, it contains the bytes with one's complement applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HeaderChecksum {
    inner: [u8; 2],
}

impl HeaderChecksum {
    /// Return the bytes of this header checksum.
    pub fn bytes(&self) -> [u8; 2] {
        self.inner
    }
}

impl From<Checksum> for HeaderChecksum {
    /// Finalize the rolling checksum and put it into header form by
    /// performing one's complement.
    fn from(mut csum: Checksum) -> HeaderChecksum {
        Self { inner: (!csum.finalize()).to_ne_bytes() }
    }
}

/// A rolling one's complement checksum calculation.
///
/// Carries are accumulated in the upper half of the `u32` and only
/// folded when the sum is finalized.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Checksum {
    inner: u32,
}

impl Checksum {
    /// Update the sum by adding the contents of `bytes`.
    ///
    /// `bytes` must start on an even offset of the summed message for
    /// all but the final call.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.inner = csum_add(self.inner, bytes);
    }

    /// Create a new rolling checksum, starting with the passed in
    /// `bytes`.
    pub fn compute(bytes: &[u8]) -> Self {
        Self { inner: csum_add(0, bytes) }
    }

    /// Finalize the sum by adding up all the accumulated carries and
    /// returning the resulting value as a `u16`.
    pub fn finalize(&mut self) -> u16 {
        while (self.inner >> 16) != 0 {
            self.inner = (self.inner >> 16) + (self.inner & 0xFFFF);
        }

        (self.inner & 0xFFFF) as u16
    }
}

/// Compute the ICMPv6 checksum of `msg` (ICMPv6 header onward, with
/// the checksum field zeroed) sent from `src` to `dst`.
pub fn icmpv6_checksum(
    src: &Ipv6Addr,
    dst: &Ipv6Addr,
    msg: &[u8],
) -> HeaderChecksum {
    let mut csum = Checksum::compute(src);
    csum.add_bytes(dst);
    csum.add_bytes(&(msg.len() as u32).to_be_bytes());
    csum.add_bytes(&[0, 0, 0, PROTO_ICMPV6]);
    csum.add_bytes(msg);
    HeaderChecksum::from(csum)
}

fn csum_add(mut csum: u32, bytes: &[u8]) -> u32 {
    let mut len = bytes.len();
    let mut pos = 0;

    while len > 1 {
        csum += (u16::from_ne_bytes([bytes[pos], bytes[pos + 1]])) as u32;
        pos += 2;
        len -= 2;
    }

    // An odd trailing byte is padded with a zero byte on the right,
    // which lands in a different half depending on native order.
    if len == 1 {
        csum += u16::from_ne_bytes([bytes[pos], 0]) as u32;
    }

    csum
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rfc1071_example() {
        // The example sum from RFC 1071 §3.
        let bytes = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
        let mut csum = Checksum::compute(&bytes);
        assert_eq!(u16::from_be(csum.finalize()), 0xddf2);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let bytes: [u8; 10] = [0x45, 0, 0, 0x1c, 0xab, 0xcd, 0, 0, 0x40, 0x11];
        let mut whole = Checksum::compute(&bytes);
        let mut parts = Checksum::compute(&bytes[..4]);
        parts.add_bytes(&bytes[4..]);
        assert_eq!(whole.finalize(), parts.finalize());
    }

    #[test]
    fn odd_length_pads_right() {
        let mut odd = Checksum::compute(&[0x12, 0x34, 0x56]);
        let mut even = Checksum::compute(&[0x12, 0x34, 0x56, 0x00]);
        assert_eq!(odd.finalize(), even.finalize());
    }

    #[test]
    fn verified_sum_is_zero() {
        let src: Ipv6Addr = "fe80::1".parse().unwrap();
        let dst: Ipv6Addr = "fe80::2".parse().unwrap();
        let mut msg = [136u8, 0, 0, 0, 0x60, 0, 0, 0];
        let hc = icmpv6_checksum(&src, &dst, &msg);
        msg[2..4].copy_from_slice(&hc.bytes());

        // Summing a message that carries its own checksum yields
        // all-ones, i.e. zero after complement.
        assert_eq!(icmpv6_checksum(&src, &dst, &msg).bytes(), [0, 0]);
    }
}
