// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! A view of a single network buffer as the overlapping headers of an
//! ICMPv6 Neighbor Discovery message.
//!
//! The [`Packet`] owns a fixed-size buffer, the link-layer header
//! followed by the IPv6 packet, and the [`HdrOffsets`] needed to find
//! each header in it. The IPv6 header sits right after the link-layer
//! header; the ICMPv6 header follows any extension headers; the ND
//! message body and then the option chain follow the ICMPv6 header.
//!
//! The logical length of the packet counts bytes from the start of the
//! IPv6 header. Header reads are bounded by it, header writes by the
//! buffer capacity. Anything that changes the length of the message
//! must update the logical length in the same call.

use super::ndp::opt::NdOptions;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Display;
use ndproxy_api::ETHER_ADDR_LEN;
use ndproxy_api::ETHER_HDR_SZ;
use ndproxy_api::IPV6_ADDR_LEN;
use ndproxy_api::Interface;
use ndproxy_api::Ipv6Addr;
use ndproxy_api::MacAddr;
use thiserror::Error;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::Unaligned;

/// The length of the fixed IPv6 header.
pub const IPV6_HDR_SZ: usize = 40;

/// The length of the ICMPv6 header: type, code, and checksum.
pub const ICMP6_HDR_SZ: usize = 4;

/// The length of a Neighbor Solicitation or Advertisement body which
/// follows the ICMPv6 header: 32 bits of flags/reserved and the
/// target address.
pub const ND_MSG_SZ: usize = 4 + IPV6_ADDR_LEN;

/// The IPv6 minimum link MTU, which bounds every packet the gateway
/// handles.
pub const IPV6_MIN_MTU: usize = 1280;

/// The capacity of a packet buffer: a link-layer header plus an IPv6
/// packet of at most [`IPV6_MIN_MTU`] bytes.
pub const PKT_BUF_SZ: usize = ETHER_HDR_SZ + IPV6_MIN_MTU;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ReadErr {
    #[error("header layout mismatch")]
    BadLayout,
    #[error("read of {needed} bytes at offset {offset}, {available} available")]
    NotEnoughBytes { offset: usize, needed: usize, available: usize },
    #[error("frame of {len} bytes exceeds buffer of {max} bytes")]
    TooLong { len: usize, max: usize },
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum WriteError {
    #[error("header layout mismatch")]
    BadLayout,
    #[error("no link-layer header area to write into")]
    NoLinkHeader,
    #[error("write of {needed} bytes, {available} available")]
    NotEnoughBytes { available: usize, needed: usize },
    #[error(transparent)]
    Read(#[from] ReadErr),
}

pub type WriteResult<T> = Result<T, WriteError>;

/// Offsets of each header within the buffer.
///
/// These mirror the externally tracked "link-layer header length" and
/// "extension header length" counters of the stack that delivers the
/// packet. Every header position is derived from these two values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HdrOffsets {
    pub llh_len: usize,
    pub ext_len: usize,
}

impl HdrOffsets {
    /// Start of the IPv6 header.
    pub const fn ip(&self) -> usize {
        self.llh_len
    }

    /// Start of the ICMPv6 header.
    pub const fn icmp(&self) -> usize {
        self.llh_len + IPV6_HDR_SZ + self.ext_len
    }

    /// Start of the NS/NA body.
    pub const fn nd_msg(&self) -> usize {
        self.icmp() + ICMP6_HDR_SZ
    }

    /// Start of the ND option chain.
    pub const fn nd_opts(&self) -> usize {
        self.nd_msg() + ND_MSG_SZ
    }
}

impl Display for HdrOffsets {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "llh={} ext={}", self.llh_len, self.ext_len)
    }
}

/// The fixed IPv6 header.
#[repr(C)]
#[derive(
    Clone, Debug, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
)]
pub struct Ipv6HdrRaw {
    pub vtc_flow: [u8; 4],
    pub payload_len: [u8; 2],
    pub next_hdr: u8,
    pub hop_limit: u8,
    pub src: [u8; 16],
    pub dst: [u8; 16],
}

impl Ipv6HdrRaw {
    /// Version 6, traffic class 0, flow label 0.
    pub const DEFAULT_VTC_FLOW: [u8; 4] = [0x60, 0, 0, 0];

    pub fn source(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.src)
    }

    pub fn set_source(&mut self, ip: Ipv6Addr) {
        self.src = ip.bytes();
    }

    pub fn destination(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.dst)
    }

    pub fn set_destination(&mut self, ip: Ipv6Addr) {
        self.dst = ip.bytes();
    }

    pub fn version(&self) -> u8 {
        self.vtc_flow[0] >> 4
    }

    pub fn traffic_class(&self) -> u8 {
        (self.vtc_flow[0] << 4) | (self.vtc_flow[1] >> 4)
    }

    pub fn payload_len(&self) -> u16 {
        u16::from_be_bytes(self.payload_len)
    }

    pub fn set_payload_len(&mut self, len: u16) {
        self.payload_len = len.to_be_bytes();
    }
}

/// The ICMPv6 header, as far as ND messages are concerned.
#[repr(C)]
#[derive(
    Clone, Debug, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
)]
pub struct Icmp6HdrRaw {
    pub msg_type: u8,
    pub msg_code: u8,
    pub csum: [u8; 2],
}

/// The body of a Neighbor Solicitation or Advertisement.
///
/// For an NS the first four bytes are reserved. For an NA the first
/// byte carries the R/S/O flags.
#[repr(C)]
#[derive(
    Clone, Debug, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
)]
pub struct NdMsgRaw {
    pub flags: u8,
    pub reserved: [u8; 3],
    pub target: [u8; 16],
}

impl NdMsgRaw {
    pub fn target(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.target)
    }

    pub fn set_target(&mut self, ip: Ipv6Addr) {
        self.target = ip.bytes();
    }
}

/// A packet buffer and the offsets that give it meaning.
pub struct Packet {
    buf: Vec<u8>,
    offsets: HdrOffsets,
    len: usize,
    in_if: Interface,
}

impl Packet {
    /// Copy a frame, as received on `in_if`, into a new packet buffer.
    ///
    /// The link-layer header length is implied by the interface;
    /// `ext_len` is the total length of any IPv6 extension headers
    /// between the fixed header and the ICMPv6 header.
    pub fn new(
        frame: &[u8],
        in_if: Interface,
        ext_len: usize,
    ) -> Result<Self, ReadErr> {
        let llh_len = in_if.link_hdr_len();
        if frame.len() > PKT_BUF_SZ {
            return Err(ReadErr::TooLong { len: frame.len(), max: PKT_BUF_SZ });
        }

        if frame.len() < llh_len {
            return Err(ReadErr::NotEnoughBytes {
                offset: 0,
                needed: llh_len,
                available: frame.len(),
            });
        }

        let ip_len = frame.len() - llh_len;
        if ext_len > ip_len.saturating_sub(IPV6_HDR_SZ) {
            return Err(ReadErr::NotEnoughBytes {
                offset: llh_len + IPV6_HDR_SZ,
                needed: ext_len,
                available: ip_len.saturating_sub(IPV6_HDR_SZ),
            });
        }

        let mut buf = vec![0u8; PKT_BUF_SZ];
        buf[..frame.len()].copy_from_slice(frame);

        Ok(Self {
            buf,
            offsets: HdrOffsets { llh_len, ext_len },
            len: ip_len,
            in_if,
        })
    }

    /// The logical length: bytes from the start of the IPv6 header.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Set the logical length.
    ///
    /// A length of zero tells the transmit path there is nothing to
    /// send.
    pub fn set_len(&mut self, len: usize) -> WriteResult<()> {
        let available = self.buf.len() - self.offsets.llh_len;
        if len > available {
            return Err(WriteError::NotEnoughBytes { available, needed: len });
        }
        self.len = len;
        Ok(())
    }

    /// Mark the packet as having nothing to send.
    pub fn discard(&mut self) {
        self.len = 0;
    }

    pub fn is_discarded(&self) -> bool {
        self.len == 0
    }

    pub fn offsets(&self) -> HdrOffsets {
        self.offsets
    }

    pub fn set_ext_len(&mut self, ext_len: usize) {
        self.offsets.ext_len = ext_len;
    }

    /// The interface this packet arrived on.
    pub fn in_if(&self) -> Interface {
        self.in_if
    }

    /// One past the last logically valid byte of the buffer.
    fn end(&self) -> usize {
        self.offsets.llh_len + self.len
    }

    /// The frame as it would be handed to a link-layer driver: the
    /// link-layer header area followed by the IPv6 packet.
    pub fn frame(&self) -> &[u8] {
        &self.buf[..self.end()]
    }

    /// The Ethernet source address of the received frame, if it
    /// arrived with an Ethernet header.
    pub fn eth_src(&self) -> Option<MacAddr> {
        if self.offsets.llh_len != ETHER_HDR_SZ {
            return None;
        }
        MacAddr::from_slice(&self.buf[ETHER_ADDR_LEN..2 * ETHER_ADDR_LEN])
    }

    /// The IPv6 packet, without the link-layer header area.
    pub fn ip_bytes(&self) -> &[u8] {
        &self.buf[self.offsets.llh_len..self.end()]
    }

    /// The ICMPv6 message: header, body, and options.
    pub fn icmp_bytes(&self) -> Result<&[u8], ReadErr> {
        let start = self.offsets.icmp();
        let end = self.end();
        self.buf.get(start..end).ok_or(ReadErr::NotEnoughBytes {
            offset: start,
            needed: ICMP6_HDR_SZ,
            available: 0,
        })
    }

    fn hdr<T>(&self, offset: usize) -> Result<&T, ReadErr>
    where
        T: FromBytes + Immutable + KnownLayout + Unaligned,
    {
        let needed = size_of::<T>();
        let limit = self.end();
        let end = offset + needed;
        if end > limit {
            return Err(ReadErr::NotEnoughBytes {
                offset,
                needed,
                available: limit.saturating_sub(offset),
            });
        }
        T::ref_from_bytes(&self.buf[offset..end])
            .map_err(|_| ReadErr::BadLayout)
    }

    fn hdr_mut<T>(&mut self, offset: usize) -> WriteResult<&mut T>
    where
        T: FromBytes + IntoBytes + KnownLayout + Unaligned,
    {
        let needed = size_of::<T>();
        let end = offset + needed;
        if end > self.buf.len() {
            return Err(WriteError::NotEnoughBytes {
                available: self.buf.len().saturating_sub(offset),
                needed,
            });
        }
        T::mut_from_bytes(&mut self.buf[offset..end])
            .map_err(|_| WriteError::BadLayout)
    }

    pub fn ip6(&self) -> Result<&Ipv6HdrRaw, ReadErr> {
        self.hdr(self.offsets.ip())
    }

    pub fn ip6_mut(&mut self) -> WriteResult<&mut Ipv6HdrRaw> {
        self.hdr_mut(self.offsets.ip())
    }

    pub fn icmp6(&self) -> Result<&Icmp6HdrRaw, ReadErr> {
        self.hdr(self.offsets.icmp())
    }

    pub fn icmp6_mut(&mut self) -> WriteResult<&mut Icmp6HdrRaw> {
        self.hdr_mut(self.offsets.icmp())
    }

    pub fn nd_msg(&self) -> Result<&NdMsgRaw, ReadErr> {
        self.hdr(self.offsets.nd_msg())
    }

    pub fn nd_msg_mut(&mut self) -> WriteResult<&mut NdMsgRaw> {
        self.hdr_mut(self.offsets.nd_msg())
    }

    /// Walk the ND option chain which follows the NS/NA body, up to
    /// the logical end of the packet.
    pub fn nd_options(&self) -> NdOptions<'_> {
        let end = self.end();
        NdOptions::new(&self.buf[..end], self.offsets.nd_opts())
    }

    /// Write `src` at the logical end of the packet and grow the
    /// logical length to cover it.
    pub fn append(&mut self, src: &[u8]) -> WriteResult<()> {
        let start = self.end();
        let available = self.buf.len() - start;
        if src.len() > available {
            return Err(WriteError::NotEnoughBytes {
                available,
                needed: src.len(),
            });
        }
        self.buf[start..start + src.len()].copy_from_slice(src);
        self.len += src.len();
        Ok(())
    }

    /// Overwrite the link-layer header area.
    pub fn write_link_hdr(&mut self, hdr: &[u8]) -> WriteResult<()> {
        let llh_len = self.offsets.llh_len;
        if llh_len == 0 {
            return Err(WriteError::NoLinkHeader);
        }
        if hdr.len() != llh_len {
            return Err(WriteError::NotEnoughBytes {
                available: llh_len,
                needed: hdr.len(),
            });
        }
        self.buf[..llh_len].copy_from_slice(hdr);
        Ok(())
    }
}
