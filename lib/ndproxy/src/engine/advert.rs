// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Synthesis of Neighbor Advertisements.
//!
//! The NA is written in place over the solicitation that prompted it:
//! the buffer, and its link-layer header area, are reused as-is.

use super::checksum::icmpv6_checksum;
use super::ndp::ICMP6_NA;
use super::ndp::ND_HOP_LIMIT;
use super::ndp::ND_OPT_DATA_OFFSET;
use super::ndp::ND_OPT_ETH_LLAO_LEN;
use super::ndp::ND_OPT_UNIT;
use super::ndp::NdOptType;
use super::ndp::NdiscFlags;
use super::packet::ICMP6_HDR_SZ;
use super::packet::IPV6_HDR_SZ;
use super::packet::Ipv6HdrRaw;
use super::packet::ND_MSG_SZ;
use super::packet::Packet;
use super::packet::WriteResult;
use ndproxy_api::ETHER_ADDR_LEN;
use ndproxy_api::Interface;
use ndproxy_api::Ipv6Addr;
use ndproxy_api::PROTO_ICMPV6;

/// Write a Neighbor Advertisement from `src` to `dst` for `target`
/// into `pkt`, replacing whatever it held.
///
/// Extension headers are dropped and the logical length covers
/// exactly the IPv6 header, the ICMPv6 header, and the NA body. The
/// checksum is left zeroed; see [`finalize_checksum`].
pub fn build_na(
    pkt: &mut Packet,
    src: Ipv6Addr,
    dst: Ipv6Addr,
    target: Ipv6Addr,
    flags: NdiscFlags,
) -> WriteResult<()> {
    pkt.set_ext_len(0);

    let ip6 = pkt.ip6_mut()?;
    ip6.vtc_flow = Ipv6HdrRaw::DEFAULT_VTC_FLOW;
    ip6.set_payload_len((ICMP6_HDR_SZ + ND_MSG_SZ) as u16);
    ip6.next_hdr = PROTO_ICMPV6;
    ip6.hop_limit = ND_HOP_LIMIT;
    ip6.set_source(src);
    ip6.set_destination(dst);

    let icmp6 = pkt.icmp6_mut()?;
    icmp6.msg_type = ICMP6_NA;
    icmp6.msg_code = 0;
    icmp6.csum = [0; 2];

    let na = pkt.nd_msg_mut()?;
    na.flags = flags.bits();
    na.reserved = [0; 3];
    na.set_target(target);

    pkt.set_len(IPV6_HDR_SZ + ICMP6_HDR_SZ + ND_MSG_SZ)
}

/// Append a link-layer address option of `kind` carrying `data` to the
/// ND message in `pkt`.
///
/// Only the Ethernet option format is produced, and only when `link`
/// uses it; other link types and other option kinds are ignored.
/// Returns `true` if an option was appended.
pub fn append_option(
    pkt: &mut Packet,
    kind: NdOptType,
    data: &[u8],
    link: Interface,
) -> WriteResult<bool> {
    if !kind.is_lladdr() || !link.supports_eth_llao() {
        return Ok(false);
    }

    let mut opt = [0u8; ND_OPT_ETH_LLAO_LEN];
    opt[0] = u8::from(kind);
    opt[1] = (ND_OPT_ETH_LLAO_LEN / ND_OPT_UNIT) as u8;
    let n = data.len().min(ETHER_ADDR_LEN);
    opt[ND_OPT_DATA_OFFSET..ND_OPT_DATA_OFFSET + n].copy_from_slice(&data[..n]);
    pkt.append(&opt)?;

    let ip6 = pkt.ip6_mut()?;
    let payload_len = ip6.payload_len() + ND_OPT_ETH_LLAO_LEN as u16;
    ip6.set_payload_len(payload_len);
    Ok(true)
}

/// Zero, recompute, and store the ICMPv6 checksum of `pkt`.
pub fn finalize_checksum(pkt: &mut Packet) -> WriteResult<()> {
    pkt.icmp6_mut()?.csum = [0; 2];
    let ip6 = pkt.ip6()?;
    let (src, dst) = (ip6.source(), ip6.destination());
    let csum = icmpv6_checksum(&src, &dst, pkt.icmp_bytes()?);
    pkt.icmp6_mut()?.csum = csum.bytes();
    Ok(())
}
