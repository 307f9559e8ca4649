// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Routines for building Neighbor Solicitations and reading back the
//! advertisements the proxy produces. Packets are built and parsed with
//! smoltcp so the proxy is checked against an independent codec.

#![allow(dead_code)]

use ndproxy::api::ETHER_HDR_SZ;
use ndproxy::api::Interface;
use ndproxy::api::Ipv6Addr;
use ndproxy::api::MacAddr;
use ndproxy::api::ProxyCfg;
use ndproxy::engine::NdProxy;
use ndproxy::engine::packet::Packet;
use ndproxy::engine::proxy::LinkTx;
use ndproxy::engine::proxy::StaticAddrs;
use ndproxy::provider::PrintlnLog;
use smoltcp::phy::ChecksumCapabilities as CsumCapab;
use smoltcp::wire::EthernetAddress;
use smoltcp::wire::EthernetFrame;
use smoltcp::wire::EthernetProtocol;
use smoltcp::wire::EthernetRepr;
use smoltcp::wire::Icmpv6Packet;
use smoltcp::wire::Icmpv6Repr;
use smoltcp::wire::IpAddress;
use smoltcp::wire::IpProtocol;
use smoltcp::wire::Ipv6Address;
use smoltcp::wire::Ipv6Packet;
use smoltcp::wire::Ipv6Repr;
pub use smoltcp::wire::NdiscNeighborFlags;
pub use smoltcp::wire::NdiscRepr;
pub use smoltcp::wire::RawHardwareAddress;

pub const GW_MAC: MacAddr =
    MacAddr::from_const([0x00, 0x50, 0x56, 0xc0, 0x00, 0x01]);
pub const ROUTER_MAC: MacAddr =
    MacAddr::from_const([0xca, 0x01, 0x0e, 0x81, 0x00, 0x1c]);

pub fn ip(s: &str) -> Ipv6Addr {
    s.parse().unwrap()
}

pub fn to_smol(addr: Ipv6Addr) -> Ipv6Address {
    Ipv6Address::from_bytes(&addr)
}

pub fn from_smol(addr: Ipv6Address) -> Ipv6Addr {
    Ipv6Addr::from(addr.0)
}

/// Frames handed to the link-layer drivers, in order.
#[derive(Default)]
pub struct CaptureTx {
    pub sent: Vec<(Interface, Vec<u8>)>,
}

impl LinkTx for CaptureTx {
    fn transmit(&mut self, out_if: Interface, frame: &[u8]) {
        self.sent.push((out_if, frame.to_vec()));
    }
}

/// A gateway: the proxy, its own addresses, and its drivers.
pub struct Gateway {
    pub proxy: NdProxy,
    pub addrs: StaticAddrs,
    pub tx: CaptureTx,
}

impl Gateway {
    pub fn new() -> Self {
        let cfg =
            ProxyCfg::from_toml("gateway_mac = \"00:50:56:c0:00:01\"").unwrap();
        assert_eq!(cfg.gateway_mac, GW_MAC);
        Self {
            proxy: NdProxy::new(cfg, Box::new(PrintlnLog)),
            addrs: StaticAddrs::new(vec![
                ip("2001:db8::1"),
                ip("fe80::250:56ff:fec0:1"),
            ]),
            tx: CaptureTx::default(),
        }
    }

    /// Run `frame`, received on `in_if`, through the proxy.
    pub fn input(
        &mut self,
        frame: &[u8],
        in_if: Interface,
        ext_len: usize,
    ) -> (Packet, ndproxy::engine::Disposition) {
        let mut pkt = Packet::new(frame, in_if, ext_len).unwrap();
        let disp = self.proxy.input(&mut pkt, &self.addrs, &mut self.tx);
        (pkt, disp)
    }
}

// Helper type describing a Neighbor Solicitation
#[derive(Clone, Copy, Debug)]
pub struct SolicitInfo {
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
    pub src_ip: Ipv6Addr,
    pub dst_ip: Ipv6Addr,
    pub target_addr: Ipv6Addr,
    pub lladdr: Option<MacAddr>,
    pub hop_limit: u8,
}

impl SolicitInfo {
    /// An address-resolution NS from the router for `target`.
    pub fn resolve(src_ip: Ipv6Addr, target_addr: Ipv6Addr) -> Self {
        Self {
            src_mac: ROUTER_MAC,
            dst_mac: GW_MAC,
            src_ip,
            dst_ip: target_addr.solicited_node_multicast(),
            target_addr,
            lladdr: Some(ROUTER_MAC),
            hop_limit: 255,
        }
    }
}

/// Build a Neighbor Solicitation as it arrives on `in_if`.
///
/// `ext_hdr` is placed between the IPv6 header and the ICMPv6 message;
/// its first byte must already name ICMPv6 as the next header.
pub fn generate_neighbor_solicitation(
    info: &SolicitInfo,
    in_if: Interface,
    ext_hdr: &[u8],
) -> Vec<u8> {
    let solicit = Icmpv6Repr::Ndisc(NdiscRepr::NeighborSolicit {
        target_addr: to_smol(info.target_addr),
        lladdr: info.lladdr.map(|x| RawHardwareAddress::from_bytes(&x)),
    });

    let llh_len = in_if.link_hdr_len();
    let ip_off = llh_len;
    let icmp_off = ip_off + 40 + ext_hdr.len();
    let mut frame = vec![0u8; icmp_off + solicit.buffer_len()];

    if llh_len == ETHER_HDR_SZ {
        let eth = EthernetRepr {
            src_addr: EthernetAddress::from_bytes(&info.src_mac),
            dst_addr: EthernetAddress::from_bytes(&info.dst_mac),
            ethertype: EthernetProtocol::Ipv6,
        };
        eth.emit(&mut EthernetFrame::new_unchecked(&mut frame[..llh_len]));
    }

    let next_header = if ext_hdr.is_empty() {
        IpProtocol::Icmpv6
    } else {
        IpProtocol::HopByHop
    };
    let ip6 = Ipv6Repr {
        src_addr: to_smol(info.src_ip),
        dst_addr: to_smol(info.dst_ip),
        next_header,
        payload_len: ext_hdr.len() + solicit.buffer_len(),
        hop_limit: info.hop_limit,
    };
    ip6.emit(&mut Ipv6Packet::new_unchecked(&mut frame[ip_off..]));
    frame[ip_off + 40..icmp_off].copy_from_slice(ext_hdr);

    let mut csum = CsumCapab::ignored();
    csum.icmpv6 = smoltcp::phy::Checksum::Tx;
    solicit.emit(
        &IpAddress::Ipv6(to_smol(info.src_ip)),
        &IpAddress::Ipv6(to_smol(info.dst_ip)),
        &mut Icmpv6Packet::new_unchecked(&mut frame[icmp_off..]),
        &csum,
    );

    frame
}

// Helper type describing a Neighbor Advertisement
#[derive(Clone, Copy, Debug)]
pub struct AdvertInfo {
    pub src_ip: Ipv6Addr,
    pub dst_ip: Ipv6Addr,
    pub hop_limit: u8,
    pub target_addr: Ipv6Addr,
    pub lladdr: Option<MacAddr>,
    pub flags: NdiscNeighborFlags,
}

/// Split an Ethernet frame into its addresses and payload, checking
/// that it carries IPv6.
pub fn parse_ethernet(frame: &[u8]) -> (MacAddr, MacAddr, &[u8]) {
    let eth = EthernetFrame::new_checked(frame).unwrap();
    assert_eq!(eth.ethertype(), EthernetProtocol::Ipv6);
    let dst = MacAddr::from_slice(eth.dst_addr().as_bytes()).unwrap();
    let src = MacAddr::from_slice(eth.src_addr().as_bytes()).unwrap();
    (dst, src, &frame[ETHER_HDR_SZ..])
}

/// Parse an IPv6 packet holding a Neighbor Advertisement, verifying
/// its ICMPv6 checksum.
pub fn parse_neighbor_advertisement(bytes: &[u8]) -> AdvertInfo {
    let ip6 = Ipv6Packet::new_checked(bytes).unwrap();
    let ip6_repr = Ipv6Repr::parse(&ip6).unwrap();
    assert_eq!(ip6_repr.next_header, IpProtocol::Icmpv6);
    assert_eq!(ip6_repr.payload_len, bytes.len() - 40);

    let icmp = Icmpv6Packet::new_checked(ip6.payload()).unwrap();
    let mut csum = CsumCapab::ignored();
    csum.icmpv6 = smoltcp::phy::Checksum::Rx;
    let reply = Icmpv6Repr::parse(
        &IpAddress::Ipv6(ip6_repr.src_addr),
        &IpAddress::Ipv6(ip6_repr.dst_addr),
        &icmp,
        &csum,
    )
    .unwrap();

    match reply {
        Icmpv6Repr::Ndisc(NdiscRepr::NeighborAdvert {
            flags,
            target_addr,
            lladdr,
        }) => AdvertInfo {
            src_ip: from_smol(ip6_repr.src_addr),
            dst_ip: from_smol(ip6_repr.dst_addr),
            hop_limit: ip6_repr.hop_limit,
            target_addr: from_smol(target_addr),
            lladdr: lladdr.and_then(|l| MacAddr::from_slice(l.as_bytes())),
            flags,
        },

        _ => panic!("expected Neighbor Advertisement, got {:?}", reply),
    }
}
