// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The Neighbor Solicitation handler.
//!
//! [`NdProxy`] holds all state the proxy keeps between packets: the
//! neighbor table, the learned router, counters, and the log. It is
//! driven one solicitation at a time by the gateway's event loop, which
//! owns it and passes it by exclusive reference; there is no hidden
//! global state.
//!
//! A solicitation moves through validation, the option walk, and the
//! reply decision. It either ends as a Neighbor Advertisement written
//! over the same buffer ([`Disposition::Reply`]) or is discarded
//! ([`Disposition::Discard`]), in which case the packet's logical
//! length is zero.
//!
//! Two reply policies exist:
//!
//! * Address resolution: the NS is sent to the solicited-node
//!   multicast group of a target the proxy knows. A link-local
//!   solicitor is answered from the link-local form of the target and
//!   the reply is steered to the serial side.
//!
//! * Neighbor unreachability detection: the NS is unicast for a target
//!   the proxy knows.

use super::advert;
use super::bridge::LinkBridge;
use super::bridge::build_ethernet_header;
use super::bridge::link_local_from_global;
use super::nbr::MAX_GW_NBR_ENTRIES;
use super::nbr::NbrAdd;
use super::nbr::NbrError;
use super::nbr::NbrTable;
use super::ndp::ICMP6_NS;
use super::ndp::ND_HOP_LIMIT;
use super::ndp::NdOptType;
use super::ndp::NdiscFlags;
use super::ndp::opt::OptionError;
use super::packet::Packet;
use super::packet::ReadErr;
use super::packet::WriteError;
use super::stat::ProxyStats;
use crate::provider::LogLevel;
use crate::provider::LogProvider;
use alloc::boxed::Box;
use alloc::vec::Vec;
use ndproxy_api::Interface;
use ndproxy_api::Ipv6Addr;
use ndproxy_api::MacAddr;
use ndproxy_api::ProxyCfg;
use thiserror::Error;

/// A solicitation that is not well-formed.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Malformed {
    #[error("ICMPv6 type {0} is not a Neighbor Solicitation")]
    MsgType(u8),
    #[error("hop limit {0}, expected 255")]
    HopLimit(u8),
    #[error("multicast target {0}")]
    MulticastTarget(Ipv6Addr),
    #[error("ICMPv6 code {0}")]
    Code(u8),
    #[error("option chain: {0}")]
    BadOption(#[from] OptionError),
    #[error("short packet: {0}")]
    Read(#[from] ReadErr),
    #[error("reply does not fit: {0}")]
    Write(#[from] WriteError),
}

/// A well-formed solicitation the proxy does not answer.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum PolicyMismatch {
    #[error("target is a gateway address")]
    TargetIsLocal,
    #[error("source is a gateway address")]
    SourceIsLocal,
    #[error("DAD probe carries a source link-layer address option")]
    DadWithLlao,
    #[error("no reply policy applies")]
    NoReplyBranch,
    #[error("no source link-layer address option")]
    NoSourceLlao,
    #[error("unspecified source address")]
    UnspecifiedSource,
    #[error("received on {0}, not the low-power side")]
    NotLowpanSide(Interface),
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ProxyError {
    #[error("malformed: {0}")]
    Malformed(#[from] Malformed),
    #[error("policy: {0}")]
    PolicyMismatch(#[from] PolicyMismatch),
    #[error(transparent)]
    Table(#[from] NbrError),
}

impl From<OptionError> for ProxyError {
    fn from(err: OptionError) -> Self {
        Self::Malformed(err.into())
    }
}

impl From<ReadErr> for ProxyError {
    fn from(err: ReadErr) -> Self {
        Self::Malformed(err.into())
    }
}

impl From<WriteError> for ProxyError {
    fn from(err: WriteError) -> Self {
        Self::Malformed(err.into())
    }
}

/// The outcome of handling one solicitation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// The packet now holds a checksummed NA to be sent on `out_if`.
    Reply { out_if: Interface },
    /// Nothing is sent; the packet's logical length is zero.
    Discard(ProxyError),
}

impl Disposition {
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply { .. })
    }
}

/// A gateway address as known to the IPv6 stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AddrRecord {
    pub addr: Ipv6Addr,
}

/// The IPv6 stack's table of the gateway's own addresses.
pub trait LocalAddrs {
    /// Find the record of a gateway address.
    fn lookup_addr(&self, addr: &Ipv6Addr) -> Option<AddrRecord>;

    /// Return `true` if `addr` is one of the gateway's addresses.
    fn is_my_addr(&self, addr: &Ipv6Addr) -> bool {
        self.lookup_addr(addr).is_some()
    }
}

/// A fixed list of gateway addresses.
#[derive(Clone, Debug, Default)]
pub struct StaticAddrs {
    addrs: Vec<Ipv6Addr>,
}

impl StaticAddrs {
    pub fn new(addrs: Vec<Ipv6Addr>) -> Self {
        Self { addrs }
    }
}

impl LocalAddrs for StaticAddrs {
    fn lookup_addr(&self, addr: &Ipv6Addr) -> Option<AddrRecord> {
        self.addrs
            .iter()
            .find(|a| *a == addr)
            .map(|a| AddrRecord { addr: *a })
    }
}

/// The link-layer transmit path.
pub trait LinkTx {
    /// Send `frame` on `out_if`. The frame starts with the link-layer
    /// header when `out_if` has one.
    fn transmit(&mut self, out_if: Interface, frame: &[u8]);
}

// The fields of a validated solicitation.
#[derive(Clone, Copy, Debug)]
struct NsInfo {
    src: Ipv6Addr,
    dst: Ipv6Addr,
    target: Ipv6Addr,
}

#[derive(Clone, Copy, Debug)]
struct ReplyPlan {
    src: Ipv6Addr,
    dst: Ipv6Addr,
    target: Ipv6Addr,
    flags: NdiscFlags,
    out_if: Interface,
}

fn validate(pkt: &Packet) -> Result<NsInfo, Malformed> {
    let ip6 = pkt.ip6()?;
    let icmp6 = pkt.icmp6()?;
    if icmp6.msg_type != ICMP6_NS {
        return Err(Malformed::MsgType(icmp6.msg_type));
    }

    if ip6.hop_limit != ND_HOP_LIMIT {
        return Err(Malformed::HopLimit(ip6.hop_limit));
    }

    let target = pkt.nd_msg()?.target();
    if target.is_multicast() {
        return Err(Malformed::MulticastTarget(target));
    }

    if icmp6.msg_code != 0 {
        return Err(Malformed::Code(icmp6.msg_code));
    }

    Ok(NsInfo { src: ip6.source(), dst: ip6.destination(), target })
}

pub struct NdProxy<const N: usize = MAX_GW_NBR_ENTRIES> {
    cfg: ProxyCfg,
    nbrs: NbrTable<N>,
    bridge: LinkBridge,
    stats: ProxyStats,
    log: Box<dyn LogProvider>,
}

impl<const N: usize> NdProxy<N> {
    pub fn new(cfg: ProxyCfg, log: Box<dyn LogProvider>) -> Self {
        Self {
            cfg,
            nbrs: NbrTable::new(),
            bridge: LinkBridge::new(cfg.gateway_mac),
            stats: ProxyStats::default(),
            log,
        }
    }

    pub fn cfg(&self) -> &ProxyCfg {
        &self.cfg
    }

    pub fn table(&self) -> &NbrTable<N> {
        &self.nbrs
    }

    pub fn bridge(&self) -> &LinkBridge {
        &self.bridge
    }

    pub fn stats(&self) -> &ProxyStats {
        &self.stats
    }

    /// Add or refresh a neighbor the proxy answers for.
    pub fn add_neighbor(
        &mut self,
        addr: Ipv6Addr,
    ) -> Result<NbrAdd, NbrError> {
        let res = self.nbrs.add(addr);
        match &res {
            Ok(NbrAdd::Recycled { evicted }) => self.log.log(
                LogLevel::Note,
                &format!("neighbor {addr} took the slot of {evicted}"),
            ),
            Ok(_) => {}
            Err(e) => self.log.log(LogLevel::Warn, &format!("{addr}: {e}")),
        }
        res
    }

    /// Stop answering for `addr`. Returns `false` if it was unknown.
    pub fn remove_neighbor(&mut self, addr: &Ipv6Addr) -> bool {
        self.nbrs.delete(addr)
    }

    /// Forget the learned router; the next Ethernet-format source
    /// link-layer address option is learned in its place.
    pub fn forget_router(&mut self) -> Option<MacAddr> {
        let mac = self.bridge.forget_router()?;
        self.log.log(LogLevel::Note, &format!("forgot router MAC {mac}"));
        Some(mac)
    }

    /// Handle one Neighbor Solicitation, rewriting `pkt` into the
    /// advertisement that answers it or discarding it.
    pub fn handle_ns(
        &mut self,
        pkt: &mut Packet,
        addrs: &impl LocalAddrs,
    ) -> Disposition {
        self.stats.ns_recv += 1;

        match self.process_ns(pkt, addrs) {
            Ok(plan) => {
                self.stats.na_sent += 1;
                self.log.log(
                    LogLevel::Note,
                    &format!(
                        "NA {} -> {} target {} on {}",
                        plan.src, plan.dst, plan.target, plan.out_if
                    ),
                );
                Disposition::Reply { out_if: plan.out_if }
            }

            Err(err) => {
                pkt.discard();
                match err {
                    ProxyError::Malformed(_) => {
                        self.stats.discard_malformed += 1
                    }
                    _ => self.stats.discard_policy += 1,
                }
                self.log.log(LogLevel::Note, &format!("discard NS: {err}"));
                Disposition::Discard(err)
            }
        }
    }

    /// Register the sender of a solicitation from the low-power side as
    /// a neighbor the proxy answers for.
    ///
    /// The solicitation must be valid, come from a specified address,
    /// and carry a source link-layer address option. The packet is not
    /// modified.
    pub fn register_neighbor(
        &mut self,
        pkt: &Packet,
    ) -> Result<NbrAdd, ProxyError> {
        let in_if = pkt.in_if();
        if !in_if.is_lowpan_side() {
            return Err(PolicyMismatch::NotLowpanSide(in_if).into());
        }

        let ns = validate(pkt)?;
        if ns.src.is_unspecified() {
            return Err(PolicyMismatch::UnspecifiedSource.into());
        }

        let mut has_sllao = false;
        for opt in pkt.nd_options() {
            has_sllao |= opt?.kind() == NdOptType::SourceLinkLayerAddr;
        }
        if !has_sllao {
            return Err(PolicyMismatch::NoSourceLlao.into());
        }

        let added = self.add_neighbor(ns.src)?;
        self.stats.nbr_registered += 1;
        Ok(added)
    }

    /// Handle a solicitation and hand any reply to `tx`.
    ///
    /// Solicitations from the low-power side first register their
    /// sender.
    pub fn input(
        &mut self,
        pkt: &mut Packet,
        addrs: &impl LocalAddrs,
        tx: &mut impl LinkTx,
    ) -> Disposition {
        if pkt.in_if().is_lowpan_side() {
            if let Err(e) = self.register_neighbor(pkt) {
                self.log.log(LogLevel::Note, &format!("no registration: {e}"));
            }
        }

        let disp = self.handle_ns(pkt, addrs);
        if let Disposition::Reply { out_if } = disp {
            let frame = if out_if.link_hdr_len() == pkt.offsets().llh_len {
                pkt.frame()
            } else {
                pkt.ip_bytes()
            };
            tx.transmit(out_if, frame);
        }
        disp
    }

    fn process_ns(
        &mut self,
        pkt: &mut Packet,
        addrs: &impl LocalAddrs,
    ) -> Result<ReplyPlan, ProxyError> {
        let ns = validate(pkt)?;

        // Walk the whole chain before acting on any option.
        if let Some(mac) = self.walk_options(pkt, &ns)? {
            self.learn_router(mac);
        }

        let plan = self.decide(&ns, addrs, pkt.in_if())?;
        self.reply(pkt, &plan)?;
        Ok(plan)
    }

    // Return the router MAC carried by the first Ethernet-format SLLAO.
    fn walk_options(
        &self,
        pkt: &Packet,
        ns: &NsInfo,
    ) -> Result<Option<MacAddr>, ProxyError> {
        let eth_format = pkt.in_if().supports_eth_llao();
        let mut router_mac = None;

        for opt in pkt.nd_options() {
            let opt = opt?;
            if opt.kind() != NdOptType::SourceLinkLayerAddr {
                continue;
            }

            if ns.src.is_unspecified() {
                return Err(PolicyMismatch::DadWithLlao.into());
            }

            if eth_format && router_mac.is_none() {
                router_mac = opt.lladdr();
            }
        }

        Ok(router_mac)
    }

    fn learn_router(&mut self, mac: MacAddr) {
        if self.bridge.learn_router_mac(mac) {
            self.stats.router_learned += 1;
            self.log.log(LogLevel::Note, &format!("learned router MAC {mac}"));
        }
    }

    fn decide(
        &self,
        ns: &NsInfo,
        addrs: &impl LocalAddrs,
        in_if: Interface,
    ) -> Result<ReplyPlan, PolicyMismatch> {
        if addrs.is_my_addr(&ns.target) {
            return Err(PolicyMismatch::TargetIsLocal);
        }

        if addrs.is_my_addr(&ns.src) {
            return Err(PolicyMismatch::SourceIsLocal);
        }

        if !self.nbrs.is_reachable(&ns.target) {
            return Err(PolicyMismatch::NoReplyBranch);
        }

        // RFC 4861 7.2.4: an NS from the unspecified address is
        // answered to all-nodes without the Solicited flag.
        let (dst, flags) = if ns.src.is_unspecified() {
            (Ipv6Addr::ALL_NODES, NdiscFlags::OVERRIDE)
        } else {
            (ns.src, NdiscFlags::SOLICITED | NdiscFlags::OVERRIDE)
        };

        if ns.dst.is_solicited_node_multicast_of(&ns.target) {
            let (src, out_if) = if ns.src.is_link_local() {
                (link_local_from_global(&ns.target), Interface::Slip)
            } else {
                (ns.target, in_if)
            };
            return Ok(ReplyPlan { src, dst, target: ns.target, flags, out_if });
        }

        // A unicast reachability check of the target.
        if !ns.dst.is_multicast() && !addrs.is_my_addr(&ns.dst) {
            return Ok(ReplyPlan {
                src: ns.target,
                dst,
                target: ns.target,
                flags,
                out_if: in_if,
            });
        }

        Err(PolicyMismatch::NoReplyBranch)
    }

    fn reply(
        &self,
        pkt: &mut Packet,
        plan: &ReplyPlan,
    ) -> Result<(), WriteError> {
        let in_if = pkt.in_if();
        let eth_out = plan.out_if == Interface::Ieee8023
            && pkt.offsets().llh_len == plan.out_if.link_hdr_len();
        // Without a learned router, answer the frame's sender.
        let eth_hdr = match (eth_out, self.bridge.eth_header()) {
            (false, _) => None,
            (true, Some(hdr)) => Some(*hdr),
            (true, None) => pkt
                .eth_src()
                .map(|mac| build_ethernet_header(mac, self.cfg.gateway_mac)),
        };

        advert::build_na(pkt, plan.src, plan.dst, plan.target, plan.flags)?;
        advert::append_option(
            pkt,
            NdOptType::TargetLinkLayerAddr,
            &self.cfg.gateway_mac,
            in_if,
        )?;
        advert::finalize_checksum(pkt)?;

        if let Some(hdr) = eth_hdr {
            pkt.write_link_hdr(&hdr)?;
        }
        Ok(())
    }
}
