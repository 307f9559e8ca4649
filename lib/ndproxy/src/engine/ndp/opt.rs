// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Walking the ND option chain.
//!
//! Each option is a type byte, a length byte counting 8-byte units
//! (the type and length included), and a body. The chain runs to the
//! end of the packet.

use super::ND_OPT_DATA_OFFSET;
use super::ND_OPT_UNIT;
use super::NdOptType;
use core::iter::FusedIterator;
use ndproxy_api::MacAddr;
use thiserror::Error;

/// A malformed option chain. Offsets are relative to the start of the
/// option region.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum OptionError {
    #[error("zero-length option at offset {offset}")]
    ZeroLength { offset: usize },
    #[error(
        "option at offset {offset} needs {needed} bytes, {available} remain"
    )]
    Truncated { offset: usize, needed: usize, available: usize },
}

/// A single option in the chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NdOpt<'a> {
    offset: usize,
    kind: NdOptType,
    units: u8,
    body: &'a [u8],
}

impl<'a> NdOpt<'a> {
    /// Offset of the option from the start of the option region.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> NdOptType {
        self.kind
    }

    /// The total size of the option in bytes.
    pub fn size(&self) -> usize {
        usize::from(self.units) * ND_OPT_UNIT
    }

    /// The option body, past the type and length bytes.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// The Ethernet address carried by a link-layer address option.
    pub fn lladdr(&self) -> Option<MacAddr> {
        if !self.kind.is_lladdr() {
            return None;
        }
        MacAddr::from_slice(self.body)
    }
}

/// An iterator over the ND option chain of a packet.
///
/// The walk is bounds-checked against the end of the packet before
/// each option header is read. The first malformed option ends the
/// walk with an error; nothing is yielded after it.
pub struct NdOptions<'a> {
    buf: &'a [u8],
    start: usize,
    pos: usize,
    failed: bool,
}

impl<'a> NdOptions<'a> {
    /// Walk the options found in `buf[start..]`.
    pub fn new(buf: &'a [u8], start: usize) -> Self {
        Self { buf, start, pos: start, failed: false }
    }

    /// The number of bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos.saturating_sub(self.start)
    }

    fn fail(
        &mut self,
        err: OptionError,
    ) -> Option<Result<NdOpt<'a>, OptionError>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for NdOptions<'a> {
    type Item = Result<NdOpt<'a>, OptionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.buf.len() {
            return None;
        }

        let offset = self.consumed();
        let available = self.buf.len() - self.pos;
        if available < ND_OPT_DATA_OFFSET {
            return self.fail(OptionError::Truncated {
                offset,
                needed: ND_OPT_DATA_OFFSET,
                available,
            });
        }

        let kind = NdOptType::from(self.buf[self.pos]);
        let units = self.buf[self.pos + 1];
        if units == 0 {
            return self.fail(OptionError::ZeroLength { offset });
        }

        let size = usize::from(units) * ND_OPT_UNIT;
        if size > available {
            return self.fail(OptionError::Truncated {
                offset,
                needed: size,
                available,
            });
        }

        let body = &self.buf[self.pos + ND_OPT_DATA_OFFSET..self.pos + size];
        self.pos += size;
        Some(Ok(NdOpt { offset, kind, units, body }))
    }
}

impl FusedIterator for NdOptions<'_> {}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::vec::Vec;

    const ROUTER_MAC: [u8; 6] = [0xca, 0x01, 0x0e, 0x81, 0x00, 0x1c];

    fn sllao() -> [u8; 8] {
        let mut opt = [1u8, 1, 0, 0, 0, 0, 0, 0];
        opt[2..].copy_from_slice(&ROUTER_MAC);
        opt
    }

    #[test]
    fn well_formed_chain() {
        // A leading pad, an MTU option, and an SLLAO.
        let mut buf = vec![0xAAu8; 4];
        buf.extend_from_slice(&[5, 1, 0, 0, 0, 0, 0x05, 0xdc]);
        buf.extend_from_slice(&sllao());
        let opts: Vec<_> =
            NdOptions::new(&buf, 4).collect::<Result<_, _>>().unwrap();

        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].kind(), NdOptType::Mtu);
        assert_eq!(opts[0].offset(), 0);
        assert_eq!(opts[0].lladdr(), None);
        assert_eq!(opts[1].kind(), NdOptType::SourceLinkLayerAddr);
        assert_eq!(opts[1].offset(), 8);
        assert_eq!(opts[1].size(), 8);
        assert_eq!(opts[1].lladdr(), Some(MacAddr::from(ROUTER_MAC)));

        let mut walk = NdOptions::new(&buf, 4);
        while walk.next().is_some() {}
        assert_eq!(walk.consumed(), buf.len() - 4);
    }

    #[test]
    fn empty_chain() {
        let buf = [0u8; 4];
        assert_eq!(NdOptions::new(&buf, 4).count(), 0);
    }

    #[test]
    fn unknown_options_are_skipped() {
        let mut buf = vec![14u8, 2];
        buf.extend_from_slice(&[0u8; 14]);
        buf.extend_from_slice(&sllao());
        let kinds: Vec<_> = NdOptions::new(&buf, 0)
            .map(|o| o.map(|o| o.kind()))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            kinds,
            vec![NdOptType::Unknown(14), NdOptType::SourceLinkLayerAddr]
        );
    }

    #[test]
    fn zero_length_option() {
        let mut buf = sllao().to_vec();
        buf.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
        buf.extend_from_slice(&sllao());
        let mut walk = NdOptions::new(&buf, 0);
        assert!(walk.next().unwrap().is_ok());
        assert_eq!(
            walk.next().unwrap(),
            Err(OptionError::ZeroLength { offset: 8 })
        );
        // The walk ends at the first error.
        assert!(walk.next().is_none());
    }

    #[test]
    fn option_overruns_packet() {
        let mut buf = sllao().to_vec();
        buf[1] = 2;
        assert_eq!(
            NdOptions::new(&buf, 0).next().unwrap(),
            Err(OptionError::Truncated { offset: 0, needed: 16, available: 8 })
        );

        // A lone type byte with no room for the length.
        let buf = [1u8];
        assert_eq!(
            NdOptions::new(&buf, 0).next().unwrap(),
            Err(OptionError::Truncated { offset: 0, needed: 2, available: 1 })
        );
    }
}
