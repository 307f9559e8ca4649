// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The bridge neighbor table.
//!
//! A fixed-capacity cache of the low-power hosts the gateway answers
//! for. An address present in the table in the `Reachable` state is a
//! host "known to me": Neighbor Solicitations targeting it are
//! answered by the proxy.
//!
//! Entries are never compacted. Deleting an entry only marks it
//! `GarbageCollectable`; the slot is recycled by a later insertion
//! once the table has filled up.

use core::fmt;
use core::fmt::Display;
use heapless::Vec;
use ndproxy_api::Ipv6Addr;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// The default capacity of the neighbor table.
pub const MAX_GW_NBR_ENTRIES: usize = 16;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum NbrState {
    Reachable,
    GarbageCollectable,
}

impl Display for NbrState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Reachable => "REACHABLE",
            Self::GarbageCollectable => "GC",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NbrEntry {
    pub addr: Ipv6Addr,
    pub state: NbrState,
}

impl NbrEntry {
    pub fn is_reachable(&self) -> bool {
        self.state == NbrState::Reachable
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum NbrError {
    #[error("neighbor table full: {capacity} entries, none collectable")]
    TableFull { capacity: usize },
}

/// What an [`NbrTable::add`] did to the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NbrAdd {
    /// The address was already present; it is now `Reachable`.
    Refreshed,
    /// The address took a free slot.
    Inserted,
    /// The address took over the slot of a collectable entry.
    Recycled { evicted: Ipv6Addr },
}

pub struct NbrTable<const N: usize = MAX_GW_NBR_ENTRIES> {
    entries: Vec<NbrEntry, N>,
}

impl<const N: usize> Default for NbrTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> NbrTable<N> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// The number of slots in use, collectable entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NbrEntry> {
        self.entries.iter()
    }

    /// Find the entry for `addr`, in whatever state it is.
    pub fn lookup(&self, addr: &Ipv6Addr) -> Option<&NbrEntry> {
        self.entries.iter().find(|e| e.addr == *addr)
    }

    /// Return `true` if `addr` is present and `Reachable`.
    pub fn is_reachable(&self, addr: &Ipv6Addr) -> bool {
        self.lookup(addr).is_some_and(NbrEntry::is_reachable)
    }

    /// Add `addr` as a `Reachable` neighbor.
    ///
    /// An existing entry is refreshed in place. Otherwise the address
    /// takes the next free slot or, when the table is full, the first
    /// collectable slot in table order.
    pub fn add(&mut self, addr: Ipv6Addr) -> Result<NbrAdd, NbrError> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.addr == addr)
        {
            entry.state = NbrState::Reachable;
            return Ok(NbrAdd::Refreshed);
        }

        let new = NbrEntry { addr, state: NbrState::Reachable };
        if self.entries.push(new).is_ok() {
            return Ok(NbrAdd::Inserted);
        }

        let victim = self
            .entries
            .iter_mut()
            .find(|e| e.state == NbrState::GarbageCollectable)
            .ok_or(NbrError::TableFull { capacity: N })?;
        let evicted = victim.addr;
        *victim = new;
        Ok(NbrAdd::Recycled { evicted })
    }

    /// Mark `addr` as collectable. Returns `false` if it was not in
    /// the table.
    pub fn delete(&mut self, addr: &Ipv6Addr) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| e.addr == *addr) {
            entry.state = NbrState::GarbageCollectable;
            found = true;
        }
        found
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn addr(n: u16) -> Ipv6Addr {
        Ipv6Addr::from_const([0x2001, 0xdb8, 0, 0, 0, 0, 0, n])
    }

    #[test]
    fn add_is_idempotent() {
        let mut table = NbrTable::<4>::new();
        assert_eq!(table.add(addr(1)), Ok(NbrAdd::Inserted));
        assert_eq!(table.add(addr(1)), Ok(NbrAdd::Refreshed));
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().filter(|e| e.addr == addr(1)).count(), 1);
        assert!(table.is_reachable(&addr(1)));
        assert!(!table.is_reachable(&addr(2)));
    }

    #[test]
    fn delete_is_soft() {
        let mut table = NbrTable::<4>::new();
        table.add(addr(1)).unwrap();
        assert!(table.delete(&addr(1)));
        assert!(table.delete(&addr(1)));
        assert!(!table.delete(&addr(2)));

        let entry = table.lookup(&addr(1)).unwrap();
        assert_eq!(entry.state, NbrState::GarbageCollectable);
        assert!(!table.is_reachable(&addr(1)));
        assert_eq!(table.len(), 1);

        // Adding it back refreshes the same slot.
        assert_eq!(table.add(addr(1)), Ok(NbrAdd::Refreshed));
        assert!(table.is_reachable(&addr(1)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn full_table_recycles_first_collectable() {
        let mut table = NbrTable::<3>::new();
        for n in 1..=3 {
            assert_eq!(table.add(addr(n)), Ok(NbrAdd::Inserted));
        }

        assert_eq!(
            table.add(addr(4)),
            Err(NbrError::TableFull { capacity: 3 })
        );
        // A failed insertion leaves the table untouched.
        assert!((1..=3).all(|n| table.is_reachable(&addr(n))));

        table.delete(&addr(3));
        table.delete(&addr(2));
        assert_eq!(
            table.add(addr(4)),
            Ok(NbrAdd::Recycled { evicted: addr(2) })
        );
        assert!(table.lookup(&addr(2)).is_none());
        assert!(table.is_reachable(&addr(4)));
        assert_eq!(
            table.lookup(&addr(3)).unwrap().state,
            NbrState::GarbageCollectable
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.capacity(), 3);
    }
}
