// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Print proxy state in a human-friendly manner.
//!
//! This is mostly just a place to hang printing routines so that they
//! can be used by both a gateway console and tests.

use crate::engine::NdProxy;
use crate::engine::nbr::NbrTable;
use std::io::Write;
use tabwriter::TabWriter;

/// Print the neighbor table.
pub fn print_nbr_table<const N: usize>(
    table: &NbrTable<N>,
) -> std::io::Result<()> {
    print_nbr_table_into(&mut std::io::stdout(), table)
}

/// Print the neighbor table.
pub fn print_nbr_table_into<const N: usize>(
    writer: &mut impl Write,
    table: &NbrTable<N>,
) -> std::io::Result<()> {
    let mut t = TabWriter::new(writer);

    writeln!(t, "Neighbors ({}/{})", table.len(), table.capacity())?;
    write_hrb(&mut t)?;
    writeln!(t, "SLOT\tADDRESS\tSTATE")?;
    for (slot, entry) in table.iter().enumerate() {
        writeln!(t, "{slot}\t{}\t{}", entry.addr, entry.state)?;
    }
    writeln!(t)?;
    t.flush()
}

/// Print the learned router and the proxy counters.
pub fn print_proxy_into<const N: usize>(
    writer: &mut impl Write,
    proxy: &NdProxy<N>,
) -> std::io::Result<()> {
    let bridge = proxy.bridge();
    {
        let mut t = TabWriter::new(&mut *writer);
        writeln!(t, "Link")?;
        write_hr(&mut t)?;
        writeln!(t, "GATEWAY MAC\tROUTER MAC")?;
        match bridge.router_mac() {
            Some(mac) => writeln!(t, "{}\t{mac}", bridge.gateway_mac())?,
            None => writeln!(t, "{}\tNone", bridge.gateway_mac())?,
        }
        writeln!(t, "\n{}\n", proxy.stats())?;
        t.flush()?;
    }

    print_nbr_table_into(writer, proxy.table())
}

/// Print a horizontal rule in bold.
pub fn write_hrb(t: &mut impl Write) -> std::io::Result<()> {
    writeln!(t, "{:=<70}", "=")
}

/// Print a horizontal rule.
pub fn write_hr(t: &mut impl Write) -> std::io::Result<()> {
    writeln!(t, "{:-<70}", "-")
}
