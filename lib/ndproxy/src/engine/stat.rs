// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Proxy counters.

use core::fmt;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProxyStats {
    /// The number of Neighbor Solicitations handed to the proxy.
    pub ns_recv: u64,

    /// The number of Neighbor Advertisements synthesized.
    pub na_sent: u64,

    /// The number of solicitations dropped for failing validation or
    /// carrying a malformed option chain.
    pub discard_malformed: u64,

    /// The number of well-formed solicitations dropped because no
    /// reply policy applied.
    pub discard_policy: u64,

    /// The number of neighbors added or refreshed from the low-power
    /// side.
    pub nbr_registered: u64,

    /// The number of times a router MAC was learned.
    pub router_learned: u64,
}

impl Display for ProxyStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ns_recv={} na_sent={} discard_malformed={} discard_policy={} \
             nbr_registered={} router_learned={}",
            self.ns_recv,
            self.na_sent,
            self.discard_malformed,
            self.discard_policy,
            self.nbr_registered,
            self.router_learned,
        )
    }
}
