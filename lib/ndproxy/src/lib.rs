// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The Neighbor Discovery proxy core of a 6LoWPAN-to-Ethernet gateway.
//!
//! Neighbor Solicitations arriving from the Ethernet side are answered
//! on behalf of the low-power hosts the gateway knows about, bridging
//! address resolution and NUD between the two link layers. See
//! [`engine::proxy`] for the entry points.

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::len_without_is_empty)]
#![deny(unreachable_patterns)]
#![deny(unused_must_use)]

#[macro_use]
extern crate alloc;

pub use ndproxy_api as api;

pub mod engine;
#[cfg(feature = "std")]
pub mod print;
pub mod provider;
