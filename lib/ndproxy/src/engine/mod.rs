// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The ND proxy engine.

pub mod advert;
pub mod bridge;
pub mod checksum;
pub mod nbr;
pub mod ndp;
pub mod packet;
pub mod proxy;
pub mod stat;

pub use proxy::Disposition;
pub use proxy::NdProxy;
