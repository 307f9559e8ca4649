// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Providers allow the proxy core to run in different contexts by
//! letting the embedding firmware (or a unit test) plug in the
//! services it needs. Today that is only logging: a firmware build
//! routes messages to its console, while `std` builds can use
//! [`PrintlnLog`].

use core::fmt;
use core::fmt::Display;

/// A logging provider provides the means to log messages to some
/// destination based on the context in which the proxy is running.
///
/// Logging levels are provided by [`LogLevel`]. These levels will map
/// to the underlying provider with varying degrees of success.
pub trait LogProvider: Send + Sync {
    /// Log a message at the specified level.
    fn log(&self, level: LogLevel, msg: &str);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Note,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level_s = match self {
            Self::Note => "[NOTE]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
        };
        write!(f, "{level_s}")
    }
}

/// A provider that drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopLog;

impl LogProvider for NoopLog {
    fn log(&self, _level: LogLevel, _msg: &str) {}
}

#[cfg(feature = "std")]
#[derive(Clone, Copy)]
pub struct PrintlnLog;

#[cfg(feature = "std")]
impl LogProvider for PrintlnLog {
    fn log(&self, level: LogLevel, msg: &str) {
        println!("{level} {msg}");
    }
}
