// ValleySim: AS-level BGP propagation simulator written in Rust
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! This module contains the definition of IP prefixes, the keys of every RIB.

use std::{fmt, str::FromStr};

use ipnet::{AddrParseError, Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};

/// An IP prefix: address family, network address, and CIDR length.
///
/// Equality and hashing cover the family, the address bits exactly as written, and the length:
/// `10.1.2.3/8` and `10.0.0.0/8` are distinct prefixes, and neither aggregates the other. The
/// simulator never performs longest-prefix matching; every RIB lookup is an exact match.
///
/// Parsing accepts `a.b.c.d/n` and RFC 4291 colon-hex notation (full or `::`-abbreviated) with a
/// mandatory `/n`. The rendered form of an IPv6 prefix follows RFC 5952, so parsing and formatting
/// round-trip on every canonical input.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Prefix {
    /// An IPv4 network.
    V4(Ipv4Net),
    /// An IPv6 network.
    V6(Ipv6Net),
}

impl Prefix {
    /// Returns `true` if this is an IPv4 prefix.
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Self::V4(_))
    }

    /// Returns `true` if this is an IPv6 prefix.
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Self::V6(_))
    }

    /// The CIDR length of the prefix.
    pub fn prefix_len(&self) -> u8 {
        match self {
            Self::V4(net) => net.prefix_len(),
            Self::V6(net) => net.prefix_len(),
        }
    }
}

impl FromStr for Prefix {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // a colon can only appear in colon-hex notation
        if s.contains(':') {
            Ipv6Net::from_str(s).map(Self::V6)
        } else {
            Ipv4Net::from_str(s).map(Self::V4)
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(net) => net.fmt(f),
            Self::V6(net) => net.fmt(f),
        }
    }
}

impl From<Ipv4Net> for Prefix {
    fn from(net: Ipv4Net) -> Self {
        Self::V4(net)
    }
}

impl From<Ipv6Net> for Prefix {
    fn from(net: Ipv6Net) -> Self {
        Self::V6(net)
    }
}
