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

//! Module containing the BGP announcement value and the route selection order.

mod policy;
pub use policy::{Policy, PolicyKind};

use crate::types::{Asn, Prefix};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How an announcement arrived at the AS that holds it.
///
/// The declaration order is the route selection priority: a route learned from a customer is
/// preferred over one learned from a peer, which is preferred over one learned from a provider. A
/// locally originated route beats them all.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RouteSource {
    /// Originated by the AS itself (seeded).
    Origin,
    /// Learned from a customer.
    Customer,
    /// Learned from a peer.
    Peer,
    /// Learned from a provider.
    Provider,
}

impl std::fmt::Display for RouteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteSource::Origin => write!(f, "origin"),
            RouteSource::Customer => write!(f, "customer"),
            RouteSource::Peer => write!(f, "peer"),
            RouteSource::Provider => write!(f, "provider"),
        }
    }
}

/// A BGP announcement as exchanged between ASes.
///
/// The following attributes of a real UPDATE are omitted: LOCAL-PREF (subsumed by
/// [`RouteSource`]), MED, communities, and ORIGINATOR-ID / CLUSTER-LIST (no route reflection).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Announcement {
    /// The advertised prefix.
    pub prefix: Prefix,
    /// The immediate neighbor this announcement was received from (the origin itself for seeds).
    pub next_hop: Asn,
    /// AS path. The leftmost entry is the most recently traversed AS (the holder's own ASN once
    /// installed), the rightmost entry is the origin.
    pub as_path: Vec<Asn>,
    /// The relationship over which this announcement arrived.
    pub source: RouteSource,
    /// Origin-validation verdict, carried end-to-end from the seeder.
    pub rov_invalid: bool,
}

impl Announcement {
    /// Create a fresh origin announcement for `prefix`, seeded at `origin`.
    pub fn origin(prefix: Prefix, origin: Asn, rov_invalid: bool) -> Self {
        Self {
            prefix,
            next_hop: origin,
            as_path: vec![origin],
            source: RouteSource::Origin,
            rov_invalid,
        }
    }

    /// Create the copy of this announcement that `sender` exports to a neighbor. The path is
    /// unchanged; the receiver prepends its own ASN when it installs the route. `source` is the
    /// relationship as seen by the *receiver* (a provider receives its customer's export as
    /// [`RouteSource::Customer`]).
    pub fn forward(&self, sender: Asn, source: RouteSource) -> Self {
        Self {
            prefix: self.prefix,
            next_hop: sender,
            as_path: self.as_path.clone(),
            source,
            rov_invalid: self.rov_invalid,
        }
    }

    /// Check whether `asn` appears on the AS path (loop prevention).
    pub fn contains(&self, asn: Asn) -> bool {
        self.as_path.contains(&asn)
    }
}

impl Ord for Announcement {
    /// Route selection order; smaller is better. The keys, in order:
    ///
    /// 1. [`RouteSource`] priority (origin < customer < peer < provider),
    /// 2. shorter AS path,
    /// 3. smaller neighbor ASN.
    ///
    /// The remaining comparisons never decide a selection between real candidates (two candidates
    /// from the same neighbor cannot coexist in one queue); they only make the order total.
    fn cmp(&self, other: &Self) -> Ordering {
        match self.source.cmp(&other.source) {
            Ordering::Equal => {}
            o => return o,
        }

        match self.as_path.len().cmp(&other.as_path.len()) {
            Ordering::Equal => {}
            o => return o,
        }

        match self.next_hop.cmp(&other.next_hop) {
            Ordering::Equal => {}
            o => return o,
        }

        match self.as_path.cmp(&other.as_path) {
            Ordering::Equal => {}
            o => return o,
        }

        match self.rov_invalid.cmp(&other.rov_invalid) {
            Ordering::Equal => {}
            o => return o,
        }

        self.prefix.cmp(&other.prefix)
    }
}

impl PartialOrd for Announcement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
