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

//! Module containing all shared type definitions.

use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod prefix;
pub use prefix::Prefix;

pub(crate) type IndexType = u32;
/// Identifier of an AS in the graph arena (and index into the provider-customer DAG).
pub type NodeId = NodeIndex<IndexType>;

/// AS Number
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Asn(pub u32);

impl std::fmt::Display for Asn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AS{}", self.0)
    }
}

impl From<u32> for Asn {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

impl From<u64> for Asn {
    fn from(x: u64) -> Self {
        Self(x as u32)
    }
}

impl From<usize> for Asn {
    fn from(x: usize) -> Self {
        Self(x as u32)
    }
}

/// Business relationship between two ASes, as labelled on an edge `(a1, a2)` and seen from the
/// perspective of `a1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// `a2` is a customer of `a1` (`a1` provides transit).
    Customer,
    /// `a1` and `a2` are peers.
    Peer,
    /// `a2` is a provider of `a1` (`a1` buys transit).
    Provider,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Customer => write!(f, "customer"),
            Relation::Peer => write!(f, "peer"),
            Relation::Provider => write!(f, "provider"),
        }
    }
}

/// Errors raised while building, validating, or running the simulation.
#[derive(Error, Debug)]
pub enum GraphError {
    /// An input or output file is missing, unreadable, or cannot be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The provider-customer hierarchy contains a directed cycle. The reported AS lies on it.
    #[error("provider-customer cycle through {0}")]
    CycleDetected(Asn),
    /// A seed announcement references an ASN that does not exist in the graph.
    #[error("seed origin {0} does not exist in the graph")]
    UnknownSeedAsn(Asn),
    /// An AS has no propagation rank; `flatten` must run before `propagate`.
    #[error("{0} has no propagation rank (graph not flattened)")]
    MissingRank(Asn),
}
