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

#![deny(missing_docs, missing_debug_implementations)]

//! # ValleySim
//!
//! This is a library for simulating inter-domain routing on the AS-level Internet.
//!
//! Given a topology of AS business relationships (as published in CAIDA `as-rel` snapshots) and
//! a set of seeded route announcements, ValleySim computes the best route every AS installs for
//! every advertised prefix under the Gao-Rexford valley-free export rules, optionally modelling
//! route-origin validation at a chosen subset of ASes.
//!
//! ## Main Concepts
//!
//! The [`network::AsGraph`] is the main datastructure to operate on. Relationships are inserted
//! with [`network::AsGraph::add_relation`]; the provider-customer hierarchy is then flattened
//! into propagation ranks with [`network::AsGraph::flatten`], which rejects a cyclic hierarchy
//! ([`network::AsGraph::validate`] runs that cycle check standalone, without assigning ranks).
//! After seeding origin announcements,
//! [`network::AsGraph::propagate`] runs the three valley-free phases (up to providers, across to
//! peers, down to customers) to a single converged routing state. There is no message timing and
//! no convergence loop: the result is a deterministic batch computation over a frozen topology.
//!
//! The boundary adapters live in [`caida`] (relationship ingest), [`seeding`] (seed and ROV
//! lists), and [`export`] (RIB CSV export).
//!
//! ## Example usage
//!
//! ```
//! use valleysim::prelude::*;
//!
//! fn main() -> Result<(), GraphError> {
//!     let mut g = AsGraph::new();
//!
//!     // AS1 provides transit to AS3 and AS4, which both provide transit to AS5.
//!     // AS1 and AS2 peer.
//!     g.add_relation(Asn(1), Asn(3), Relation::Customer);
//!     g.add_relation(Asn(1), Asn(4), Relation::Customer);
//!     g.add_relation(Asn(3), Asn(5), Relation::Customer);
//!     g.add_relation(Asn(4), Asn(5), Relation::Customer);
//!     g.add_relation(Asn(1), Asn(2), Relation::Peer);
//!
//!     g.flatten()?;
//!
//!     let prefix: Prefix = "10.0.0.0/8".parse().unwrap();
//!     g.seed(Asn(1), prefix, false)?;
//!     g.propagate()?;
//!
//!     // AS5 hears the prefix from both of its providers and prefers the smaller neighbor.
//!     let route = g.get(Asn(5)).unwrap().policy().get(&prefix).unwrap();
//!     assert_eq!(route.as_path, vec![Asn(5), Asn(3), Asn(1)]);
//!     Ok(())
//! }
//! ```

pub mod bgp;
pub mod caida;
pub mod event;
pub mod export;
pub mod network;
pub mod prelude;
mod propagate;
pub mod seeding;
pub mod types;

#[cfg(test)]
mod test;
