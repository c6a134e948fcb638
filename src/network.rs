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

//! Module defining the AS-level topology: the arena of AS nodes, their business relationships,
//! and the provider-customer hierarchy (cycle check and propagation ranks).

use std::collections::HashMap;

use log::debug;
use petgraph::{algo::toposort, prelude::*};

use crate::{
    bgp::{Announcement, Policy, PolicyKind},
    types::{Asn, GraphError, IndexType, NodeId, Prefix, Relation},
};

/// A single AS in the graph.
///
/// Neighbor lists hold arena ids rather than ASNs, so the hot propagation loops traverse edges
/// without touching the ASN lookup table. The lists are symmetric by construction: `a` lists `b`
/// as a customer iff `b` lists `a` as a provider. Parallel edges are kept as-is.
#[derive(Debug, Clone)]
pub struct AsNode {
    asn: Asn,
    id: NodeId,
    providers: Vec<NodeId>,
    customers: Vec<NodeId>,
    peers: Vec<NodeId>,
    rank: Option<usize>,
    policy: Policy,
}

impl AsNode {
    fn new(asn: Asn, id: NodeId) -> Self {
        Self {
            asn,
            id,
            providers: Vec::new(),
            customers: Vec::new(),
            peers: Vec::new(),
            rank: None,
            policy: Policy::new(PolicyKind::Standard),
        }
    }

    /// The ASN of this AS.
    pub fn asn(&self) -> Asn {
        self.asn
    }

    /// The arena id of this AS.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// ASes this AS buys transit from.
    pub fn providers(&self) -> &[NodeId] {
        &self.providers
    }

    /// ASes this AS provides transit to.
    pub fn customers(&self) -> &[NodeId] {
        &self.customers
    }

    /// Settlement-free peers of this AS.
    pub fn peers(&self) -> &[NodeId] {
        &self.peers
    }

    /// The propagation rank, once [`AsGraph::flatten`] has run. Leaves (no customers) have rank
    /// 0; every provider ranks strictly above all of its customers.
    pub fn rank(&self) -> Option<usize> {
        self.rank
    }

    /// The routing policy of this AS.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub(crate) fn policy_mut(&mut self) -> &mut Policy {
        &mut self.policy
    }
}

/// The AS-level topology.
///
/// ASes live in a [`StableGraph`] arena whose directed edges are the provider→customer
/// relationships; that edge set is what the cycle check and the ranking operate on. Peer edges
/// only exist in the per-node neighbor lists. A side table maps ASNs to arena ids; the hot paths
/// never consult it.
///
/// The topology is mutated only during construction (edge insertion, policy upgrades). During
/// propagation it is read-only, and each AS mutates nothing but its own RIB and queue.
#[derive(Debug, Clone, Default)]
pub struct AsGraph {
    /// Node arena and provider→customer edge set. Node weights are the ASNs.
    pub(crate) dag: StableGraph<Asn, (), Directed, IndexType>,
    /// All AS nodes, keyed by arena id.
    pub(crate) ases: HashMap<NodeId, AsNode>,
    /// Lookup from ASN to arena id.
    pub(crate) lookup: HashMap<Asn, NodeId>,
    /// ASes grouped by propagation rank; filled by [`AsGraph::flatten`].
    pub(crate) ranked: Vec<Vec<NodeId>>,
    edges: usize,
    pc_edges: usize,
    peer_edges: usize,
}

impl AsGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph pre-sized for `n` ASes, so that bulk ingest does not rehash the ASN
    /// table or reallocate the arena.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            dag: StableGraph::with_capacity(n, 2 * n),
            ases: HashMap::with_capacity(n),
            lookup: HashMap::with_capacity(n),
            ranked: Vec::new(),
            edges: 0,
            pc_edges: 0,
            peer_edges: 0,
        }
    }

    /// Get the id of the AS with the given ASN, creating the node if it does not exist yet.
    pub fn add_as(&mut self, asn: Asn) -> NodeId {
        if let Some(&id) = self.lookup.get(&asn) {
            return id;
        }
        let id = self.dag.add_node(asn);
        self.ases.insert(id, AsNode::new(asn, id));
        self.lookup.insert(asn, id);
        id
    }

    /// Insert the relationship `rel` between `a1` and `a2` (label seen from `a1`), creating
    /// missing nodes. The edge is stored on both endpoints, so inserting
    /// `(a, b, Relation::Customer)` is the same as inserting `(b, a, Relation::Provider)`.
    /// Parallel edges are not deduplicated.
    pub fn add_relation(&mut self, a1: Asn, a2: Asn, rel: Relation) {
        let n1 = self.add_as(a1);
        let n2 = self.add_as(a2);
        self.edges += 1;

        // normalize to (provider, customer) for the DAG edge
        let (provider, customer) = match rel {
            Relation::Customer => (n1, n2),
            Relation::Provider => (n2, n1),
            Relation::Peer => {
                if let Some(node) = self.ases.get_mut(&n1) {
                    node.peers.push(n2);
                }
                if let Some(node) = self.ases.get_mut(&n2) {
                    node.peers.push(n1);
                }
                self.peer_edges += 1;
                return;
            }
        };

        if let Some(node) = self.ases.get_mut(&provider) {
            node.customers.push(customer);
        }
        if let Some(node) = self.ases.get_mut(&customer) {
            node.providers.push(provider);
        }
        self.dag.add_edge(provider, customer, ());
        self.pc_edges += 1;
    }

    /// The AS with the given ASN, if it exists.
    pub fn get(&self, asn: Asn) -> Option<&AsNode> {
        self.lookup.get(&asn).and_then(|id| self.ases.get(id))
    }

    /// The AS with the given arena id, if it exists.
    pub fn node(&self, id: NodeId) -> Option<&AsNode> {
        self.ases.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut AsNode> {
        self.ases.get_mut(&id)
    }

    /// Returns `true` if an AS with the given ASN exists.
    pub fn contains(&self, asn: Asn) -> bool {
        self.lookup.contains_key(&asn)
    }

    /// Iterate over all ASes, in unspecified order.
    pub fn ases(&self) -> impl Iterator<Item = &AsNode> {
        self.ases.values()
    }

    /// Number of ASes in the graph.
    pub fn num_ases(&self) -> usize {
        self.ases.len()
    }

    /// Total number of inserted relationships.
    pub fn num_edges(&self) -> usize {
        self.edges
    }

    /// Number of inserted provider-customer relationships.
    pub fn num_pc_edges(&self) -> usize {
        self.pc_edges
    }

    /// Number of inserted peer relationships.
    pub fn num_peer_edges(&self) -> usize {
        self.peer_edges
    }

    /// Number of ASes currently deploying origin validation.
    pub fn num_rov(&self) -> usize {
        self.ases
            .values()
            .filter(|n| n.policy.kind() == PolicyKind::Rov)
            .count()
    }

    /// ASes grouped by propagation rank. Empty until [`AsGraph::flatten`] has run.
    pub fn ranked(&self) -> &[Vec<NodeId>] {
        &self.ranked
    }

    /// Check that the provider→customer hierarchy is acyclic. Peer edges cannot create a
    /// forbidden cycle and are not part of the checked edge set.
    pub fn validate(&self) -> Result<(), GraphError> {
        match toposort(&self.dag, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(GraphError::CycleDetected(self.dag[cycle.node_id()])),
        }
    }

    /// Assign every AS its propagation rank and group the ASes by rank.
    ///
    /// Leaves (ASes without customers, including fully disconnected ASes) get rank 0; every
    /// other AS gets one plus the maximum rank of its customers. Ranks are computed in reverse
    /// topological order over the provider→customer edges, so every customer is ranked before
    /// any of its providers. Fails with [`GraphError::CycleDetected`] on a cyclic hierarchy.
    pub fn flatten(&mut self) -> Result<(), GraphError> {
        let order = toposort(&self.dag, None)
            .map_err(|cycle| GraphError::CycleDetected(self.dag[cycle.node_id()]))?;

        let mut ranks: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());
        let mut max_rank = 0;
        for id in order.into_iter().rev() {
            let rank = self
                .ases
                .get(&id)
                .map(|node| {
                    node.customers
                        .iter()
                        .filter_map(|c| ranks.get(c))
                        .map(|r| r + 1)
                        .max()
                        .unwrap_or(0)
                })
                .unwrap_or(0);
            max_rank = max_rank.max(rank);
            ranks.insert(id, rank);
        }

        self.ranked = vec![Vec::new(); max_rank + 1];
        for (id, rank) in ranks {
            if let Some(node) = self.ases.get_mut(&id) {
                node.rank = Some(rank);
            }
            self.ranked[rank].push(id);
        }

        debug!(
            "assigned ranks 0..={} to {} ASes",
            max_rank,
            self.ases.len()
        );
        Ok(())
    }

    /// Upgrade the AS with the given ASN to origin validation, replacing its previous policy and
    /// discarding any previously installed routes. Must only be called before propagation.
    /// Returns `false` if the AS does not exist.
    pub fn set_rov(&mut self, asn: Asn) -> bool {
        let Some(&id) = self.lookup.get(&asn) else {
            return false;
        };
        if let Some(node) = self.ases.get_mut(&id) {
            node.policy = Policy::new(PolicyKind::Rov);
            true
        } else {
            false
        }
    }

    /// Seed an origin announcement for `prefix` at the AS with the given ASN. The announcement
    /// is installed directly into the local RIB with `as_path = [asn]`.
    pub fn seed(&mut self, asn: Asn, prefix: Prefix, rov_invalid: bool) -> Result<(), GraphError> {
        let Some(&id) = self.lookup.get(&asn) else {
            return Err(GraphError::UnknownSeedAsn(asn));
        };
        if let Some(node) = self.ases.get_mut(&id) {
            node.policy
                .seed(Announcement::origin(prefix, asn, rov_invalid));
        }
        Ok(())
    }
}
