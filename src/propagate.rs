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

//! The three-phase valley-free propagation engine.
//!
//! A single converged routing state is computed in three passes over the flattened hierarchy:
//!
//! 1. **Up**: ranks ascending, every AS exports its origin- and customer-learned routes to its
//!    providers; each rank processes its queue before it exports.
//! 2. **Across**: every AS exports its origin- and customer-learned routes to its peers; all
//!    sends complete before anyone processes. A peer-learned route carries
//!    [`RouteSource::Peer`] and is therefore never re-exported upwards or sideways, which bounds
//!    peer propagation to a single hop without any counter.
//! 3. **Down**: ranks descending, every AS exports everything it has installed to its customers.
//!
//! Loop prevention happens on the sender side: an announcement is never exported to a neighbor
//! that already appears on its AS path.

use log::{debug, info};

use crate::{
    bgp::RouteSource,
    event::EventQueue,
    network::AsGraph,
    types::GraphError,
};

impl AsGraph {
    /// Run the three propagation phases once each, in order, and return the total number of
    /// installed routes across all local RIBs.
    ///
    /// Requires [`AsGraph::flatten`] to have run; fails with [`GraphError::MissingRank`]
    /// otherwise. The computation is deterministic: re-running it on an identical graph and
    /// identical seeds yields identical RIBs.
    pub fn propagate(&mut self) -> Result<usize, GraphError> {
        if self.ranked.is_empty() {
            if let Some(node) = self.ases.values().next() {
                return Err(GraphError::MissingRank(node.asn()));
            }
            // an empty graph trivially converges
            return Ok(0);
        }

        let mut queue = EventQueue::new();
        self.propagate_up(&mut queue);
        self.propagate_across(&mut queue);
        self.propagate_down(&mut queue);

        let installed = self.ases().map(|n| n.policy().rib().len()).sum();
        info!("propagation converged with {} installed routes", installed);
        Ok(installed)
    }

    /// Phase 1: ranks ascending, export to providers. Only origin- and customer-learned routes
    /// may travel up. The provider receives the export as [`RouteSource::Customer`].
    fn propagate_up(&mut self, queue: &mut EventQueue) {
        debug!("phase up: exporting to providers");
        for rank in 0..self.ranked.len() {
            for &id in &self.ranked[rank] {
                let Some(node) = self.ases.get(&id) else {
                    continue;
                };
                if node.providers().is_empty() {
                    continue;
                }
                for ann in node.policy().rib().values() {
                    if !matches!(ann.source, RouteSource::Origin | RouteSource::Customer) {
                        continue;
                    }
                    for &p in node.providers() {
                        let Some(provider) = self.ases.get(&p) else {
                            continue;
                        };
                        if ann.contains(provider.asn()) {
                            continue;
                        }
                        queue.push(p, ann.forward(node.asn(), RouteSource::Customer));
                    }
                }
            }
            self.deliver(queue);
            if rank + 1 < self.ranked.len() {
                self.process_rank(rank + 1);
            }
        }
    }

    /// Phase 2: export to peers, one logical step. Every AS sends before any AS processes.
    fn propagate_across(&mut self, queue: &mut EventQueue) {
        debug!("phase across: exporting to peers");
        for node in self.ases.values() {
            if node.peers().is_empty() {
                continue;
            }
            for ann in node.policy().rib().values() {
                if !matches!(ann.source, RouteSource::Origin | RouteSource::Customer) {
                    continue;
                }
                for &q in node.peers() {
                    let Some(peer) = self.ases.get(&q) else {
                        continue;
                    };
                    if ann.contains(peer.asn()) {
                        continue;
                    }
                    queue.push(q, ann.forward(node.asn(), RouteSource::Peer));
                }
            }
        }
        self.deliver(queue);

        let ids: Vec<_> = self.ases.keys().copied().collect();
        for id in ids {
            if let Some(node) = self.ases.get_mut(&id) {
                let asn = node.asn();
                node.policy_mut().process(asn);
                node.policy_mut().clear_queue();
            }
        }
    }

    /// Phase 3: ranks descending, export to customers. Everything installed may travel down; the
    /// customer receives the export as [`RouteSource::Provider`].
    fn propagate_down(&mut self, queue: &mut EventQueue) {
        debug!("phase down: exporting to customers");
        for rank in (0..self.ranked.len()).rev() {
            for &id in &self.ranked[rank] {
                let Some(node) = self.ases.get(&id) else {
                    continue;
                };
                if node.customers().is_empty() {
                    continue;
                }
                for ann in node.policy().rib().values() {
                    for &c in node.customers() {
                        let Some(customer) = self.ases.get(&c) else {
                            continue;
                        };
                        if ann.contains(customer.asn()) {
                            continue;
                        }
                        queue.push(c, ann.forward(node.asn(), RouteSource::Provider));
                    }
                }
            }
            self.deliver(queue);
            if rank > 0 {
                self.process_rank(rank - 1);
            }
        }
    }

    /// Drain the buffered sends into the receivers' queues. Origin validation runs here, inside
    /// [`Policy::receive`](crate::bgp::Policy::receive).
    fn deliver(&mut self, queue: &mut EventQueue) {
        while let Some(event) = queue.pop() {
            if let Some(node) = self.node_mut(event.to) {
                node.policy_mut().receive(event.ann);
            }
        }
    }

    /// Let every AS of the given rank select and install its best candidates, then clear its
    /// queue.
    fn process_rank(&mut self, rank: usize) {
        let Some(ids) = self.ranked.get(rank).cloned() else {
            return;
        };
        for id in ids {
            if let Some(node) = self.ases.get_mut(&id) {
                let asn = node.asn();
                node.policy_mut().process(asn);
                node.policy_mut().clear_queue();
            }
        }
    }
}
