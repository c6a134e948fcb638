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

//! End-to-end tests of the three-phase propagation on the five-AS reference topology.

use super::test_network::reference_net;
use crate::{
    bgp::{Announcement, RouteSource},
    network::AsGraph,
    types::{Asn, GraphError, Prefix, Relation},
};
use lazy_static::lazy_static;
use pretty_assertions::assert_eq;

lazy_static! {
    static ref P10: Prefix = "10.0.0.0/8".parse().unwrap();
    static ref P2: Prefix = "2.0.0.0/8".parse().unwrap();
}

/// The installed AS path of `asn` for `prefix`, as plain numbers.
fn path(g: &AsGraph, asn: u32, prefix: &Prefix) -> Option<Vec<u32>> {
    g.get(Asn(asn))?
        .policy()
        .get(prefix)
        .map(|ann| ann.as_path.iter().map(|a| a.0).collect())
}

fn ready(mut g: AsGraph) -> AsGraph {
    g.flatten().unwrap();
    g
}

#[test]
fn origin_at_the_top() {
    let mut g = ready(reference_net());
    g.seed(Asn(1), *P10, false).unwrap();
    g.propagate().unwrap();

    assert_eq!(path(&g, 1, &P10), Some(vec![1]));
    // learned across the peering
    assert_eq!(path(&g, 2, &P10), Some(vec![2, 1]));
    assert_eq!(path(&g, 3, &P10), Some(vec![3, 1]));
    assert_eq!(path(&g, 4, &P10), Some(vec![4, 1]));
    // both providers offer the same length; the smaller neighbor wins
    assert_eq!(path(&g, 5, &P10), Some(vec![5, 3, 1]));
}

#[test]
fn origin_at_the_bottom() {
    let mut g = ready(reference_net());
    g.seed(Asn(5), *P2, false).unwrap();
    g.propagate().unwrap();

    assert_eq!(path(&g, 5, &P2), Some(vec![5]));
    assert_eq!(path(&g, 3, &P2), Some(vec![3, 5]));
    assert_eq!(path(&g, 4, &P2), Some(vec![4, 5]));
    // two customer routes of equal length; the smaller neighbor wins
    assert_eq!(path(&g, 1, &P2), Some(vec![1, 3, 5]));
    assert_eq!(path(&g, 2, &P2), Some(vec![2, 1, 3, 5]));
}

#[test]
fn rov_drops_the_invalid_origin() {
    let mut g = reference_net();
    assert!(g.set_rov(Asn(3)));
    assert!(g.set_rov(Asn(5)));
    let mut g = ready(g);

    g.seed(Asn(1), *P10, true).unwrap();
    g.propagate().unwrap();

    assert_eq!(path(&g, 1, &P10), Some(vec![1]));
    assert_eq!(path(&g, 2, &P10), Some(vec![2, 1]));
    // the ROV AS drops on receive, whoever the sender is
    assert_eq!(path(&g, 3, &P10), None);
    assert_eq!(path(&g, 4, &P10), Some(vec![4, 1]));
    assert_eq!(path(&g, 5, &P10), None);
    assert_eq!(g.get(Asn(3)).unwrap().policy().dropped_invalid(), 1);
}

#[test]
fn customer_route_beats_the_shorter_peer_route() {
    let mut g = ready(reference_net());
    let p: Prefix = "3.0.0.0/8".parse().unwrap();
    g.seed(Asn(5), p, false).unwrap();
    g.seed(Asn(2), p, false).unwrap();
    g.propagate().unwrap();

    // AS1 sees [1,3,5] from a customer and [1,2] from its peer; customer wins despite length
    assert_eq!(path(&g, 1, &p), Some(vec![1, 3, 5]));
    // AS2 keeps its own origin
    assert_eq!(path(&g, 2, &p), Some(vec![2]));
}

#[test]
fn a_neighbor_on_the_path_is_never_offered_the_route() {
    let mut g = ready(reference_net());
    let p: Prefix = "4.0.0.0/8".parse().unwrap();

    // crafted seed whose path already contains AS3, bypassing the origin constructor
    let node = g.node_mut(g.get(Asn(1)).unwrap().id()).unwrap();
    node.policy_mut().seed(Announcement {
        prefix: p,
        next_hop: Asn(1),
        as_path: vec![Asn(1), Asn(3)],
        source: RouteSource::Origin,
        rov_invalid: false,
    });
    g.propagate().unwrap();

    // AS3 never even enqueues the announcement
    assert_eq!(path(&g, 3, &p), None);
    // while AS4, not on the path, installs it
    assert_eq!(path(&g, 4, &p), Some(vec![4, 1, 3]));
    assert_eq!(path(&g, 5, &p), Some(vec![5, 4, 1, 3]));
}

#[test]
fn disconnected_as_stays_empty() {
    let mut g = reference_net();
    g.add_as(Asn(9));
    let mut g = ready(g);

    g.seed(Asn(1), *P10, false).unwrap();
    let installed = g.propagate().unwrap();

    assert_eq!(path(&g, 9, &P10), None);
    assert!(g.get(Asn(9)).unwrap().policy().rib().is_empty());
    assert_eq!(installed, 5);
}

#[test]
fn peer_routes_travel_a_single_hop() {
    // 1 and 2 peer, and both are customers of provider 10
    let mut g = AsGraph::new();
    g.add_relation(Asn(1), Asn(2), Relation::Peer);
    g.add_relation(Asn(10), Asn(1), Relation::Customer);
    g.add_relation(Asn(10), Asn(2), Relation::Customer);
    let mut g = ready(g);

    g.seed(Asn(1), *P10, false).unwrap();
    g.propagate().unwrap();

    // AS2 prefers the direct peer route over the one via its provider
    assert_eq!(path(&g, 2, &P10), Some(vec![2, 1]));
    assert_eq!(
        g.get(Asn(2)).unwrap().policy().get(&P10).unwrap().source,
        RouteSource::Peer
    );
    // and the provider only ever hears the route from AS1: the peer-learned
    // route at AS2 is not exported upwards
    assert_eq!(path(&g, 10, &P10), Some(vec![10, 1]));
}

#[test]
fn propagate_requires_ranks() {
    let mut g = reference_net();
    assert!(matches!(g.propagate(), Err(GraphError::MissingRank(_))));
}

#[test]
fn propagate_on_an_empty_graph() {
    let mut g = AsGraph::new();
    assert_eq!(g.propagate().unwrap(), 0);
}

#[test]
fn installed_paths_start_with_the_own_asn_and_are_loop_free() {
    let mut g = ready(reference_net());
    for (asn, prefix) in [(1u32, "10.0.0.0/8"), (5u32, "2.0.0.0/8"), (2u32, "3.0.0.0/8")] {
        g.seed(Asn(asn), prefix.parse().unwrap(), false).unwrap();
    }
    g.propagate().unwrap();

    for node in g.ases() {
        for ann in node.policy().rib().values() {
            assert_eq!(ann.as_path[0], node.asn());
            let mut seen = std::collections::HashSet::new();
            assert!(ann.as_path.iter().all(|a| seen.insert(*a)), "loop in {:?}", ann);
        }
    }
}

#[test]
fn propagation_is_idempotent_across_runs() {
    let run = || {
        let mut g = ready(reference_net());
        g.seed(Asn(1), *P10, false).unwrap();
        g.propagate().unwrap();
        (1..=5).map(|asn| path(&g, asn, &P10)).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
