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

//! Test the boundary adapters: relationship ingest, seeding, ROV lists, and the RIB export.

use super::test_network::reference_net;
use crate::{
    bgp::PolicyKind,
    caida::read_relationships,
    export::{read_ribs, write_ribs, PathStyle},
    network::AsGraph,
    seeding::{read_rov_asns, read_seeds},
    types::{Asn, Prefix},
};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

const REL_FILE: &str = "\
# source: caida serial-2, snapshot for tests
# asn1|asn2|rel|source

1|2|0|bgp
1|3|-1|bgp
1|4|-1
3|5|-1
4|5|-1
not|a|line
7|8|2
9|9
";

#[test]
fn relationship_ingest() {
    let mut g = AsGraph::new();
    let report = read_relationships(REL_FILE.as_bytes(), &mut g).unwrap();

    assert_eq!(report.parsed, 5);
    assert_eq!(report.skipped, 3);
    assert_eq!(g.num_ases(), 5);
    assert_eq!(g.num_pc_edges(), 4);
    assert_eq!(g.num_peer_edges(), 1);
    // the malformed lines created no nodes
    assert!(!g.contains(Asn(7)));
    assert!(!g.contains(Asn(9)));
}

#[test]
fn relationship_ingest_matches_the_reference_net() {
    let mut g = AsGraph::new();
    read_relationships(REL_FILE.as_bytes(), &mut g).unwrap();
    let reference = reference_net();

    for asn in 1..=5u32 {
        let built = g.get(Asn(asn)).unwrap();
        let expected = reference.get(Asn(asn)).unwrap();
        assert_eq!(built.providers().len(), expected.providers().len());
        assert_eq!(built.customers().len(), expected.customers().len());
        assert_eq!(built.peers().len(), expected.peers().len());
    }
}

#[test]
fn seed_ingest() {
    let mut g = reference_net();
    let csv = "seed_asn,prefix,rov_invalid\n\
               1,10.0.0.0/8,False\n\
               5,2.0.0.0/8,TRUE\r\n\
               2, 3.0.0.0/8 , true\n\
               99,4.0.0.0/8,false\n\
               3,not-a-prefix,false\n\
               3,5.0.0.0/8,maybe\n";
    let report = read_seeds(csv.as_bytes(), &mut g).unwrap();

    assert_eq!(report.seeded, 3);
    assert_eq!(report.unknown_origin, 1);
    assert_eq!(report.malformed, 2);

    let p10: Prefix = "10.0.0.0/8".parse().unwrap();
    let p2: Prefix = "2.0.0.0/8".parse().unwrap();
    let p3: Prefix = "3.0.0.0/8".parse().unwrap();
    assert!(!g.get(Asn(1)).unwrap().policy().get(&p10).unwrap().rov_invalid);
    assert!(g.get(Asn(5)).unwrap().policy().get(&p2).unwrap().rov_invalid);
    assert!(!g.get(Asn(2)).unwrap().policy().get(&p3).unwrap().rov_invalid);
}

#[test]
fn rov_list_ingest() {
    let mut g = reference_net();
    let list = "# deployment list\n3\n\n5\n0\n99\nnot-an-asn\n";
    let report = read_rov_asns(list.as_bytes(), &mut g).unwrap();

    // 99 is listed but absent from the graph; 0 and the garbage line are not ASNs
    assert_eq!(report.listed, 3);
    assert_eq!(report.upgraded, 2);
    assert_eq!(g.num_rov(), 2);
    assert_eq!(g.get(Asn(3)).unwrap().policy().kind(), PolicyKind::Rov);
    assert_eq!(g.get(Asn(1)).unwrap().policy().kind(), PolicyKind::Standard);
}

fn propagated_reference_net() -> AsGraph {
    let mut g = reference_net();
    g.flatten().unwrap();
    g.seed(Asn(1), "10.0.0.0/8".parse().unwrap(), false).unwrap();
    g.propagate().unwrap();
    g
}

#[test]
fn export_space_joined() {
    let g = propagated_reference_net();
    let mut out = Vec::new();
    let rows = write_ribs(&g, &mut out, PathStyle::SpaceJoined).unwrap();

    assert_eq!(rows, 5);
    let expected = "\
asn,prefix,as_path
1,10.0.0.0/8,\"1\"
2,10.0.0.0/8,\"2 1\"
3,10.0.0.0/8,\"3 1\"
4,10.0.0.0/8,\"4 1\"
5,10.0.0.0/8,\"5 3 1\"
";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn export_tuple_literal() {
    let g = propagated_reference_net();
    let mut out = Vec::new();
    write_ribs(&g, &mut out, PathStyle::TupleLiteral).unwrap();

    let expected = "\
asn,prefix,as_path
1,10.0.0.0/8,\"(1,)\"
2,10.0.0.0/8,\"(2, 1)\"
3,10.0.0.0/8,\"(3, 1)\"
4,10.0.0.0/8,\"(4, 1)\"
5,10.0.0.0/8,\"(5, 3, 1)\"
";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn export_reimport_roundtrip() {
    let g = propagated_reference_net();
    for style in [PathStyle::SpaceJoined, PathStyle::TupleLiteral] {
        let mut out = Vec::new();
        write_ribs(&g, &mut out, style).unwrap();
        let rows = read_ribs(out.as_slice()).unwrap();

        let exported: BTreeSet<_> = rows.into_iter().collect();
        let expected: BTreeSet<_> = g
            .ases()
            .flat_map(|node| {
                node.policy()
                    .rib()
                    .iter()
                    .map(move |(prefix, ann)| (node.asn(), *prefix, ann.as_path.clone()))
            })
            .collect();
        assert_eq!(exported, expected);
    }
}

#[test]
fn export_is_deterministic_across_runs() {
    let export = || {
        let mut out = Vec::new();
        write_ribs(&propagated_reference_net(), &mut out, PathStyle::SpaceJoined).unwrap();
        out
    };
    assert_eq!(export(), export());
}

#[test]
fn export_covers_both_address_families() {
    let mut g = reference_net();
    g.flatten().unwrap();
    g.seed(Asn(5), "2001:db8::/32".parse().unwrap(), false).unwrap();
    g.seed(Asn(5), "2.0.0.0/8".parse().unwrap(), false).unwrap();
    g.propagate().unwrap();

    let mut out = Vec::new();
    write_ribs(&g, &mut out, PathStyle::SpaceJoined).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("5,2.0.0.0/8,\"5\""));
    assert!(text.contains("5,2001:db8::/32,\"5\""));
}
