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

//! Module for importing AS-relationship snapshots in the CAIDA `as-rel` format.
//!
//! The format is line-oriented: blank lines and lines starting with `#` are skipped, every other
//! line carries at least three `|`-separated fields `<asn1>|<asn2>|<rel>[|<source>...]`, where
//! `<rel>` is `-1` (asn2 is a customer of asn1), `0` (peers), or `1` (asn2 is a provider of
//! asn1). Malformed lines are skipped and counted, never fatal. Decompression of published
//! snapshots is up to the caller; this module reads plain text.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{info, warn};

use crate::{
    network::AsGraph,
    types::{Asn, GraphError, Relation},
};

/// Capacity hint for a full Internet snapshot; the global table is below 100k ASes.
const NODE_HINT: usize = 120_000;

/// Statistics of one relationship-file ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Relationships inserted into the graph.
    pub parsed: usize,
    /// Malformed lines skipped.
    pub skipped: usize,
}

/// Build a new graph from the relationship file at `path`.
pub fn load_relationships(path: impl AsRef<Path>) -> Result<AsGraph, GraphError> {
    let file = File::open(path.as_ref())?;
    let mut graph = AsGraph::with_capacity(NODE_HINT);
    let report = read_relationships(BufReader::new(file), &mut graph)?;
    info!(
        "parsed {} relationships into {} ASes ({} skipped)",
        report.parsed,
        graph.num_ases(),
        report.skipped
    );
    Ok(graph)
}

/// Parse relationship lines from `reader` into `graph`.
pub fn read_relationships<R: BufRead>(
    reader: R,
    graph: &mut AsGraph,
) -> Result<IngestReport, GraphError> {
    let mut report = IngestReport::default();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_relation_line(line) {
            Some((a1, a2, rel)) => {
                graph.add_relation(a1, a2, rel);
                report.parsed += 1;
            }
            None => report.skipped += 1,
        }
    }
    if report.skipped > 0 {
        warn!("skipped {} malformed relationship lines", report.skipped);
    }
    Ok(report)
}

/// Parse a single `<asn1>|<asn2>|<rel>[|<source>...]` line. Fields past the third are ignored.
fn parse_relation_line(line: &str) -> Option<(Asn, Asn, Relation)> {
    let mut fields = line.split('|');
    let a1: u32 = fields.next()?.parse().ok()?;
    let a2: u32 = fields.next()?.parse().ok()?;
    let rel = match fields.next()?.parse::<i32>().ok()? {
        -1 => Relation::Customer,
        0 => Relation::Peer,
        1 => Relation::Provider,
        _ => return None,
    };
    Some((Asn(a1), Asn(a2), rel))
}
