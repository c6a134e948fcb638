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

//! Module for exporting the computed RIBs to CSV, and for reading such exports back.
//!
//! The export has the header `asn,prefix,as_path` and one row per installed route. Rows are
//! sorted by `(asn, prefix)`: hash-map iteration order is seeded per process, and sorting is what
//! makes two runs over the same inputs byte-identical.

use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
    path::Path,
};

use clap::ValueEnum;
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    network::AsGraph,
    types::{Asn, GraphError, Prefix},
};

/// The rendering of the quoted `as_path` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum PathStyle {
    /// Space-joined: `"a1 a2 a3"`. Leftmost entry is the installing AS.
    #[default]
    SpaceJoined,
    /// Tuple-literal: `"(a1, a2, a3)"`, with `"(a1,)"` for single-element paths so the column
    /// parses cleanly as a tuple.
    TupleLiteral,
}

impl std::fmt::Display for PathStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathStyle::SpaceJoined => write!(f, "space-joined"),
            PathStyle::TupleLiteral => write!(f, "tuple-literal"),
        }
    }
}

/// Write one CSV row per installed route to `out`. Returns the number of rows written.
pub fn write_ribs<W: Write>(graph: &AsGraph, mut out: W, style: PathStyle) -> io::Result<usize> {
    writeln!(out, "asn,prefix,as_path")?;

    let mut rows: Vec<(Asn, Prefix, &[Asn])> = graph
        .ases()
        .flat_map(|node| {
            node.policy()
                .rib()
                .iter()
                .map(move |(prefix, ann)| (node.asn(), *prefix, ann.as_path.as_slice()))
        })
        .collect();
    rows.sort_unstable_by_key(|&(asn, prefix, _)| (asn, prefix));

    for (asn, prefix, path) in &rows {
        writeln!(out, "{},{},\"{}\"", asn.0, prefix, fmt_path(path, style))?;
    }
    Ok(rows.len())
}

/// Export all RIBs to the CSV file at `path`.
pub fn export_ribs(
    graph: &AsGraph,
    path: impl AsRef<Path>,
    style: PathStyle,
) -> Result<usize, GraphError> {
    let file = File::create(path.as_ref())?;
    let rows = write_ribs(graph, BufWriter::new(file), style)?;
    info!("exported {} routes to {}", rows, path.as_ref().display());
    Ok(rows)
}

fn fmt_path(path: &[Asn], style: PathStyle) -> String {
    match style {
        PathStyle::SpaceJoined => path.iter().map(|asn| asn.0).join(" "),
        PathStyle::TupleLiteral => match path {
            [single] => format!("({},)", single.0),
            _ => format!("({})", path.iter().map(|asn| asn.0).join(", ")),
        },
    }
}

/// Read a RIB export back into `(asn, prefix, as_path)` triples. Both path renderings are
/// accepted. Rows that do not parse are skipped.
pub fn read_ribs<R: BufRead>(reader: R) -> Result<Vec<(Asn, Prefix, Vec<Asn>)>, GraphError> {
    let mut rows = Vec::new();
    let mut lines = reader.lines();

    // header row
    if let Some(header) = lines.next() {
        header?;
    }

    for line in lines {
        let line = line?;
        if let Some(row) = parse_rib_line(line.trim_end()) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn parse_rib_line(line: &str) -> Option<(Asn, Prefix, Vec<Asn>)> {
    let mut fields = line.splitn(3, ',');
    let asn: u32 = fields.next()?.parse().ok()?;
    let prefix: Prefix = fields.next()?.parse().ok()?;
    let path = parse_path(fields.next()?)?;
    Some((Asn(asn), prefix, path))
}

fn parse_path(field: &str) -> Option<Vec<Asn>> {
    let field = field.trim().trim_matches('"');
    let field = field
        .strip_prefix('(')
        .and_then(|f| f.strip_suffix(')'))
        .unwrap_or(field);
    field
        .split([',', ' '])
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().parse().ok().map(Asn))
        .collect()
}
