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

//! Module for loading seed announcements and ROV deployment lists.
//!
//! Both loaders recover from bad records by skipping them: a malformed line or a seed naming an
//! unknown origin is counted and logged, never fatal. Only an unreadable file aborts the run.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::warn;

use crate::{
    network::AsGraph,
    types::{Asn, GraphError, Prefix},
};

/// Statistics of one seed-file load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Announcements installed at their origin AS.
    pub seeded: usize,
    /// Seeds dropped because their origin ASN is not in the graph.
    pub unknown_origin: usize,
    /// Malformed data rows skipped.
    pub malformed: usize,
}

/// Statistics of one ROV-list load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RovReport {
    /// Valid ASNs listed in the file.
    pub listed: usize,
    /// ASes found in the graph and upgraded to ROV.
    pub upgraded: usize,
}

/// Load seed announcements from the CSV file at `path` into `graph`.
pub fn load_seeds(path: impl AsRef<Path>, graph: &mut AsGraph) -> Result<SeedReport, GraphError> {
    let file = File::open(path.as_ref())?;
    read_seeds(BufReader::new(file), graph)
}

/// Parse seed announcements from `reader` into `graph`.
///
/// The expected format is CSV with a header row, each data row being
/// `<seed_asn>,<prefix>,<rov_invalid>` with a case-insensitive boolean in the last field.
/// Trailing whitespace (including the CR of CRLF files) is trimmed.
pub fn read_seeds<R: BufRead>(reader: R, graph: &mut AsGraph) -> Result<SeedReport, GraphError> {
    let mut report = SeedReport::default();
    let mut lines = reader.lines();

    // header row
    if let Some(header) = lines.next() {
        header?;
    }

    for line in lines {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((asn, prefix, rov_invalid)) = parse_seed_line(line) else {
            report.malformed += 1;
            continue;
        };
        match graph.seed(asn, prefix, rov_invalid) {
            Ok(()) => report.seeded += 1,
            Err(GraphError::UnknownSeedAsn(asn)) => {
                warn!("dropping seed for unknown origin {}", asn);
                report.unknown_origin += 1;
            }
            Err(e) => return Err(e),
        }
    }
    if report.malformed > 0 {
        warn!("skipped {} malformed seed rows", report.malformed);
    }
    Ok(report)
}

fn parse_seed_line(line: &str) -> Option<(Asn, Prefix, bool)> {
    let mut fields = line.splitn(3, ',');
    let asn: u32 = fields.next()?.trim().parse().ok()?;
    let prefix: Prefix = fields.next()?.trim().parse().ok()?;
    let rov = fields.next()?.trim();
    let rov_invalid = if rov.eq_ignore_ascii_case("true") {
        true
    } else if rov.eq_ignore_ascii_case("false") {
        false
    } else {
        return None;
    };
    Some((Asn(asn), prefix, rov_invalid))
}

/// Load the ROV deployment list at `path` and upgrade every listed AS that exists in `graph`.
pub fn load_rov_asns(path: impl AsRef<Path>, graph: &mut AsGraph) -> Result<RovReport, GraphError> {
    let file = File::open(path.as_ref())?;
    read_rov_asns(BufReader::new(file), graph)
}

/// Parse a ROV deployment list from `reader`: one decimal ASN per line, blank lines and `#`
/// comments skipped. ASN 0 is reserved and skipped. Upgrading replaces the previous policy of the
/// AS and discards its RIB, so this must run before seeding and propagation.
pub fn read_rov_asns<R: BufRead>(reader: R, graph: &mut AsGraph) -> Result<RovReport, GraphError> {
    let mut report = RovReport::default();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Ok(asn) = line.parse::<u32>() else {
            continue;
        };
        if asn == 0 {
            continue;
        }
        report.listed += 1;
        if graph.set_rov(Asn(asn)) {
            report.upgraded += 1;
        }
    }
    Ok(report)
}
