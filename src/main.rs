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

use clap::Parser;
use log::info;
use std::{error::Error, path::PathBuf};

use valleysim::{caida, export, prelude::*, seeding};

/// Simulate valley-free BGP propagation over an AS-level topology and export every local RIB.
#[derive(Debug, Parser)]
struct Cli {
    /// AS relationship file (CAIDA as-rel format).
    #[clap(long)]
    relationships: PathBuf,
    /// Seed announcements CSV: `seed_asn,prefix,rov_invalid` with a header row.
    #[clap(long)]
    announcements: PathBuf,
    /// ASNs deploying route-origin validation, one per line.
    #[clap(long = "rov-asns")]
    rov_asns: Option<PathBuf>,
    /// Output CSV for the computed RIBs.
    #[clap(long, default_value = "ribs.csv")]
    output: PathBuf,
    /// Rendering of the as_path column in the output.
    #[clap(long = "path-style", value_enum, default_value_t = PathStyle::SpaceJoined)]
    path_style: PathStyle,
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let args = Cli::parse();

    let mut graph = caida::load_relationships(&args.relationships)?;
    info!(
        "built graph: {} ASes, {} edges ({} provider-customer, {} peer)",
        graph.num_ases(),
        graph.num_edges(),
        graph.num_pc_edges(),
        graph.num_peer_edges()
    );

    if let Some(path) = &args.rov_asns {
        let report = seeding::load_rov_asns(path, &mut graph)?;
        info!(
            "upgraded {} of {} listed ASes to ROV",
            report.upgraded, report.listed
        );
    }

    graph.flatten()?;
    info!("{} propagation ranks", graph.ranked().len());

    let seeds = seeding::load_seeds(&args.announcements, &mut graph)?;
    info!(
        "seeded {} announcements ({} unknown origins, {} malformed rows dropped)",
        seeds.seeded, seeds.unknown_origin, seeds.malformed
    );

    let routes = graph.propagate()?;
    info!("converged with {} installed routes", routes);

    let rows = export::export_ribs(&graph, &args.output, args.path_style)?;
    info!("wrote {} rows to {}", rows, args.output.display());

    Ok(())
}
