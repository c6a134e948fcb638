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

//! Per-AS routing policy: the local RIB and the per-phase receive queue.

use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    bgp::Announcement,
    types::{Asn, Prefix},
};

/// The policy variant deployed at an AS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Plain BGP: accept every well-formed announcement.
    Standard,
    /// Route-origin validation: drop announcements flagged invalid, on receive.
    Rov,
}

/// The routing state of a single AS.
///
/// Both variants share the same concrete state: a local RIB holding at most one installed route
/// per prefix, and a receive queue collecting the candidates of the current propagation phase.
/// The variant only changes the behavior of [`Policy::receive`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    kind: PolicyKind,
    rib: HashMap<Prefix, Announcement>,
    queue: HashMap<Prefix, Vec<Announcement>>,
    dropped_invalid: usize,
}

impl Policy {
    /// Create an empty policy of the given variant.
    pub fn new(kind: PolicyKind) -> Self {
        Self {
            kind,
            rib: HashMap::new(),
            queue: HashMap::new(),
            dropped_invalid: 0,
        }
    }

    /// The policy variant.
    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Queue a candidate announcement received during the current phase. An
    /// [`Rov`](PolicyKind::Rov) policy drops (and counts) announcements with `rov_invalid` set,
    /// whatever the sender was.
    pub fn receive(&mut self, ann: Announcement) {
        if self.kind == PolicyKind::Rov && ann.rov_invalid {
            self.dropped_invalid += 1;
            trace!("dropping rov-invalid announcement for {}", ann.prefix);
            return;
        }
        self.queue.entry(ann.prefix).or_default().push(ann);
    }

    /// Select the best candidate for every queued prefix and install it into the RIB.
    ///
    /// The installed route is the best candidate with `own_asn` prepended to its path. An
    /// existing RIB entry is only replaced by a strictly better one; on a tie the incumbent
    /// stays. Returns `true` if any RIB entry changed.
    pub fn process(&mut self, own_asn: Asn) -> bool {
        let mut changed = false;
        for (prefix, candidates) in &self.queue {
            let Some(best) = candidates.iter().min() else {
                continue;
            };
            let mut installed = best.clone();
            installed.as_path.insert(0, own_asn);

            let better = match self.rib.get(prefix) {
                Some(current) => installed < *current,
                None => true,
            };
            if better {
                self.rib.insert(*prefix, installed);
                changed = true;
            }
        }
        changed
    }

    /// Empty the receive queue. Called at every phase (and rank) boundary.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Install `ann` directly into the RIB, bypassing selection. Only used to seed origin
    /// announcements, whose path already contains the origin ASN.
    pub fn seed(&mut self, ann: Announcement) {
        self.rib.insert(ann.prefix, ann);
    }

    /// The installed route for `prefix`, if any.
    pub fn get(&self, prefix: &Prefix) -> Option<&Announcement> {
        self.rib.get(prefix)
    }

    /// The full local RIB.
    pub fn rib(&self) -> &HashMap<Prefix, Announcement> {
        &self.rib
    }

    /// Number of announcements dropped by origin validation.
    pub fn dropped_invalid(&self) -> usize {
        self.dropped_invalid
    }

    /// Number of queued candidates (all prefixes).
    pub fn queue_len(&self) -> usize {
        self.queue.values().map(Vec::len).sum()
    }
}
