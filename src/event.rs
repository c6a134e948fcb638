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

//! Module for buffering announcement deliveries between ASes.
//!
//! Within a phase, all sends are logically concurrent: the engine first buffers every export as
//! an [`Event`], then drains the queue into the receivers' policies. The final routing state does
//! not depend on the drain order (the route selection order is total), so a FIFO is sufficient.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{bgp::Announcement, types::NodeId};

/// A single announcement in flight towards a receiving AS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The receiving AS.
    pub to: NodeId,
    /// The announcement as it arrives at the receiver.
    pub ann: Announcement,
}

/// FIFO queue buffering the sends of one phase (or one rank) before delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQueue(VecDeque<Event>);

impl EventQueue {
    /// Create a new empty event queue.
    pub fn new() -> Self {
        Self(VecDeque::new())
    }

    /// Enqueue an announcement for delivery to `to`.
    pub fn push(&mut self, to: NodeId, ann: Announcement) {
        self.0.push_back(Event { to, ann });
    }

    /// Pop the next pending delivery.
    pub fn pop(&mut self) -> Option<Event> {
        self.0.pop_front()
    }

    /// Number of pending deliveries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no delivery is pending.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
