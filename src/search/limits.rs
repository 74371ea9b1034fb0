//
// copycp-rs is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License  v3
// as published by the Free Software Foundation.
//
// copycp-rs is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY.
// See the GNU Lesser General Public License  for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with copycp-rs. If not, see http://www.gnu.org/licenses/lgpl-3.0.en.html
//
// Copyright (c)  2022 by X. Gillard
//

//! This module provides the limits that can be imposed on a search.

use std::time::{Duration, Instant};

use super::Statistics;

/// The limits of a search. A search stops as soon as one of these is
/// reached. By default, a search is unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchLimits {
    /// The maximum number of explored nodes
    pub node_limit: Option<u64>,
    /// The maximum number of failed nodes
    pub fail_limit: Option<u64>,
    /// The maximum wall clock time of the search
    pub time_limit: Option<Duration>,
}

impl SearchLimits {
    /// Creates limits that never stop the search
    pub fn unlimited() -> Self {
        Self::default()
    }
    /// Sets the maximum number of explored nodes
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }
    /// Sets the maximum number of failed nodes
    pub fn with_fail_limit(mut self, failures: u64) -> Self {
        self.fail_limit = Some(failures);
        self
    }
    /// Sets the maximum wall clock time of the search
    pub fn with_time_limit(mut self, time: Duration) -> Self {
        self.time_limit = Some(time);
        self
    }
    /// Returns true iff no limit is set
    pub fn is_unlimited(&self) -> bool {
        self.node_limit.is_none() && self.fail_limit.is_none() && self.time_limit.is_none()
    }
}

/// The limits of a running search, along with the moment it was started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cutoff {
    limits: SearchLimits,
    start: Instant,
}

impl Cutoff {
    /// Starts the clock
    pub(crate) fn start(limits: SearchLimits) -> Self {
        Self {
            limits,
            start: Instant::now(),
        }
    }
    /// Returns the name of the limit that has been reached, if any
    pub(crate) fn exceeded(&self, stats: &Statistics) -> Option<&'static str> {
        let SearchLimits {
            node_limit,
            fail_limit,
            time_limit,
        } = self.limits;

        if node_limit.map_or(false, |n| stats.nodes >= n) {
            Some("node limit")
        } else if fail_limit.map_or(false, |f| stats.failures >= f) {
            Some("fail limit")
        } else if time_limit.map_or(false, |t| self.start.elapsed() >= t) {
            Some("time limit")
        } else {
            None
        }
    }
}
