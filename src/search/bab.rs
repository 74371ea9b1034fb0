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

//! This module provides the branch and bound search.

use tracing::{debug, warn};

use crate::prelude::*;

use super::dfs::Bound;

/// Whether the objective is to be minimized or maximized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Smaller is better
    Minimize,
    /// Larger is better
    Maximize,
}

/// A branch and bound search. Iterating over it yields the successive
/// incumbents: each of them is strictly better than the previous one. When
/// the search has not been stopped, the last incumbent is an optimal solution.
pub struct Bab {
    dfs: Dfs,
    objective: Variable,
    direction: Direction,
    best: Option<isize>,
}

impl Bab {
    /// Starts a new branch and bound search on the given root space
    pub fn new(space: Space, objective: Variable, direction: Direction, limits: SearchLimits) -> Self {
        let bound = Bound {
            objective,
            direction,
            best: None,
        };
        Self {
            dfs: Dfs::with_bound(space, limits, Some(bound)),
            objective,
            direction,
            best: None,
        }
    }
    /// Returns the objective value of the current incumbent
    pub fn best(&self) -> Option<isize> {
        self.best
    }
    /// Returns the counters of this search
    pub fn statistics(&self) -> Statistics {
        self.dfs.statistics()
    }
    /// Returns true iff the search was interrupted by one of its limits
    pub fn stopped(&self) -> bool {
        self.dfs.stopped()
    }
    /// Returns the objective value of a solution. When the objective is not
    /// fixed, its most optimistic value is used.
    fn objective_value(&self, solution: &Space) -> Option<isize> {
        if let Some(value) = solution.value(self.objective) {
            return Some(value);
        }
        warn!("the objective is not fixed in a solution");
        match self.direction {
            Direction::Minimize => solution.min(self.objective),
            Direction::Maximize => solution.max(self.objective),
        }
    }
}

impl Iterator for Bab {
    type Item = Space;

    fn next(&mut self) -> Option<Self::Item> {
        let solution = self.dfs.next()?;
        if let Some(value) = self.objective_value(&solution) {
            debug!(value, nodes = self.dfs.statistics().nodes, "new incumbent");
            self.best = Some(value);
            self.dfs.improve_on(value);
        }
        Some(solution)
    }
}

/// Searches for an optimal solution of the model stated in `space`. It
/// returns the best solution found within the limits, or None when no
/// solution was found.
pub fn optimize(
    space: Space,
    objective: Variable,
    direction: Direction,
    limits: SearchLimits,
) -> Option<Space> {
    Bab::new(space, objective, direction, limits).last()
}
