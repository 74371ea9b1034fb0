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

//! Counters maintained by the search drivers.

/// What a search has done so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    /// The number of decisions that have been committed
    pub nodes: u64,
    /// The number of nodes that turned out to be failed
    pub failures: u64,
    /// The number of solutions found
    pub solutions: u64,
    /// The depth of the deepest node
    pub peak_depth: usize,
}
