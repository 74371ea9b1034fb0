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

//! This module provides the search drivers: the depth first enumeration of
//! all solutions and the branch and bound optimization.

mod bab;
mod dfs;
mod limits;
mod statistics;

pub use bab::*;
pub use dfs::*;
pub use limits::SearchLimits;
pub use statistics::*;
