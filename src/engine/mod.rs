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

//! The engine module comprises the variables and their domains, the
//! propagators and the propagation engine, the branching directives and the
//! space that ties all of these together.

mod branching;
mod domain;
mod propagation;
mod propagator;
mod space;
mod sparse_set;

pub use branching::*;
pub use domain::*;
pub use propagation::*;
pub use propagator::*;
pub use space::*;
pub use sparse_set::*;
