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

//! A lean finite domain constraint programming solver whose search is based
//! on copying rather than trailing.
//!
//! A model is stated in a `Space`: one declares variables, installs
//! constraints and adds branching directives. The space is then handed over
//! to `enumerate` (all solutions, depth first) or `optimize` (branch and
//! bound). During the search, every alternative is explored on a clone of its
//! parent space.
//!
//! ```
//! use copycp_rs::prelude::*;
//!
//! let mut space = Space::new();
//! let x = space.new_int_var(0, 3);
//! let y = space.new_int_var(0, 3);
//! space.install(&RelVar::new(x, Relation::Lt, y, 0)).unwrap();
//! space.branch(&[x, y], VarSelection::InOrder, ValSelection::Min).unwrap();
//!
//! let solutions = enumerate(space, SearchLimits::default()).count();
//! assert_eq!(6, solutions);
//! ```

pub mod constraints;
pub mod engine;
pub mod search;

pub use constraints::*;
pub use engine::*;
pub use search::*;

/// Everything that is needed to state and solve a model
pub mod prelude {
    pub use crate::constraints::*;
    pub use crate::engine::*;
    pub use crate::search::*;
}
