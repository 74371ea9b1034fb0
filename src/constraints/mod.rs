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

//! This module provides the implementation of useful constraints. Each of
//! them is a modeling construct which installs one or more propagators into
//! a space.

mod all_different;
mod count;
mod linear;
mod no_overlap;
mod or;
mod reified;
mod rel;

pub use all_different::*;
pub use count::*;
pub use linear::*;
pub use no_overlap::*;
pub use or::*;
pub use reified::*;
pub use rel::*;
