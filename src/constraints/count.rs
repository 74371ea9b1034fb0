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

//! This module provides the implementation of the count constraint.

use crate::prelude::*;

/// This constraint enforces that exactly `n` of the variables take the value
/// `v`. In other words, #{i : x_i == v} == n
#[derive(Debug, Clone)]
pub struct Count {
    xs: Vec<Variable>,
    v: isize,
    n: Variable,
}
impl Count {
    /// Creates a new instance of the constraint
    pub fn new(xs: Vec<Variable>, v: isize, n: Variable) -> Self {
        Self { xs, v, n }
    }
}
impl ModelingConstruct for Count {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        let constraint = space.post(Box::new(self.clone()))?;
        for x in self.xs.iter().copied() {
            space.subscribe(constraint, x, Granularity::Domain)?;
        }
        space.subscribe(constraint, self.n, Granularity::Bounds)
    }
}
impl Propagator for Count {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        let v = self.v;
        let sure = self.xs.iter().filter(|x| dom.value(**x) == Some(v)).count() as isize;
        let possible = self.xs.iter().filter(|x| dom.contains(**x, v)).count() as isize;

        dom.remove_below(self.n, sure)?;
        dom.remove_above(self.n, possible)?;
        let nmin = dom.min(self.n).ok_or(Inconsistency)?;
        let nmax = dom.max(self.n).ok_or(Inconsistency)?;

        if sure == nmax {
            // all the remaining occurrences are forbidden
            for x in self.xs.iter().copied() {
                if !dom.is_fixed(x) {
                    dom.remove(x, v)?;
                }
            }
            dom.fix(self.n, sure)?;
        } else if possible == nmin {
            // all the possible occurrences are mandatory
            for x in self.xs.iter().copied() {
                if dom.contains(x, v) {
                    dom.fix(x, v)?;
                }
            }
            dom.fix(self.n, possible)?;
        }

        let done = dom.is_fixed(self.n) && self.xs.iter().all(|x| dom.is_fixed(*x));
        if done {
            Ok(PropStatus::Subsumed)
        } else {
            Ok(PropStatus::Fixed)
        }
    }
    fn cost(&self) -> PropCost {
        PropCost::Linear(self.xs.len() + 1)
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}
