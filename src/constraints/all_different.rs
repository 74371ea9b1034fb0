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

//! This module provides the value consistent implementation of the all
//! different constraint.

use crate::prelude::*;

/// This constraint enforces that all variables take pairwise distinct values.
#[derive(Debug, Clone)]
pub struct AllDifferent {
    vars: Vec<Variable>,
}
impl AllDifferent {
    /// Creates a new instance of the constraint
    pub fn new(vars: Vec<Variable>) -> Self {
        Self { vars }
    }
}
impl ModelingConstruct for AllDifferent {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        if self.vars.len() < 2 {
            return Ok(());
        }
        let propagator = AllDifferentPropagator {
            vars: self.vars.clone(),
            n_fixed: 0,
        };
        let constraint = space.post(Box::new(propagator))?;
        for x in self.vars.iter().copied() {
            space.subscribe(constraint, x, Granularity::Value)?;
        }
        Ok(())
    }
}

/// Removes the value of each fixed variable from the domain of the others.
#[derive(Debug, Clone)]
struct AllDifferentPropagator {
    /// The first `n_fixed` variables are fixed and their value has been
    /// removed from all the other variables
    vars: Vec<Variable>,
    n_fixed: usize,
}
impl Propagator for AllDifferentPropagator {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        let n = self.vars.len();
        let mut i = self.n_fixed;
        while i < n {
            if let Some(v) = dom.value(self.vars[i]) {
                self.vars.swap(self.n_fixed, i);
                self.n_fixed += 1;
                for x in self.vars[self.n_fixed..].iter() {
                    dom.remove(*x, v)?;
                }
                // a removal may have fixed a variable that was already skipped
                i = self.n_fixed;
            } else {
                i += 1;
            }
        }
        if n - self.n_fixed <= 1 {
            Ok(PropStatus::Subsumed)
        } else {
            Ok(PropStatus::Fixed)
        }
    }
    fn cost(&self) -> PropCost {
        PropCost::Linear(self.vars.len())
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod test_all_different {
    use crate::prelude::*;

    #[test]
    fn fixed_values_are_removed_from_the_others() {
        let mut space = Space::new();
        let xs = space.new_int_vars(3, 0, 4);
        space.install(&AllDifferent::new(xs.clone())).unwrap();
        space.branch(&xs, VarSelection::InOrder, ValSelection::Min).unwrap();
        assert_eq!(SpaceStatus::Stable, space.status());

        assert_eq!(SpaceStatus::Stable, space.commit(Decision::Assign(xs[1], 2)));
        assert!(!space.contains(xs[0], 2));
        assert!(!space.contains(xs[2], 2));
    }

    #[test]
    fn removals_cascade() {
        let mut space = Space::new();
        let a = space.new_int_var(0, 1);
        let b = space.new_int_var(0, 1);
        let c = space.new_int_var(0, 2);
        space.install(&AllDifferent::new(vec![c, b, a])).unwrap();
        space.branch(&[a, b, c], VarSelection::InOrder, ValSelection::Min).unwrap();
        space.status();

        assert_eq!(SpaceStatus::Solved, space.commit(Decision::Assign(a, 0)));
        assert_eq!(Some(vec![0, 1, 2]), space.values(&[a, b, c]));
    }

    #[test]
    fn two_variables_fixed_to_the_same_value_fail() {
        let mut space = Space::new();
        let a = space.new_int_var(3, 3);
        let b = space.new_int_var(3, 3);
        space.install(&AllDifferent::new(vec![a, b])).unwrap();
        assert_eq!(SpaceStatus::Failed, space.status());
    }

    #[test]
    fn pigeon_hole_is_detected_by_search() {
        let mut space = Space::new();
        let xs = space.new_int_vars(4, 0, 2);
        space.install(&AllDifferent::new(xs.clone())).unwrap();
        space.branch(&xs, VarSelection::InOrder, ValSelection::Min).unwrap();
        assert_eq!(0, enumerate(space, SearchLimits::default()).count());
    }

    #[test]
    fn permutations_are_all_found() {
        let mut space = Space::new();
        let xs = space.new_int_vars(4, 1, 4);
        space.install(&AllDifferent::new(xs.clone())).unwrap();
        space.branch(&xs, VarSelection::SmallestDomain, ValSelection::Max).unwrap();
        assert_eq!(24, enumerate(space, SearchLimits::default()).count());
    }
}
