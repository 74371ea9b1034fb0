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

//! This module provides the reified constraints: each of them ties the truth
//! value of a relation to a boolean variable.

use crate::prelude::*;

use super::linear::LinearPropagator;

/// This constraint enforces that b <==> (x == v)
#[derive(Debug, Clone, Copy)]
pub struct IsEqual {
    /// A boolean variable whose value represents the equality
    b: Variable,
    /// The variable whose equality is being tested
    x: Variable,
    /// The constant
    v: isize,
}

impl IsEqual {
    /// Creates a new instance of the constraint b <==> (x == v)
    pub fn new(b: Variable, x: Variable, v: isize) -> Self {
        Self { b, x, v }
    }
}
impl ModelingConstruct for IsEqual {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        let me = space.post(Box::new(*self))?;
        space.subscribe(me, self.b, Granularity::Value)?;
        space.subscribe(me, self.x, Granularity::Domain)
    }
}
impl Propagator for IsEqual {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        if dom.is_true(self.b) {
            dom.fix(self.x, self.v)?;
        } else if dom.is_false(self.b) {
            dom.remove(self.x, self.v)?;
        } else if !dom.contains(self.x, self.v) {
            dom.fix_bool(self.b, false)?;
        } else if dom.is_fixed(self.x) {
            dom.fix_bool(self.b, true)?;
        } else {
            return Ok(PropStatus::Fixed);
        }
        Ok(PropStatus::Subsumed)
    }
    fn cost(&self) -> PropCost {
        PropCost::Binary
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(*self)
    }
}

/// This constraint enforces that b <==> sum(a_i * x_i) REL c
#[derive(Debug, Clone)]
pub struct IsLinear {
    /// A boolean variable whose value represents the linear relation
    b: Variable,
    /// The linear relation whose truth is being tested
    linear: Linear,
}

impl IsLinear {
    /// Creates a new instance of the constraint b <==> linear
    pub fn new(b: Variable, linear: Linear) -> Self {
        Self { b, linear }
    }
}
impl ModelingConstruct for IsLinear {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        let (terms, kind, rhs) = self.linear.normalized();
        let vars = terms.iter().map(|(_, x)| *x).collect::<Vec<_>>();
        let holds = LinearPropagator::new(terms, kind, rhs);
        let (terms, kind, rhs) = self.linear.negated().normalized();
        let fails = LinearPropagator::new(terms, kind, rhs);

        let me = space.post(Box::new(IsLinearPropagator {
            b: self.b,
            holds,
            fails,
        }))?;
        space.subscribe(me, self.b, Granularity::Value)?;
        for x in vars {
            space.subscribe(me, x, Granularity::Bounds)?;
        }
        Ok(())
    }
}

/// Once b is fixed, the propagation is delegated to the propagator of either
/// the relation or its negation. Until then, b gets fixed as soon as the
/// bounds of the sum decide the relation.
#[derive(Debug, Clone)]
struct IsLinearPropagator {
    b: Variable,
    holds: LinearPropagator,
    fails: LinearPropagator,
}
impl Propagator for IsLinearPropagator {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        if dom.is_true(self.b) {
            return self.holds.propagate(dom);
        }
        if dom.is_false(self.b) {
            return self.fails.propagate(dom);
        }
        let (total_min, total_max) = self.holds.refresh(dom)?;
        match self.holds.entailment(total_min, total_max) {
            Some(truth) => {
                dom.fix_bool(self.b, truth)?;
                Ok(PropStatus::Subsumed)
            }
            None => Ok(PropStatus::Fixed),
        }
    }
    fn cost(&self) -> PropCost {
        match self.holds.cost() {
            PropCost::Unary => PropCost::Binary,
            PropCost::Binary => PropCost::Linear(3),
            PropCost::Linear(n) => PropCost::Linear(n + 1),
            PropCost::Quadratic(n) => PropCost::Quadratic(n + 1),
        }
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod test_is_equal {
    use crate::prelude::*;

    #[test]
    fn when_b_is_true_x_gets_fixed() {
        let mut space = Space::new();
        let b = space.new_bool_var();
        let x = space.new_int_var(10, 20);
        space.install(&IsEqual::new(b, x, 15)).unwrap();
        space.branch(&[b, x], VarSelection::InOrder, ValSelection::Min).unwrap();
        assert_eq!(SpaceStatus::Stable, space.status());
        assert!(!space.is_fixed(x));

        assert_eq!(SpaceStatus::Solved, space.commit(Decision::Exclude(b, 0)));
        assert_eq!(Some(15), space.value(x));
    }
    #[test]
    fn when_b_is_false_v_gets_removed() {
        let mut space = Space::new();
        let b = space.new_int_var(0, 0);
        let x = space.new_int_var(10, 20);
        space.install(&IsEqual::new(b, x, 15)).unwrap();
        space.branch(&[x], VarSelection::InOrder, ValSelection::Min).unwrap();

        assert_eq!(SpaceStatus::Stable, space.status());
        assert!(!space.contains(x, 15));
        assert_eq!(10, space.size(x));
    }
    #[test]
    fn b_is_false_when_x_loses_v() {
        let mut space = Space::new();
        let b = space.new_bool_var();
        let x = space.new_int_var(10, 20);
        space.install(&IsEqual::new(b, x, 15)).unwrap();
        space.branch(&[x], VarSelection::InOrder, ValSelection::Min).unwrap();
        assert_eq!(SpaceStatus::Stable, space.status());

        assert_eq!(SpaceStatus::Stable, space.commit(Decision::Exclude(x, 15)));
        assert!(space.is_false(b));
    }
    #[test]
    fn b_is_true_when_x_is_fixed_to_v() {
        let mut space = Space::new();
        let b = space.new_bool_var();
        let x = space.new_int_var(10, 20);
        space.install(&IsEqual::new(b, x, 15)).unwrap();
        space.branch(&[x], VarSelection::InOrder, ValSelection::Min).unwrap();

        assert_eq!(SpaceStatus::Solved, space.commit(Decision::Assign(x, 15)));
        assert!(space.is_true(b));
        assert_eq!(0, space.active_propagators());
    }
}
