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

//! This module provides the implementation of the unary (x REL c) and binary
//! (x REL y + offset) relations.

use crate::prelude::*;

/// The relations which can be imposed between two integer quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// ==
    Eq,
    /// !=
    Ne,
    /// <=
    Le,
    /// >=
    Ge,
    /// <
    Lt,
    /// >
    Gt,
}
impl Relation {
    /// Returns true iff `lhs REL rhs` holds
    pub fn holds(self, lhs: isize, rhs: isize) -> bool {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Ne => lhs != rhs,
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
            Relation::Lt => lhs < rhs,
            Relation::Gt => lhs > rhs,
        }
    }
    /// Returns the relation that holds exactly when this one does not
    pub fn negate(self) -> Self {
        match self {
            Relation::Eq => Relation::Ne,
            Relation::Ne => Relation::Eq,
            Relation::Le => Relation::Gt,
            Relation::Ge => Relation::Lt,
            Relation::Lt => Relation::Ge,
            Relation::Gt => Relation::Le,
        }
    }
}

/// This constraint enforces that a variable be in relation with a constant.
/// x REL c
#[derive(Debug, Clone, Copy)]
pub struct RelConstant {
    x: Variable,
    rel: Relation,
    c: isize,
}
impl RelConstant {
    /// Creates a new instance of the constraint
    pub fn new(x: Variable, rel: Relation, c: isize) -> Self {
        Self { x, rel, c }
    }
}
impl ModelingConstruct for RelConstant {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        space.post(Box::new(*self))?;
        Ok(())
    }
}
impl Propagator for RelConstant {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        let Self { x, rel, c } = *self;
        match rel {
            Relation::Eq => dom.fix(x, c)?,
            Relation::Ne => dom.remove(x, c)?,
            Relation::Le => dom.remove_above(x, c)?,
            Relation::Ge => dom.remove_below(x, c)?,
            Relation::Lt => dom.remove_above(x, c - 1)?,
            Relation::Gt => dom.remove_below(x, c + 1)?,
        };
        Ok(PropStatus::Subsumed)
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(*self)
    }
}

/// This constraint enforces that a variable be in relation with another one
/// (shifted by some constant offset). x REL y + offset
#[derive(Debug, Clone, Copy)]
pub struct RelVar {
    x: Variable,
    rel: Relation,
    y: Variable,
    offset: isize,
}
impl RelVar {
    /// Creates a new instance of the constraint
    pub fn new(x: Variable, rel: Relation, y: Variable, offset: isize) -> Self {
        Self { x, rel, y, offset }
    }
}
impl ModelingConstruct for RelVar {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        let Self { x, rel, y, offset } = *self;
        match rel {
            Relation::Eq => {
                let c = space.post(Box::new(EqualVar { x, y, offset }))?;
                space.subscribe(c, x, Granularity::Domain)?;
                space.subscribe(c, y, Granularity::Domain)?;
            }
            Relation::Ne => {
                let x_fixed = space.post(Box::new(Self::on_fixed(x, y, -offset)))?;
                let y_fixed = space.post(Box::new(Self::on_fixed(y, x, offset)))?;
                space.subscribe(x_fixed, x, Granularity::Value)?;
                space.subscribe(y_fixed, y, Granularity::Value)?;
            }
            // x <= y + o
            Relation::Le => Self::less_or_equal(space, x, y, offset)?,
            // x <= y + o - 1
            Relation::Lt => Self::less_or_equal(space, x, y, offset - 1)?,
            // y <= x - o
            Relation::Ge => Self::less_or_equal(space, y, x, -offset)?,
            // y <= x - o - 1
            Relation::Gt => Self::less_or_equal(space, y, x, -offset - 1)?,
        }
        Ok(())
    }
}
impl RelVar {
    /// Removes `value(x) + shift` from y as soon as x is fixed
    fn on_fixed(x: Variable, y: Variable, shift: isize) -> impl Propagator {
        move |dom: &mut dyn DomainStore| -> CPResult<PropStatus> {
            match dom.value(x) {
                Some(v) => {
                    dom.remove(y, v + shift)?;
                    Ok(PropStatus::Subsumed)
                }
                None => Ok(PropStatus::Fixed),
            }
        }
    }
    /// x <= y + offset
    fn less_or_equal(
        space: &mut Space,
        x: Variable,
        y: Variable,
        offset: isize,
    ) -> Result<(), ModelError> {
        let c = space.post(Box::new(LessOrEqualVar { x, y, offset }))?;
        space.subscribe(c, x, Granularity::Bounds)?;
        space.subscribe(c, y, Granularity::Bounds)?;
        Ok(())
    }
}

/// x <= y + offset
#[derive(Debug, Clone, Copy)]
struct LessOrEqualVar {
    x: Variable,
    y: Variable,
    offset: isize,
}
impl Propagator for LessOrEqualVar {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        let ymax = dom.max(self.y).ok_or(Inconsistency)?;
        dom.remove_above(self.x, ymax.saturating_add(self.offset))?;
        let xmin = dom.min(self.x).ok_or(Inconsistency)?;
        dom.remove_below(self.y, xmin.saturating_sub(self.offset))?;

        let xmax = dom.max(self.x).ok_or(Inconsistency)?;
        let ymin = dom.min(self.y).ok_or(Inconsistency)?;
        if xmax <= ymin.saturating_add(self.offset) {
            Ok(PropStatus::Subsumed)
        } else {
            Ok(PropStatus::Fixed)
        }
    }
    fn cost(&self) -> PropCost {
        PropCost::Binary
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(*self)
    }
}

/// x == y + offset (domain consistent)
#[derive(Debug, Clone, Copy)]
struct EqualVar {
    x: Variable,
    y: Variable,
    offset: isize,
}
impl EqualVar {
    /// Removes from `a` all values v such that v - shift is not in `b`
    fn filter(dom: &mut dyn DomainStore, a: Variable, b: Variable, shift: isize) -> CPResult<()> {
        let amin = dom.min(a).ok_or(Inconsistency)?;
        let amax = dom.max(a).ok_or(Inconsistency)?;
        for v in amin..=amax {
            if dom.contains(a, v) && !dom.contains(b, v - shift) {
                dom.remove(a, v)?;
            }
        }
        Ok(())
    }
}
impl Propagator for EqualVar {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        let bmin = dom.min(self.y).ok_or(Inconsistency)?;
        let bmax = dom.max(self.y).ok_or(Inconsistency)?;
        dom.remove_below(self.x, bmin + self.offset)?;
        dom.remove_above(self.x, bmax + self.offset)?;

        Self::filter(dom, self.x, self.y, self.offset)?;
        Self::filter(dom, self.y, self.x, -self.offset)?;

        if dom.is_fixed(self.x) {
            Ok(PropStatus::Subsumed)
        } else {
            Ok(PropStatus::Fixed)
        }
    }
    fn cost(&self) -> PropCost {
        PropCost::Binary
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(*self)
    }
}


#[cfg(test)]
mod test_rel_var {
    use crate::prelude::*;

    fn model(rel: Relation, offset: isize) -> (Space, Variable, Variable) {
        let mut space = Space::new();
        let x = space.new_int_var(0, 10);
        let y = space.new_int_var(2, 5);
        space.install(&RelVar::new(x, rel, y, offset)).unwrap();
        space.branch(&[x, y], VarSelection::InOrder, ValSelection::Min).unwrap();
        (space, x, y)
    }

    #[test]
    fn less_or_equal_prunes_the_bounds() {
        let (mut space, x, y) = model(Relation::Le, 1);
        assert_eq!(SpaceStatus::Stable, space.status());
        assert_eq!(Some(6), space.max(x));
        assert_eq!(Some(2), space.min(y));

        assert_eq!(SpaceStatus::Stable, space.commit(Decision::AtLeast(x, 5)));
        assert_eq!(Some(4), space.min(y));
    }

    #[test]
    fn greater_than_is_mirrored() {
        let (mut space, x, y) = model(Relation::Gt, 0);
        assert_eq!(SpaceStatus::Stable, space.status());
        assert_eq!(Some(3), space.min(x));

        assert_eq!(SpaceStatus::Stable, space.commit(Decision::AtMost(x, 4)));
        assert_eq!(Some(3), space.max(y));
    }

    #[test]
    fn equal_is_domain_consistent() {
        let (mut space, x, y) = model(Relation::Eq, 2);
        assert_eq!(SpaceStatus::Stable, space.status());
        assert_eq!(vec![4, 5, 6, 7], space.domain(x).collect::<Vec<_>>());

        assert_eq!(SpaceStatus::Stable, space.commit(Decision::Exclude(x, 5)));
        assert!(!space.contains(y, 3));
        assert_eq!(SpaceStatus::Solved, space.commit(Decision::Assign(y, 4)));
        assert_eq!(Some(6), space.value(x));
    }

    #[test]
    fn not_equal_waits_for_a_fixed_variable() {
        let (mut space, x, y) = model(Relation::Ne, 1);
        assert_eq!(SpaceStatus::Stable, space.status());
        assert_eq!(11, space.size(x));

        assert_eq!(SpaceStatus::Stable, space.commit(Decision::Assign(y, 3)));
        assert!(!space.contains(x, 4));
        assert_eq!(10, space.size(x));
    }

    #[test]
    fn not_equal_propagates_from_x_to_y() {
        let (mut space, x, y) = model(Relation::Ne, 1);
        space.status();
        assert_eq!(SpaceStatus::Stable, space.commit(Decision::Assign(x, 4)));
        assert!(!space.contains(y, 3));
    }
}
