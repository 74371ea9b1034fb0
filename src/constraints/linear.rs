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

//! This module provides the implementation of the linear constraint.

use crate::prelude::*;

/// This constraint enforces a linear relation between a weighted sum of
/// variables and a constant. In other words, sum(a_i * x_i) REL c
#[derive(Debug, Clone)]
pub struct Linear {
    /// The weighted terms of the sum
    terms: Vec<(isize, Variable)>,
    /// The relation
    rel: Relation,
    /// The right hand side
    rhs: isize,
}

impl Linear {
    /// Creates a constraint on the plain sum of the given variables
    pub fn sum(xs: Vec<Variable>, rel: Relation, rhs: isize) -> Self {
        Self {
            terms: xs.into_iter().map(|x| (1, x)).collect(),
            rel,
            rhs,
        }
    }
    /// Creates a constraint on the weighted sum of the given variables
    pub fn weighted(
        coefs: Vec<isize>,
        xs: Vec<Variable>,
        rel: Relation,
        rhs: isize,
    ) -> Result<Self, ModelError> {
        if coefs.len() != xs.len() {
            return Err(ModelError::ArgumentMismatch {
                constraint: "linear",
                expected: xs.len(),
                actual: coefs.len(),
            });
        }
        Ok(Self {
            terms: coefs.into_iter().zip(xs).collect(),
            rel,
            rhs,
        })
    }
    /// Returns the constraint that holds exactly when this one does not
    pub(super) fn negated(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            rel: self.rel.negate(),
            rhs: self.rhs,
        }
    }
    /// Rewrites the constraint as `sum(a_i * x_i) KIND rhs` where KIND is
    /// one of ==, != or <=
    pub(super) fn normalized(&self) -> (Vec<(isize, Variable)>, LinearKind, isize) {
        let (negate, kind, rhs) = match self.rel {
            Relation::Eq => (false, LinearKind::Eq, self.rhs),
            Relation::Ne => (false, LinearKind::Ne, self.rhs),
            Relation::Le => (false, LinearKind::Le, self.rhs),
            Relation::Lt => (false, LinearKind::Le, self.rhs - 1),
            Relation::Ge => (true, LinearKind::Le, -self.rhs),
            Relation::Gt => (true, LinearKind::Le, -self.rhs - 1),
        };
        let terms = self
            .terms
            .iter()
            .filter(|(a, _)| *a != 0)
            .map(|&(a, x)| if negate { (-a, x) } else { (a, x) })
            .collect();
        (terms, kind, rhs)
    }
}

impl ModelingConstruct for Linear {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        let (terms, kind, rhs) = self.normalized();
        let vars = terms.iter().map(|(_, x)| *x).collect::<Vec<_>>();
        let granularity = match kind {
            LinearKind::Ne => Granularity::Value,
            LinearKind::Eq | LinearKind::Le => Granularity::Bounds,
        };

        let propag = space.post(Box::new(LinearPropagator::new(terms, kind, rhs)))?;
        for x in vars {
            space.subscribe(propag, x, granularity)?;
        }
        Ok(())
    }
}

/// The normal forms of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LinearKind {
    Eq,
    Ne,
    Le,
}

/// A weighted term: a variable along with some bookkeeping of the min and
/// max of the product `coef * var`. The whole point of this structure is to
/// make it easy to swap terms in the propagator so as to facilitate the
/// tracking of the fixed/unfixed vars.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct Term {
    coef: isize,
    var: Variable,
    min: isize,
    max: isize,
}

/// This is the propagator that gets used to propagate a linear constraint.
///
/// At any point of time, the propagator tracks the terms that are fixed and
/// those that are not, along with the partial sum of the fixed terms. This
/// bookkeeping is part of the state of the propagator, hence it is copied
/// along with the space that owns it.
///
/// The bounds propagation is the following: a lower and an upper bound on
/// the total sum are computed based on the terms that have not been fixed.
/// Then, for any term `a*x`, the sum of the others is used to bound `a*x`
/// from above (for <= and ==) and from below (for ==).
#[derive(Debug, Clone)]
pub(super) struct LinearPropagator {
    /// This structure maintains the invariant that the first `n_fixed`
    /// elements of the list are fixed and the others remain open.
    terms: Vec<Term>,
    /// The normal form of the constraint
    kind: LinearKind,
    /// The right hand side
    rhs: isize,
    /// This integer delimitates the region in `terms` that comprises only
    /// fixed variables
    n_fixed: usize,
    /// This integer simply keeps track of the partial sum of the fixed terms
    partial: isize,
}

impl LinearPropagator {
    /// Creates a propagator for the given linear constraint
    pub(super) fn new(terms: Vec<(isize, Variable)>, kind: LinearKind, rhs: isize) -> Self {
        let terms = terms
            .into_iter()
            .map(|(coef, var)| Term {
                coef,
                var,
                min: 0,
                max: 0,
            })
            .collect();
        Self {
            terms,
            kind,
            rhs,
            n_fixed: 0,
            partial: 0,
        }
    }
    /// Refreshes the bounds of the open terms, moves the fixed ones to the
    /// front and returns the bounds of the total sum
    pub(super) fn refresh(&mut self, dom: &dyn DomainStore) -> CPResult<(isize, isize)> {
        let mut total_min = self.partial;
        let mut total_max = self.partial;

        for i in self.n_fixed..self.terms.len() {
            let mut t = self.terms[i];
            let lo = dom.min(t.var).ok_or(Inconsistency)?;
            let hi = dom.max(t.var).ok_or(Inconsistency)?;
            if t.coef > 0 {
                t.min = t.coef.saturating_mul(lo);
                t.max = t.coef.saturating_mul(hi);
            } else {
                t.min = t.coef.saturating_mul(hi);
                t.max = t.coef.saturating_mul(lo);
            }
            self.terms[i] = t;

            if lo == hi {
                self.terms.swap(self.n_fixed, i);
                self.n_fixed += 1;
                self.partial = self.partial.saturating_add(t.min);
            }
            total_min = total_min.saturating_add(t.min);
            total_max = total_max.saturating_add(t.max);
        }
        Ok((total_min, total_max))
    }
    /// Tells whether the constraint is sure to hold (Some(true)) or to be
    /// violated (Some(false)) given the bounds of the sum
    pub(super) fn entailment(&self, total_min: isize, total_max: isize) -> Option<bool> {
        let (holds, fails) = match self.kind {
            LinearKind::Le => (total_max <= self.rhs, total_min > self.rhs),
            LinearKind::Eq | LinearKind::Ne => (
                total_min == self.rhs && total_max == self.rhs,
                self.rhs < total_min || self.rhs > total_max,
            ),
        };
        match (holds, fails, self.kind) {
            (true, _, LinearKind::Ne) => Some(false),
            (_, true, LinearKind::Ne) => Some(true),
            (true, _, _) => Some(true),
            (_, true, _) => Some(false),
            _ => None,
        }
    }
    /// Enforces `sum <= rhs` on the open terms. Returns true iff some domain
    /// was narrowed.
    fn prune_above(&self, dom: &mut dyn DomainStore, total_min: isize) -> CPResult<bool> {
        if total_min > self.rhs {
            return Err(Inconsistency);
        }
        let mut changed = false;
        for t in self.terms.iter().skip(self.n_fixed) {
            // a*x <= rhs - (total_min - t.min)
            let slack = self.rhs.saturating_sub(total_min).saturating_add(t.min);
            let change = if t.coef > 0 {
                dom.remove_above(t.var, floor_div(slack, t.coef))?
            } else {
                dom.remove_below(t.var, ceil_div(slack, t.coef))?
            };
            changed |= change.is_changed();
        }
        Ok(changed)
    }
    /// Enforces `sum >= rhs` on the open terms. Returns true iff some domain
    /// was narrowed.
    fn prune_below(&self, dom: &mut dyn DomainStore, total_max: isize) -> CPResult<bool> {
        if total_max < self.rhs {
            return Err(Inconsistency);
        }
        let mut changed = false;
        for t in self.terms.iter().skip(self.n_fixed) {
            // a*x >= rhs - (total_max - t.max)
            let slack = self.rhs.saturating_sub(total_max).saturating_add(t.max);
            let change = if t.coef > 0 {
                dom.remove_below(t.var, ceil_div(slack, t.coef))?
            } else {
                dom.remove_above(t.var, floor_div(slack, t.coef))?
            };
            changed |= change.is_changed();
        }
        Ok(changed)
    }
    /// Forbids the one value of the last open term that would make the sum
    /// equal to the rhs
    fn prune_not_equal(&self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        match self.terms.len() - self.n_fixed {
            0 if self.partial == self.rhs => Err(Inconsistency),
            0 => Ok(PropStatus::Subsumed),
            1 => {
                let t = self.terms[self.n_fixed];
                let rest = self.rhs.saturating_sub(self.partial);
                if rest % t.coef == 0 {
                    dom.remove(t.var, rest / t.coef)?;
                }
                Ok(PropStatus::Subsumed)
            }
            _ => Ok(PropStatus::Fixed),
        }
    }
}

impl Propagator for LinearPropagator {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        if self.kind == LinearKind::Ne {
            self.refresh(dom)?;
            return self.prune_not_equal(dom);
        }
        loop {
            let (total_min, total_max) = self.refresh(dom)?;
            if self.kind == LinearKind::Le && total_max <= self.rhs {
                return Ok(PropStatus::Subsumed);
            }
            let mut changed = self.prune_above(dom, total_min)?;
            if self.kind == LinearKind::Eq {
                changed |= self.prune_below(dom, total_max)?;
            }
            if !changed {
                break;
            }
        }
        if self.n_fixed == self.terms.len() {
            Ok(PropStatus::Subsumed)
        } else {
            Ok(PropStatus::Fixed)
        }
    }
    fn cost(&self) -> PropCost {
        match self.terms.len() {
            0 | 1 => PropCost::Unary,
            2 => PropCost::Binary,
            n => PropCost::Linear(n),
        }
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}

/// Integer division rounding towards negative infinity
fn floor_div(a: isize, b: isize) -> isize {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}
/// Integer division rounding towards positive infinity
fn ceil_div(a: isize, b: isize) -> isize {
    let q = a / b;
    if (a % b != 0) && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}
