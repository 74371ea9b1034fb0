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

//! This module provides the implementation of the "or" (logical clause)
//! constraint.

use crate::prelude::*;

/// This constraint enforces that a logical clause over boolean (0,1)
/// variables be true: at least one of the positive variables is true or at
/// least one of the negative variables is false.
#[derive(Debug, Clone)]
pub struct Or {
    positive: Vec<Variable>,
    negative: Vec<Variable>,
}

impl Or {
    /// Creates the clause `x_1 or x_2 or ... or x_n`
    pub fn new(literals: Vec<Variable>) -> Self {
        Self::clause(literals, vec![])
    }
    /// Creates the clause `p_1 or ... or p_n or not(n_1) or ... or not(n_m)`
    pub fn clause(mut positive: Vec<Variable>, mut negative: Vec<Variable>) -> Self {
        positive.sort_unstable();
        positive.dedup();
        negative.sort_unstable();
        negative.dedup();
        Self { positive, negative }
    }
    /// A clause comprising both x and not(x) is always true
    fn is_tautology(&self) -> bool {
        self.positive
            .iter()
            .any(|x| self.negative.binary_search(x).is_ok())
    }
}

impl ModelingConstruct for Or {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        if self.is_tautology() {
            return Ok(());
        }
        let literals = self
            .positive
            .iter()
            .map(|&var| Literal {
                var,
                positive: true,
            })
            .chain(self.negative.iter().map(|&var| Literal {
                var,
                positive: false,
            }))
            .collect::<Vec<_>>();
        let vars = literals.iter().map(|l| l.var).collect::<Vec<_>>();

        // an empty clause fails as soon as it is propagated
        let clause = space.post(Box::new(Clause {
            literals,
            n_false: 0,
        }))?;
        for x in vars {
            space.subscribe(clause, x, Granularity::Value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Literal {
    var: Variable,
    positive: bool,
}
impl Literal {
    fn is_true(self, dom: &dyn DomainStore) -> bool {
        dom.value(self.var) == Some(self.positive as isize)
    }
    fn is_false(self, dom: &dyn DomainStore) -> bool {
        !dom.contains(self.var, self.positive as isize)
    }
}

/// The propagator of a clause. The literals which are known to be false are
/// moved to the front of the list: they remain false in every descendant of
/// the space, hence they never need to be looked at again.
#[derive(Debug, Clone)]
struct Clause {
    literals: Vec<Literal>,
    n_false: usize,
}
impl Propagator for Clause {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        for i in self.n_false..self.literals.len() {
            let lit = self.literals[i];
            if lit.is_true(dom) {
                return Ok(PropStatus::Subsumed);
            }
            if lit.is_false(dom) {
                self.literals.swap(self.n_false, i);
                self.n_false += 1;
            }
        }
        match self.literals.len() - self.n_false {
            0 => Err(Inconsistency),
            1 => {
                let last = self.literals[self.n_false];
                dom.fix_bool(last.var, last.positive)?;
                Ok(PropStatus::Subsumed)
            }
            _ => Ok(PropStatus::Fixed),
        }
    }
    fn cost(&self) -> PropCost {
        PropCost::Linear(self.literals.len())
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}
