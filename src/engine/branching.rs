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

//! This module provides the branching directives: the rules that decide which
//! variable is branched upon, and how its domain is split in two alternatives.

use super::{CPResult, Change, DomainStore, Variable};

/// The rule used to pick the next variable to branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarSelection {
    /// The first variable that is not fixed (declaration order)
    InOrder,
    /// The variable having the smallest domain (first fail)
    #[default]
    SmallestDomain,
    /// The variable having the smallest minimum value
    SmallestMin,
    /// The variable having the largest maximum value
    LargestMax,
}

/// The rule used to split the domain of the selected variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValSelection {
    /// x = min first, then x != min
    #[default]
    Min,
    /// x = max first, then x != max
    Max,
    /// x <= mid first, then x > mid (mid being the middle of the bounds)
    SplitMin,
    /// x > mid first, then x <= mid (mid being the middle of the bounds)
    SplitMax,
}

/// One alternative of a choice point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// x = v
    Assign(Variable, isize),
    /// x != v
    Exclude(Variable, isize),
    /// x <= v
    AtMost(Variable, isize),
    /// x >= v
    AtLeast(Variable, isize),
}
impl Decision {
    /// Returns the alternative which covers the rest of the domain
    pub fn negate(self) -> Self {
        match self {
            Decision::Assign(x, v) => Decision::Exclude(x, v),
            Decision::Exclude(x, v) => Decision::Assign(x, v),
            Decision::AtMost(x, v) => Decision::AtLeast(x, v + 1),
            Decision::AtLeast(x, v) => Decision::AtMost(x, v - 1),
        }
    }
    /// Returns the variable this decision bears on
    pub fn variable(self) -> Variable {
        match self {
            Decision::Assign(x, _)
            | Decision::Exclude(x, _)
            | Decision::AtMost(x, _)
            | Decision::AtLeast(x, _) => x,
        }
    }
    /// Narrows the domains according to this decision
    pub fn apply(self, domains: &mut dyn DomainStore) -> CPResult<Change> {
        match self {
            Decision::Assign(x, v) => domains.fix(x, v),
            Decision::Exclude(x, v) => domains.remove(x, v),
            Decision::AtMost(x, v) => domains.remove_above(x, v),
            Decision::AtLeast(x, v) => domains.remove_below(x, v),
        }
    }
}

/// A choice point: a binary split of the search tree. The left alternative is
/// the decision itself, the right one is its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Choice {
    /// The decision explored first
    pub decision: Decision,
}
impl Choice {
    /// Returns both alternatives, in the order in which they must be explored
    pub fn alternatives(self) -> [Decision; 2] {
        [self.decision, self.decision.negate()]
    }
}

/// A brancher applies a variable and a value selection rule to a group of
/// variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brancher {
    /// The variables to branch on
    vars: Vec<Variable>,
    /// How to pick a variable
    var_selection: VarSelection,
    /// How to split its domain
    val_selection: ValSelection,
}

impl Brancher {
    /// Creates a new brancher
    pub fn new(vars: Vec<Variable>, var_selection: VarSelection, val_selection: ValSelection) -> Self {
        Self {
            vars,
            var_selection,
            val_selection,
        }
    }
    /// Returns the next choice of this brancher or None when all its
    /// variables are fixed
    pub fn choice(&self, domains: &dyn DomainStore) -> Option<Choice> {
        let var = self.select(domains)?;
        let min = domains.min(var)?;
        let max = domains.max(var)?;
        let mid = min + (max - min) / 2;
        let decision = match self.val_selection {
            ValSelection::Min => Decision::Assign(var, min),
            ValSelection::Max => Decision::Assign(var, max),
            ValSelection::SplitMin => Decision::AtMost(var, mid),
            ValSelection::SplitMax => Decision::AtLeast(var, mid + 1),
        };
        Some(Choice { decision })
    }
    /// Picks the variable to branch on. Ties are broken by declaration order.
    fn select(&self, domains: &dyn DomainStore) -> Option<Variable> {
        let mut free = self.vars.iter().copied().filter(|v| domains.size(*v) > 1);
        match self.var_selection {
            VarSelection::InOrder => free.next(),
            VarSelection::SmallestDomain => Self::first_best(free, |v| domains.size(v) as isize),
            VarSelection::SmallestMin => {
                Self::first_best(free, |v| domains.min(v).unwrap_or(isize::MAX))
            }
            VarSelection::LargestMax => {
                Self::first_best(free, |v| domains.max(v).map_or(isize::MAX, |m| -m))
            }
        }
    }
    /// Returns the first variable minimizing the given key
    fn first_best<I, F>(vars: I, key: F) -> Option<Variable>
    where
        I: Iterator<Item = Variable>,
        F: Fn(Variable) -> isize,
    {
        let mut best: Option<(isize, Variable)> = None;
        for v in vars {
            let k = key(v);
            if best.map_or(true, |(bk, _)| k < bk) {
                best = Some((k, v));
            }
        }
        best.map(|(_, v)| v)
    }
}

#[cfg(test)]
mod test_branching {
    use crate::prelude::*;

    #[test]
    fn negation_covers_the_rest_of_the_domain() {
        let mut space = Space::new();
        let x = space.new_int_var(0, 9);
        assert_eq!(Decision::Exclude(x, 3), Decision::Assign(x, 3).negate());
        assert_eq!(Decision::AtLeast(x, 5), Decision::AtMost(x, 4).negate());
        assert_eq!(Decision::AtMost(x, 4), Decision::AtLeast(x, 5).negate());
    }

    #[test]
    fn smallest_domain_breaks_ties_by_declaration_order() {
        let mut space = Space::new();
        let a = space.new_int_var(0, 9);
        let b = space.new_int_var(0, 3);
        let c = space.new_int_var(0, 3);
        let d = space.new_int_var(1, 1);

        let brancher = Brancher::new(vec![a, b, c, d], VarSelection::SmallestDomain, ValSelection::Min);
        let choice = brancher.choice(&space).unwrap();
        assert_eq!(Decision::Assign(b, 0), choice.decision);
    }

    #[test]
    fn in_order_skips_fixed_variables() {
        let mut space = Space::new();
        let a = space.new_int_var(2, 2);
        let b = space.new_int_var(0, 3);

        let brancher = Brancher::new(vec![a, b], VarSelection::InOrder, ValSelection::Max);
        let choice = brancher.choice(&space).unwrap();
        assert_eq!(Decision::Assign(b, 3), choice.decision);
    }

    #[test]
    fn smallest_min_and_largest_max() {
        let mut space = Space::new();
        let a = space.new_int_var(3, 5);
        let b = space.new_int_var(1, 4);
        let c = space.new_int_var(2, 8);

        let vars = vec![a, b, c];
        let smallest = Brancher::new(vars.clone(), VarSelection::SmallestMin, ValSelection::Min);
        let largest = Brancher::new(vars, VarSelection::LargestMax, ValSelection::Min);
        assert_eq!(b, smallest.choice(&space).unwrap().decision.variable());
        assert_eq!(c, largest.choice(&space).unwrap().decision.variable());
    }

    #[test]
    fn splits_around_the_middle() {
        let mut space = Space::new();
        let x = space.new_int_var(0, 9);

        let low = Brancher::new(vec![x], VarSelection::InOrder, ValSelection::SplitMin);
        let high = Brancher::new(vec![x], VarSelection::InOrder, ValSelection::SplitMax);
        assert_eq!(
            [Decision::AtMost(x, 4), Decision::AtLeast(x, 5)],
            low.choice(&space).unwrap().alternatives()
        );
        assert_eq!(
            [Decision::AtLeast(x, 5), Decision::AtMost(x, 4)],
            high.choice(&space).unwrap().alternatives()
        );
    }

    #[test]
    fn no_choice_when_everything_is_fixed() {
        let mut space = Space::new();
        let x = space.new_int_var(4, 4);
        let brancher = Brancher::new(vec![x], VarSelection::SmallestDomain, ValSelection::Min);
        assert_eq!(None, brancher.choice(&space));
    }
}
