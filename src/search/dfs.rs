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

//! This module provides the depth first exploration of the search tree.
//!
//! The search never undoes anything: each node of the tree is a space of its
//! own. When a stable space is expanded, its left alternative is explored on
//! a clone while the right alternative reuses the space itself.

use tracing::{debug, trace};

use crate::prelude::*;

use super::limits::Cutoff;

/// A node that remains to be explored: the decision still needs to be
/// committed onto the space
struct Node {
    space: Space,
    decision: Decision,
    depth: usize,
}

/// The requirement that every new solution be strictly better than the
/// incumbent
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bound {
    pub(crate) objective: Variable,
    pub(crate) direction: Direction,
    pub(crate) best: Option<isize>,
}

impl Bound {
    /// Narrows the objective of the given space so that it improves on the
    /// incumbent. Nothing improves on an incumbent at the edge of the isize
    /// range.
    fn constrain(&self, space: &mut Space) -> CPResult<Change> {
        match (self.best, self.direction) {
            (None, _) => Ok(Change::Unchanged),
            (Some(best), Direction::Minimize) => {
                let bound = best.checked_sub(1).ok_or(Inconsistency)?;
                space.remove_above(self.objective, bound)
            }
            (Some(best), Direction::Maximize) => {
                let bound = best.checked_add(1).ok_or(Inconsistency)?;
                space.remove_below(self.objective, bound)
            }
        }
    }
}

/// A lazy depth first search: iterating over it yields the solved spaces in
/// depth first order.
pub struct Dfs {
    /// The nodes that remain to be explored (the top of the stack is explored
    /// first)
    stack: Vec<Node>,
    /// A solved root that has not been yielded yet
    pending: Option<Space>,
    /// The incumbent based bound (branch and bound only)
    bound: Option<Bound>,
    /// The limits of this search
    cutoff: Cutoff,
    /// What has been done so far
    stats: Statistics,
    /// Set when the search was interrupted by one of its limits
    stopped: bool,
}

/// Enumerates all the solutions of the model stated in `space`
pub fn enumerate(space: Space, limits: SearchLimits) -> Dfs {
    Dfs::new(space, limits)
}

impl Dfs {
    /// Starts a new search on the given root space
    pub fn new(space: Space, limits: SearchLimits) -> Self {
        Self::with_bound(space, limits, None)
    }
    /// Starts a new search whose solutions must improve on the incumbent
    pub(crate) fn with_bound(mut root: Space, limits: SearchLimits, bound: Option<Bound>) -> Self {
        let mut dfs = Self {
            stack: vec![],
            pending: None,
            bound,
            cutoff: Cutoff::start(limits),
            stats: Statistics::default(),
            stopped: false,
        };
        match root.status() {
            SpaceStatus::Failed => debug!("the root space is inconsistent"),
            SpaceStatus::Solved => dfs.pending = Some(root),
            SpaceStatus::Stable | SpaceStatus::Building => dfs.expand(root, 1),
        }
        dfs
    }
    /// Returns the counters of this search
    pub fn statistics(&self) -> Statistics {
        self.stats
    }
    /// Returns true iff the search was interrupted by one of its limits
    pub fn stopped(&self) -> bool {
        self.stopped
    }
    /// Requires that all the solutions found from now on have an objective
    /// value strictly better than `best`
    pub(crate) fn improve_on(&mut self, best: isize) {
        if let Some(bound) = self.bound.as_mut() {
            bound.best = Some(best);
        }
    }
    /// Pushes both alternatives of the next choice of a stable space
    fn expand(&mut self, space: Space, depth: usize) {
        if let Some(choice) = space.choice() {
            let [left, right] = choice.alternatives();
            let copy = space.clone();
            self.stack.push(Node {
                space,
                decision: right,
                depth,
            });
            self.stack.push(Node {
                space: copy,
                decision: left,
                depth,
            });
        }
    }
}

impl Iterator for Dfs {
    type Item = Space;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.pending.take() {
            self.stats.solutions += 1;
            return Some(root);
        }
        while let Some(Node {
            mut space,
            decision,
            depth,
        }) = self.stack.pop()
        {
            if let Some(limit) = self.cutoff.exceeded(&self.stats) {
                debug!(limit, nodes = self.stats.nodes, "search stopped");
                self.stopped = true;
                self.stack.clear();
                return None;
            }
            self.stats.nodes += 1;
            self.stats.peak_depth = self.stats.peak_depth.max(depth);
            trace!(depth, ?decision, "node");

            let bounded = match self.bound {
                Some(bound) => bound.constrain(&mut space).is_ok(),
                None => true,
            };
            let status = if bounded {
                space.commit(decision)
            } else {
                SpaceStatus::Failed
            };
            match status {
                SpaceStatus::Failed => self.stats.failures += 1,
                SpaceStatus::Solved => {
                    self.stats.solutions += 1;
                    return Some(space);
                }
                SpaceStatus::Stable | SpaceStatus::Building => self.expand(space, depth + 1),
            }
        }
        None
    }
}

#[cfg(test)]
mod test_dfs {
    use std::collections::BTreeSet;

    use crate::prelude::*;

    fn queens(n: usize, var: VarSelection, val: ValSelection) -> (Space, Vec<Variable>) {
        let mut space = Space::new();
        let q = space.new_int_vars(n, 0, n as isize - 1);
        for i in 0..n {
            for j in i + 1..n {
                let d = (j - i) as isize;
                space.install(&RelVar::new(q[i], Relation::Ne, q[j], 0)).unwrap();
                space.install(&RelVar::new(q[i], Relation::Ne, q[j], d)).unwrap();
                space.install(&RelVar::new(q[i], Relation::Ne, q[j], -d)).unwrap();
            }
        }
        space.branch(&q, var, val).unwrap();
        (space, q)
    }

    fn solutions(space: Space, vars: &[Variable]) -> BTreeSet<Vec<isize>> {
        enumerate(space, SearchLimits::default())
            .map(|s| s.values(vars).unwrap())
            .collect()
    }

    #[test]
    fn eight_queens_has_92_solutions() {
        let (space, _) = queens(8, VarSelection::SmallestDomain, ValSelection::Min);
        assert_eq!(92, enumerate(space, SearchLimits::default()).count());
    }

    #[test]
    fn the_branching_rules_do_not_change_the_solutions() {
        let (space, q) = queens(6, VarSelection::InOrder, ValSelection::Min);
        let reference = solutions(space, &q);
        assert_eq!(4, reference.len());

        let rules = [
            (VarSelection::SmallestDomain, ValSelection::SplitMax),
            (VarSelection::SmallestMin, ValSelection::Min),
            (VarSelection::LargestMax, ValSelection::Max),
            (VarSelection::InOrder, ValSelection::SplitMin),
        ];
        for (var, val) in rules {
            let (space, q) = queens(6, var, val);
            assert_eq!(reference, solutions(space, &q));
        }
    }

    #[test]
    fn queens_as_a_boolean_matrix() {
        let n = 5;
        let mut space = Space::new();
        let b = (0..n).map(|_| space.new_int_vars(n, 0, 1)).collect::<Vec<_>>();
        for i in 0..n {
            let row = b[i].clone();
            let col = (0..n).map(|j| b[j][i]).collect::<Vec<_>>();
            space.install(&Linear::sum(row, Relation::Eq, 1)).unwrap();
            space.install(&Linear::sum(col, Relation::Eq, 1)).unwrap();
        }
        // diagonals: cells with the same i - j (resp. i + j)
        for k in 0..(2 * n - 1) {
            let down = (0..n)
                .flat_map(|i| (0..n).map(move |j| (i, j)))
                .filter(|(i, j)| i + n - 1 - j == k)
                .map(|(i, j)| b[i][j])
                .collect::<Vec<_>>();
            let up = (0..n)
                .flat_map(|i| (0..n).map(move |j| (i, j)))
                .filter(|(i, j)| i + j == k)
                .map(|(i, j)| b[i][j])
                .collect::<Vec<_>>();
            space.install(&Linear::sum(down, Relation::Le, 1)).unwrap();
            space.install(&Linear::sum(up, Relation::Le, 1)).unwrap();
        }
        let all = b.iter().flatten().copied().collect::<Vec<_>>();
        space.branch(&all, VarSelection::InOrder, ValSelection::Max).unwrap();

        let (binary, _) = queens(n, VarSelection::SmallestDomain, ValSelection::Min);
        let expected = enumerate(binary, SearchLimits::default()).count();
        assert_eq!(10, expected);
        assert_eq!(expected, enumerate(space, SearchLimits::default()).count());
    }

    #[test]
    fn sudoku_has_a_unique_solution() {
        #[rustfmt::skip]
        let grid: [[isize; 9]; 9] = [
            [5, 3, 0, 0, 7, 0, 0, 0, 0],
            [6, 0, 0, 1, 9, 5, 0, 0, 0],
            [0, 9, 8, 0, 0, 0, 0, 6, 0],
            [8, 0, 0, 0, 6, 0, 0, 0, 3],
            [4, 0, 0, 8, 0, 3, 0, 0, 1],
            [7, 0, 0, 0, 2, 0, 0, 0, 6],
            [0, 6, 0, 0, 0, 0, 2, 8, 0],
            [0, 0, 0, 4, 1, 9, 0, 0, 5],
            [0, 0, 0, 0, 8, 0, 0, 7, 9],
        ];
        let mut space = Space::new();
        let cells = grid
            .iter()
            .flat_map(|row| row.iter())
            .map(|&v| match v {
                0 => space.new_int_var(1, 9),
                v => space.new_int_var(v, v),
            })
            .collect::<Vec<_>>();
        let cell = |r: usize, c: usize| cells[r * 9 + c];
        for i in 0..9 {
            let row = (0..9).map(|c| cell(i, c)).collect::<Vec<_>>();
            let col = (0..9).map(|r| cell(r, i)).collect::<Vec<_>>();
            let block = (0..9)
                .map(|k| cell(3 * (i / 3) + k / 3, 3 * (i % 3) + k % 3))
                .collect::<Vec<_>>();
            space.install(&AllDifferent::new(row)).unwrap();
            space.install(&AllDifferent::new(col)).unwrap();
            space.install(&AllDifferent::new(block)).unwrap();
        }
        space.branch(&cells, VarSelection::SmallestDomain, ValSelection::Min).unwrap();

        let found = enumerate(space, SearchLimits::default())
            .map(|s| s.values(&cells).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(1, found.len());
        let solution = &found[0];
        assert_eq!(&[5, 3, 4, 6, 7, 8, 9, 1, 2], &solution[0..9]);
        for i in 0..9 {
            let row = (0..9).map(|c| solution[i * 9 + c]).collect::<BTreeSet<_>>();
            let col = (0..9).map(|r| solution[r * 9 + i]).collect::<BTreeSet<_>>();
            assert_eq!(9, row.len());
            assert_eq!(9, col.len());
        }
    }

    #[test]
    fn magic_sequences_of_length_four() {
        let n = 4;
        let mut space = Space::new();
        let seq = space.new_int_vars(n, 0, n as isize - 1);
        for i in 0..n {
            space.install(&Count::new(seq.clone(), i as isize, seq[i])).unwrap();
        }
        space.install(&Linear::sum(seq.clone(), Relation::Eq, n as isize)).unwrap();
        let coefs = (0..n).map(|i| i as isize - 1).collect();
        space.install(&Linear::weighted(coefs, seq.clone(), Relation::Eq, 0).unwrap()).unwrap();
        space.branch(&seq, VarSelection::SmallestDomain, ValSelection::Min).unwrap();

        let expected = [vec![1, 2, 1, 0], vec![2, 0, 2, 0]].into_iter().collect::<BTreeSet<_>>();
        assert_eq!(expected, solutions(space, &seq));
    }

    #[test]
    fn two_formulations_agree_on_their_first_solution() {
        // a + 2b + c == x
        let mut direct = Space::new();
        let abc = direct.new_int_vars(3, 1, 5);
        let x = direct.new_int_var(4, 20);
        let lin = Linear::weighted(vec![1, 2, 1, -1], vec![abc[0], abc[1], abc[2], x], Relation::Eq, 0);
        direct.install(&lin.unwrap()).unwrap();
        let mut vars = abc.clone();
        vars.push(x);
        direct.branch(&vars, VarSelection::SmallestDomain, ValSelection::Min).unwrap();

        // a + b == u, u + b + c == x
        let mut composed = Space::new();
        let left = composed.new_int_vars(3, 1, 5);
        let y = composed.new_int_var(4, 20);
        let u = composed.new_int_var(2, 10);
        let first = Linear::weighted(vec![1, 1, -1], vec![left[0], left[1], u], Relation::Eq, 0);
        let second = Linear::weighted(vec![1, 1, 1, -1], vec![u, left[1], left[2], y], Relation::Eq, 0);
        composed.install(&first.unwrap()).unwrap();
        composed.install(&second.unwrap()).unwrap();
        composed.branch(&left, VarSelection::SmallestDomain, ValSelection::Min).unwrap();

        let s1 = enumerate(direct, SearchLimits::default()).next().unwrap();
        let s2 = enumerate(composed, SearchLimits::default()).next().unwrap();
        assert_eq!(s1.values(&abc), s2.values(&left));
        assert_eq!(s1.value(x), s2.value(y));
        assert_eq!(Some(vec![1, 1, 1]), s1.values(&abc));
        assert_eq!(Some(4), s1.value(x));
    }

    #[test]
    fn search_is_complete_on_a_small_packing() {
        let (w, h) = ([1, 1, 2, 1], [1, 1, 1, 2]);
        let mut space = Space::new();
        let xs = space.new_int_vars(4, 0, 2);
        let ys = space.new_int_vars(4, 0, 2);
        space.post_no_overlap(&xs, &w, &ys, &h).unwrap();
        space.branch(&xs, VarSelection::SmallestDomain, ValSelection::Min).unwrap();
        space.branch(&ys, VarSelection::InOrder, ValSelection::SplitMax).unwrap();

        let vars = xs.iter().chain(ys.iter()).copied().collect::<Vec<_>>();
        let found = solutions(space, &vars);

        let mut brute = BTreeSet::new();
        for code in 0..3usize.pow(8) {
            let v = (0..8)
                .map(|k| ((code / 3usize.pow(k)) % 3) as isize)
                .collect::<Vec<_>>();
            let (x, y) = v.split_at(4);
            let disjoint = (0..4).all(|i| {
                (0..4).all(|j| {
                    i == j
                        || x[i] + w[i] <= x[j]
                        || x[j] + w[j] <= x[i]
                        || y[i] + h[i] <= y[j]
                        || y[j] + h[j] <= y[i]
                })
            });
            if disjoint {
                brute.insert(v);
            }
        }
        assert!(!brute.is_empty());
        assert_eq!(brute, found);
    }

    #[test]
    fn an_inconsistent_root_has_no_solution() {
        let mut space = Space::new();
        let x = space.new_int_var(0, 3);
        space.install(&RelConstant::new(x, Relation::Gt, 3)).unwrap();
        space.branch(&[x], VarSelection::InOrder, ValSelection::Min).unwrap();

        let mut dfs = enumerate(space, SearchLimits::default());
        assert!(dfs.next().is_none());
        assert_eq!(0, dfs.statistics().nodes);
        assert!(!dfs.stopped());
    }

    #[test]
    fn a_solved_root_is_the_only_solution() {
        let mut space = Space::new();
        let x = space.new_int_var(2, 2);
        space.branch(&[x], VarSelection::InOrder, ValSelection::Min).unwrap();

        let mut dfs = enumerate(space, SearchLimits::default());
        assert_eq!(Some(Some(2)), dfs.next().map(|s| s.value(x)));
        assert!(dfs.next().is_none());
        assert_eq!(1, dfs.statistics().solutions);
    }

    #[test]
    fn the_node_limit_stops_the_search() {
        let (space, _) = queens(8, VarSelection::InOrder, ValSelection::Min);
        let mut dfs = enumerate(space, SearchLimits::default().with_node_limit(20));
        let found = dfs.by_ref().count();
        assert!(found < 92);
        assert!(dfs.stopped());
        assert_eq!(20, dfs.statistics().nodes);
    }

    #[test]
    fn the_fail_limit_stops_the_search() {
        let (space, _) = queens(8, VarSelection::InOrder, ValSelection::Min);
        let mut dfs = enumerate(space, SearchLimits::default().with_fail_limit(5));
        dfs.by_ref().for_each(drop);
        assert!(dfs.stopped());
        assert_eq!(5, dfs.statistics().failures);
    }

    #[test]
    fn statistics_are_consistent() {
        let (space, _) = queens(6, VarSelection::SmallestDomain, ValSelection::Min);
        let mut dfs = enumerate(space, SearchLimits::default());
        let found = dfs.by_ref().count() as u64;
        let stats = dfs.statistics();
        assert_eq!(found, stats.solutions);
        assert!(!dfs.stopped());
        // every inner node has exactly two children
        assert_eq!(0, stats.nodes % 2);
        assert!(stats.failures + stats.solutions <= stats.nodes);
        assert!(stats.peak_depth >= 1);
    }
}
