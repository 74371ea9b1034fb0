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

//! This module provides the implementation of the non overlap constraint
//! between axis aligned rectangles.

use std::sync::Arc;

use crate::prelude::*;

/// This constraint forbids any two rectangles to overlap. The rectangle i
/// occupies the area `[x_i, x_i + w_i) × [y_i, y_i + h_i)` where the widths
/// and heights are constants.
///
/// The propagation is driven by the rectangles that have been placed: as soon
/// as rectangle j is placed and one coordinate of rectangle i is fixed so that
/// both rectangles overlap on that axis, all the positions of i that would
/// overlap j on the other axis are removed.
#[derive(Debug, Clone)]
pub struct NoOverlap {
    xs: Vec<Variable>,
    widths: Arc<[isize]>,
    ys: Vec<Variable>,
    heights: Arc<[isize]>,
    granularity: Granularity,
}

impl NoOverlap {
    /// Creates a new instance of the constraint. All four lists must have the
    /// same length and no size may be negative.
    pub fn new(
        xs: Vec<Variable>,
        widths: Vec<isize>,
        ys: Vec<Variable>,
        heights: Vec<isize>,
    ) -> Result<Self, ModelError> {
        let k = xs.len();
        for actual in [widths.len(), ys.len(), heights.len()] {
            if actual != k {
                return Err(ModelError::ArgumentMismatch {
                    constraint: "no_overlap",
                    expected: k,
                    actual,
                });
            }
        }
        if widths.iter().chain(heights.iter()).any(|size| *size < 0) {
            return Err(ModelError::InvalidArgument {
                constraint: "no_overlap",
                reason: "widths and heights cannot be negative",
            });
        }
        Ok(Self {
            xs,
            widths: widths.into(),
            ys,
            heights: heights.into(),
            granularity: Granularity::Bounds,
        })
    }
    /// Changes the granularity at which the propagator is woken up
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }
}

impl ModelingConstruct for NoOverlap {
    fn install(&self, space: &mut Space) -> Result<(), ModelError> {
        if self.xs.len() < 2 {
            return Ok(());
        }
        let propagator = NoOverlapPropagator {
            xs: self.xs.clone(),
            widths: Arc::clone(&self.widths),
            ys: self.ys.clone(),
            heights: Arc::clone(&self.heights),
        };
        let constraint = space.post(Box::new(propagator))?;
        for (x, y) in self.xs.iter().zip(self.ys.iter()) {
            space.subscribe(constraint, *x, self.granularity)?;
            space.subscribe(constraint, *y, self.granularity)?;
        }
        Ok(())
    }
}

/// The propagator of the non overlap constraint. The sizes of the rectangles
/// are shared with all the copies of the propagator.
#[derive(Debug, Clone)]
struct NoOverlapPropagator {
    xs: Vec<Variable>,
    widths: Arc<[isize]>,
    ys: Vec<Variable>,
    heights: Arc<[isize]>,
}

impl NoOverlapPropagator {
    /// Removes all values in lo..=hi from the domain of x
    fn exclude(dom: &mut dyn DomainStore, x: Variable, lo: isize, hi: isize) -> CPResult<bool> {
        let from = lo.max(dom.min(x).ok_or(Inconsistency)?);
        let to = hi.min(dom.max(x).ok_or(Inconsistency)?);
        let mut changed = false;
        for v in from..=to {
            changed |= dom.remove(x, v)?.is_changed();
        }
        Ok(changed)
    }
    /// Prunes the positions of i that would overlap the placed rectangle j.
    /// Returns true iff some domain was narrowed.
    fn prune_pair(&self, dom: &mut dyn DomainStore, i: usize, j: usize) -> CPResult<bool> {
        let (xj, yj) = match (dom.value(self.xs[j]), dom.value(self.ys[j])) {
            (Some(xj), Some(yj)) => (xj, yj),
            _ => return Ok(false),
        };
        let (wi, hi) = (self.widths[i], self.heights[i]);
        let (wj, hj) = (self.widths[j], self.heights[j]);

        let mut changed = false;
        if let Some(xi) = dom.value(self.xs[i]) {
            if xi < xj + wj && xj < xi + wi {
                changed |= Self::exclude(dom, self.ys[i], yj - hi + 1, yj + hj - 1)?;
            }
        }
        if let Some(yi) = dom.value(self.ys[i]) {
            if yi < yj + hj && yj < yi + hi {
                changed |= Self::exclude(dom, self.xs[i], xj - wi + 1, xj + wj - 1)?;
            }
        }
        Ok(changed)
    }
}

impl Propagator for NoOverlapPropagator {
    fn propagate(&mut self, dom: &mut dyn DomainStore) -> CPResult<PropStatus> {
        let k = self.xs.len();
        loop {
            let mut changed = false;
            for j in 0..k {
                for i in 0..k {
                    if i != j {
                        changed |= self.prune_pair(dom, i, j)?;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        let placed = |x: &Variable| dom.is_fixed(*x);
        if self.xs.iter().all(placed) && self.ys.iter().all(placed) {
            Ok(PropStatus::Subsumed)
        } else {
            Ok(PropStatus::Fixed)
        }
    }
    fn cost(&self) -> PropCost {
        PropCost::Quadratic(2 * self.xs.len())
    }
    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}
