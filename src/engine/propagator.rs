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

//! This module provides the definition of the traits and structures that
//! make up the contract between a propagator and the engine that runs it.

use super::{CPResult, DomainStore, ModelError, Space, Variable};

/// This trait stands for the modeling constructs which you'll want to work
/// with when representing the problem you intend to solve. These modeling
/// constructs are often referred to as constraints, but this implementation
/// reserves the constraint type for an atomic constraint associated with
/// a propagator.
pub trait ModelingConstruct {
    /// This method installs the current modeling construct (which might
    /// consist of several underlying propagators/constraints) into the
    /// space which will schedule its propagators as needed.
    fn install(&self, space: &mut Space) -> Result<(), ModelError>;
}

/// An identifier to a constraint. A constraint in itself is really just
/// an identifier in this implementation. The bulk of the work is done by
/// the propagation engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint(pub(crate) usize);

/// What a propagator tells the engine after it has run (the failure case is
/// conveyed by an Inconsistency error).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PropStatus {
    /// There is nothing left to do until one of the watched variables changes
    Fixed,
    /// The constraint is satisfied no matter what: the propagator can be
    /// retired for good
    Subsumed,
}

/// A cheap estimate of how expensive it is to run a propagator. The engine
/// always runs the cheapest scheduled propagator first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PropCost {
    /// A propagator that bears on one variable
    Unary,
    /// A propagator that bears on two variables
    Binary,
    /// A propagator whose work is linear in the given number of variables
    Linear(usize),
    /// A propagator whose work is quadratic in the given number of variables
    Quadratic(usize),
}
impl PropCost {
    /// Returns the numeric estimate used to order the propagation queue
    pub fn estimate(self) -> usize {
        match self {
            PropCost::Unary => 1,
            PropCost::Binary => 2,
            PropCost::Linear(n) => n.max(1),
            PropCost::Quadratic(n) => n.saturating_mul(n).max(1),
        }
    }
}

/// The propagator is the portion of the code where the magic actually happens.
/// A propagator is called by the engine during the fixpoint computation. It
/// enforces a certain level of consistency on the domain of the variables it
/// works on.
///
/// # Note
/// A propagator only ever holds `Variable` handles. The domains belong to the
/// space that runs it, which is why a propagator can be copied into a cloned
/// space as is.
pub trait Propagator: Send {
    /// Actually runs the custom propagation algorithm
    fn propagate(&mut self, domains: &mut dyn DomainStore) -> CPResult<PropStatus>;
    /// Estimates the cost of running this propagator
    fn cost(&self) -> PropCost {
        PropCost::Unary
    }
    /// Creates an independent copy of this propagator for a cloned space
    fn boxed_clone(&self) -> Box<dyn Propagator>;
}

/// Any closure/function that accepts a mutable ref to the domain store can be
/// a propagator. (This is mere convenience, not required to get something
/// useable)
impl<F> Propagator for F
where
    F: FnMut(&mut dyn DomainStore) -> CPResult<PropStatus> + Clone + Send + 'static,
{
    fn propagate(&mut self, domains: &mut dyn DomainStore) -> CPResult<PropStatus> {
        self(domains)
    }

    fn boxed_clone(&self) -> Box<dyn Propagator> {
        Box::new(self.clone())
    }
}

/// A condition expressing that a specific change event has occurred on the
/// domain of some variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainCondition {
    /// This condidion is satisfied whenever the domain of a variable becomes
    /// fixed
    IsFixed(Variable),
    /// The minimum value of the domain has changed
    MinimumChanged(Variable),
    /// The maximum value of the domain has changed
    MaximumChanged(Variable),
    /// This condition is satisfied when +something+ has changed in the domain
    /// of the variable
    DomainChanged(Variable),
}

/// The granularity at which a propagator wants to be woken up for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// Only when the variable gets assigned a value
    Value,
    /// Whenever one of the bounds of the variable moves
    Bounds,
    /// Whenever any value is removed from the domain of the variable
    Domain,
}
impl Granularity {
    /// Returns the domain conditions that correspond to this granularity
    pub fn conditions(self, var: Variable) -> Vec<DomainCondition> {
        match self {
            Granularity::Value => vec![DomainCondition::IsFixed(var)],
            Granularity::Bounds => vec![
                DomainCondition::MinimumChanged(var),
                DomainCondition::MaximumChanged(var),
            ],
            Granularity::Domain => vec![DomainCondition::DomainChanged(var)],
        }
    }
}
