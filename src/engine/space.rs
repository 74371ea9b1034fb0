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

//! This module provides the space: the unit of work of the search. A space
//! bundles the domains of the variables, the propagation engine and the
//! branching directives. Exploring an alternative amounts to cloning a space
//! and committing a decision onto the copy.

use std::sync::Arc;

use tracing::trace;

use crate::constraints::NoOverlap;

use super::{
    Brancher, CPResult, Change, Choice, Constraint, Decision, DomainCondition, DomainStore,
    DomainStoreImpl, Granularity, ModelingConstruct, PropagationEngine, Propagator, ValSelection,
    VarSelection, Variable,
};

/// The errors that can be raised while a model is being stated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The argument lists given to a constraint do not have matching lengths
    #[error("{constraint}: expected {expected} arguments but got {actual}")]
    ArgumentMismatch {
        /// The name of the offending constraint
        constraint: &'static str,
        /// The expected number of arguments
        expected: usize,
        /// The actual number of arguments
        actual: usize,
    },
    /// Some argument of a constraint lies outside of its admissible range
    #[error("{constraint}: {reason}")]
    InvalidArgument {
        /// The name of the offending constraint
        constraint: &'static str,
        /// What is wrong with the argument
        reason: &'static str,
    },
    /// Constraints and branchers can only be added to a space being built
    #[error("the space is no longer being built")]
    NotBuilding,
}

/// The lifecycle of a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceStatus {
    /// Variables, constraints and branchers are still being added
    Building,
    /// The propagation has reached a fixpoint but some branching variable is
    /// still free
    Stable,
    /// The propagation has reached a fixpoint and all branching variables are
    /// fixed
    Solved,
    /// Some domain has been wiped out. A failed space remains failed forever.
    Failed,
}

/// A space is a self contained copy of the problem: it owns the domains of
/// all variables, the propagators and the branchers.
///
/// # Note
/// A space can be cloned in any state. The clone is fully independent of its
/// original: the domains and propagators are deep copied while the listener
/// tables and branchers (which cannot change once the space has been built)
/// are shared.
#[derive(Debug, Clone)]
pub struct Space {
    /// The domains of the variables
    domains: DomainStoreImpl,
    /// The propagators and their subscriptions
    engine: PropagationEngine,
    /// The branching directives, tried in order
    branchers: Arc<Vec<Brancher>>,
    /// The current status of the space
    status: SpaceStatus,
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    /// Creates a new empty space which is being built
    pub fn new() -> Self {
        Self {
            domains: DomainStoreImpl::new(),
            engine: PropagationEngine::new(),
            branchers: Default::default(),
            status: SpaceStatus::Building,
        }
    }
    /// Creates a new integer variable covering the min..=max range of values.
    pub fn new_int_var(&mut self, min: isize, max: isize) -> Variable {
        self.domains.new_int_var(min, max)
    }
    /// Creates a new binary 0,1 variable
    pub fn new_bool_var(&mut self) -> Variable {
        self.domains.new_bool_var()
    }
    /// Creates a new integer variable whose domain comprises exactly the given
    /// values
    pub fn new_int_var_with_values(&mut self, values: &[isize]) -> Variable {
        self.domains.new_int_var_with_values(values)
    }
    /// Creates `n` integer variables all covering the min..=max range
    pub fn new_int_vars(&mut self, n: usize, min: isize, max: isize) -> Vec<Variable> {
        (0..n).map(|_| self.new_int_var(min, max)).collect()
    }
    /// Installs a given modeling construct into the space
    pub fn install(&mut self, construct: &dyn ModelingConstruct) -> Result<(), ModelError> {
        self.ensure_building()?;
        construct.install(self)
    }
    /// Posts the given propagator. The propagator is scheduled for an initial
    /// run during the next fixpoint.
    pub fn post(&mut self, propagator: Box<dyn Propagator>) -> Result<Constraint, ModelError> {
        self.ensure_building()?;
        Ok(self.engine.post(propagator))
    }
    /// Schedules the execution of a given constraint (propagator)
    pub fn schedule(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        self.ensure_building()?;
        self.engine.schedule(constraint);
        Ok(())
    }
    /// Tells the space that the given constraint should be propagated whenever
    /// the condition is satisfied
    pub fn propagate_on(
        &mut self,
        constraint: Constraint,
        cond: DomainCondition,
    ) -> Result<(), ModelError> {
        self.ensure_building()?;
        self.engine.propagate_on(constraint, cond);
        Ok(())
    }
    /// Subscribes the constraint to the changes of `var` at the given
    /// granularity
    pub fn subscribe(
        &mut self,
        constraint: Constraint,
        var: Variable,
        granularity: Granularity,
    ) -> Result<(), ModelError> {
        for cond in granularity.conditions(var) {
            self.propagate_on(constraint, cond)?;
        }
        Ok(())
    }
    /// Adds a branching directive. Branchers are used in the order in which
    /// they have been added: a brancher only gets to make a choice once all
    /// the variables of the previous ones are fixed.
    pub fn branch(
        &mut self,
        vars: &[Variable],
        var_selection: VarSelection,
        val_selection: ValSelection,
    ) -> Result<(), ModelError> {
        self.ensure_building()?;
        Arc::make_mut(&mut self.branchers).push(Brancher::new(
            vars.to_vec(),
            var_selection,
            val_selection,
        ));
        Ok(())
    }
    /// Forbids the overlap of the rectangles `[x_i, x_i+w_i) × [y_i, y_i+h_i)`
    pub fn post_no_overlap(
        &mut self,
        xs: &[Variable],
        widths: &[isize],
        ys: &[Variable],
        heights: &[isize],
    ) -> Result<(), ModelError> {
        let constraint = NoOverlap::new(xs.to_vec(), widths.to_vec(), ys.to_vec(), heights.to_vec())?;
        self.install(&constraint)
    }
    /// Runs the propagation until a fixpoint is reached and tells what the
    /// space has become. Once failed, a space never recovers.
    pub fn status(&mut self) -> SpaceStatus {
        if self.status == SpaceStatus::Failed || self.domains.is_failed() {
            self.status = SpaceStatus::Failed;
            return self.status;
        }
        self.status = match self.engine.fixpoint(&mut self.domains) {
            Err(_) => SpaceStatus::Failed,
            Ok(()) if self.choice().is_none() => {
                self.engine.retire_entailed(&self.domains);
                SpaceStatus::Solved
            }
            Ok(()) => SpaceStatus::Stable,
        };
        self.status
    }
    /// Returns the next choice to branch on, or None when all the branching
    /// variables are fixed (or the space has failed)
    pub fn choice(&self) -> Option<Choice> {
        if self.domains.is_failed() {
            return None;
        }
        self.branchers
            .iter()
            .find_map(|brancher| brancher.choice(&self.domains))
    }
    /// Narrows the domains according to the given decision and propagates it
    pub fn commit(&mut self, decision: Decision) -> SpaceStatus {
        trace!(?decision, "commit");
        if decision.apply(&mut self.domains).is_err() {
            self.status = SpaceStatus::Failed;
            return self.status;
        }
        self.status()
    }
    /// Returns the values of all the given variables if they are all fixed
    pub fn values(&self, vars: &[Variable]) -> Option<Vec<isize>> {
        vars.iter().map(|v| self.domains.value(*v)).collect()
    }
    /// Iterates over the values of the domain of `var` in increasing order
    pub fn domain(&self, var: Variable) -> impl Iterator<Item = isize> + '_ {
        self.domains.values(var)
    }
    /// Returns the number of variables declared in this space
    pub fn nb_vars(&self) -> usize {
        self.domains.len()
    }
    /// Returns the number of propagators which have not been retired yet
    pub fn active_propagators(&self) -> usize {
        self.engine.active()
    }
    /// Returns the number of propagator executions so far
    pub fn propagations(&self) -> u64 {
        self.engine.propagations()
    }
    /// Fails unless the space is still being built
    fn ensure_building(&self) -> Result<(), ModelError> {
        if self.status == SpaceStatus::Building {
            Ok(())
        } else {
            Err(ModelError::NotBuilding)
        }
    }
}

impl DomainStore for Space {
    fn min(&self, var: Variable) -> Option<isize> {
        self.domains.min(var)
    }
    fn max(&self, var: Variable) -> Option<isize> {
        self.domains.max(var)
    }
    fn size(&self, var: Variable) -> usize {
        self.domains.size(var)
    }
    fn contains(&self, var: Variable, value: isize) -> bool {
        self.domains.contains(var, value)
    }
    fn is_failed(&self) -> bool {
        self.status == SpaceStatus::Failed || self.domains.is_failed()
    }
    fn fix(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        self.domains.fix(var, value)
    }
    fn remove(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        self.domains.remove(var, value)
    }
    fn remove_below(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        self.domains.remove_below(var, value)
    }
    fn remove_above(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        self.domains.remove_above(var, value)
    }
}
