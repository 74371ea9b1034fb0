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

//! This module provides the propagation engine: the entity which stores the
//! propagators, listens to the domain events and runs the scheduled
//! propagators until a fixpoint is reached.

use std::{cmp::Reverse, collections::BinaryHeap, sync::Arc};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use super::{
    CPResult, Constraint, DomainBroker, DomainCondition, DomainStore, DomainStoreImpl,
    PropStatus, Propagator, Variable,
};

/// The propagation engine of one space.
///
/// # Note
/// The listeners and the variables watched by each constraint are only ever
/// modified while the space is being built. That is why they are shared
/// (behind an `Arc`) between a space and all of its clones, while the
/// propagators themselves are deep copied.
pub struct PropagationEngine {
    /// These are the propagators that might be used to effectively trim down
    /// the variable domains. A retired (subsumed) propagator leaves a `None`
    /// in its slot so that constraint identifiers remain stable.
    propagators: Vec<Option<Box<dyn Propagator>>>,
    /// This establishes a correspondence between a domain condition and all
    /// the propagators that need to be scheduled
    listeners: Arc<FxHashMap<DomainCondition, FxHashSet<Constraint>>>,
    /// The variables each constraint has subscribed to
    watched: Arc<Vec<Vec<Variable>>>,
    /// The scheduled propagators, cheapest first
    queue: BinaryHeap<Reverse<(usize, Constraint)>>,
    /// This field is merely used to avoid scheduling a propagator twice
    scheduled: FxHashSet<Constraint>,
    /// How many times a propagator has been run
    propagations: u64,
}

impl Default for PropagationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PropagationEngine {
    fn clone(&self) -> Self {
        Self {
            propagators: self
                .propagators
                .iter()
                .map(|p| p.as_ref().map(|p| p.boxed_clone()))
                .collect(),
            listeners: Arc::clone(&self.listeners),
            watched: Arc::clone(&self.watched),
            queue: self.queue.clone(),
            scheduled: self.scheduled.clone(),
            propagations: self.propagations,
        }
    }
}

impl std::fmt::Debug for PropagationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationEngine")
            .field("propagators", &self.propagators.len())
            .field("active", &self.active())
            .field("scheduled", &self.scheduled.len())
            .field("propagations", &self.propagations)
            .finish()
    }
}

impl PropagationEngine {
    /// Creates a new engine without any propagator
    pub fn new() -> Self {
        Self {
            propagators: vec![],
            listeners: Default::default(),
            watched: Default::default(),
            queue: BinaryHeap::new(),
            scheduled: Default::default(),
            propagations: 0,
        }
    }
    /// Posts the given propagator and schedules it for its initial run
    pub fn post(&mut self, propagator: Box<dyn Propagator>) -> Constraint {
        let constraint = Constraint(self.propagators.len());
        self.propagators.push(Some(propagator));
        Arc::make_mut(&mut self.watched).push(vec![]);
        self.schedule(constraint);
        constraint
    }
    /// Schedules the execution of a given constraint (propagator)
    pub fn schedule(&mut self, constraint: Constraint) {
        if let Some(Some(propagator)) = self.propagators.get(constraint.0) {
            if self.scheduled.insert(constraint) {
                let cost = propagator.cost().estimate();
                self.queue.push(Reverse((cost, constraint)));
            }
        }
    }
    /// Tells the engine that the given constraint should be propagated
    /// whenever the condition is satisfied
    pub fn propagate_on(&mut self, constraint: Constraint, cond: DomainCondition) {
        Arc::make_mut(&mut self.listeners)
            .entry(cond)
            .or_default()
            .insert(constraint);

        let var = match cond {
            DomainCondition::IsFixed(v)
            | DomainCondition::MinimumChanged(v)
            | DomainCondition::MaximumChanged(v)
            | DomainCondition::DomainChanged(v) => v,
        };
        let watched = &mut Arc::make_mut(&mut self.watched)[constraint.0];
        if !watched.contains(&var) {
            watched.push(var);
        }
    }
    /// Propagate all constraints until a fixpoint is reached. Upon failure,
    /// all the pending work is discarded.
    pub fn fixpoint(&mut self, domains: &mut DomainStoreImpl) -> CPResult<()> {
        loop {
            self.schedule_relevant(domains);
            let Some(Reverse((_, constraint))) = self.queue.pop() else {
                return Ok(());
            };
            self.scheduled.remove(&constraint);

            let Some(propagator) = self.propagators[constraint.0].as_mut() else {
                continue;
            };
            self.propagations += 1;
            match propagator.propagate(domains) {
                Ok(PropStatus::Fixed) => {}
                Ok(PropStatus::Subsumed) => self.propagators[constraint.0] = None,
                Err(inconsistency) => {
                    trace!(constraint = constraint.0, "propagator failed");
                    self.queue.clear();
                    self.scheduled.clear();
                    domains.clear_events();
                    domains.fail();
                    return Err(inconsistency);
                }
            }
        }
    }
    /// Retires all propagators whose watched variables are all fixed. This is
    /// only sound at fixpoint: each of them has run after the last change of
    /// its variables without failing, hence its constraint is satisfied.
    pub fn retire_entailed(&mut self, domains: &DomainStoreImpl) {
        for (slot, vars) in self.propagators.iter_mut().zip(self.watched.iter()) {
            if slot.is_some() && vars.iter().all(|v| domains.is_fixed(*v)) {
                *slot = None;
            }
        }
    }
    /// Returns the number of propagators that have not been retired yet
    pub fn active(&self) -> usize {
        self.propagators.iter().filter(|p| p.is_some()).count()
    }
    /// Returns the number of propagator executions so far
    pub fn propagations(&self) -> u64 {
        self.propagations
    }
    /// Schedules the execution of all the relevant propagators and clears the
    /// current set of events
    fn schedule_relevant(&mut self, domains: &mut DomainStoreImpl) {
        let mut woken = vec![];
        let listeners = &self.listeners;
        domains.for_each_event(|e| {
            if e.is_fixed {
                Self::schedule_cond(DomainCondition::IsFixed(e.variable), listeners, &mut woken);
            }
            if e.min_changed {
                let cond = DomainCondition::MinimumChanged(e.variable);
                Self::schedule_cond(cond, listeners, &mut woken);
            }
            if e.max_changed {
                let cond = DomainCondition::MaximumChanged(e.variable);
                Self::schedule_cond(cond, listeners, &mut woken);
            }
            if e.domain_changed {
                let cond = DomainCondition::DomainChanged(e.variable);
                Self::schedule_cond(cond, listeners, &mut woken);
            }
        });
        domains.clear_events();
        for constraint in woken {
            self.schedule(constraint);
        }
    }
    /// Collects all propagators attached to a given condition
    fn schedule_cond(
        condition: DomainCondition,
        listeners: &FxHashMap<DomainCondition, FxHashSet<Constraint>>,
        woken: &mut Vec<Constraint>,
    ) {
        if let Some(l) = listeners.get(&condition) {
            woken.extend(l.iter().copied())
        }
    }
}
