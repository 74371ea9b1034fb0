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

//! Variables, their domains and the store that narrows them. The store also
//! keeps track of what happened to each domain so that the propagation
//! engine knows which propagators to wake up.

use tracing::warn;

use super::SparseSet;

/// Raised when some domain gets wiped out
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq, Hash)]
#[error("inconsistency")]
pub struct Inconsistency;

/// Any narrowing or propagation step may wipe out a domain
pub type CPResult<T> = Result<T, Inconsistency>;

/// An integer variable that can be used in a CP model. It is nothing but the
/// stable index of the variable in the domain store of the space that
/// declared it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// Returns the position of this variable in its domain store
    pub fn id(self) -> usize {
        self.0
    }
}

/// Tells whether a narrowing operation actually modified the domain of the
/// variable it was applied to. (Failures are reported as an Inconsistency)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// The domain was left untouched
    Unchanged,
    /// At least one value was removed from the domain
    Changed,
}
impl Change {
    /// Returns true iff the domain was modified
    pub fn is_changed(self) -> bool {
        matches!(self, Change::Changed)
    }
}
impl From<bool> for Change {
    fn from(changed: bool) -> Self {
        if changed {
            Change::Changed
        } else {
            Change::Unchanged
        }
    }
}

/// The view of the domains that is handed over to propagators and branching
/// decisions. It lets them read and narrow domains, while the bookkeeping of
/// events is kept behind the DomainBroker facet.
pub trait DomainStore {
    /// Smallest value left in the domain of `var` (None when empty)
    fn min(&self, var: Variable) -> Option<isize>;
    /// Largest value left in the domain of `var` (None when empty)
    fn max(&self, var: Variable) -> Option<isize>;
    /// Number of values left in the domain of `var`
    fn size(&self, var: Variable) -> usize;
    /// Is `value` still possible for `var` ?
    fn contains(&self, var: Variable, value: isize) -> bool;
    /// Returns true iff some domain has been emptied. Once failed, a store
    /// stays failed and refuses any further modification.
    fn is_failed(&self) -> bool;
    /// Is exactly one value left for `var` ?
    fn is_fixed(&self, var: Variable) -> bool {
        self.size(var) == 1
    }
    /// Returns true iff the domain of the target variable is empty
    fn is_empty(&self, var: Variable) -> bool {
        self.size(var) == 0
    }
    /// Returns the value of the variable if it is fixed
    fn value(&self, var: Variable) -> Option<isize> {
        if self.is_fixed(var) {
            self.min(var)
        } else {
            None
        }
    }
    /// Narrows the domain of `var` to the single `value`. Fails when `value`
    /// is not part of the domain
    fn fix(&mut self, var: Variable, value: isize) -> CPResult<Change>;
    /// Excludes `value` from the domain of `var`. Fails when it was the last
    /// value of that domain
    fn remove(&mut self, var: Variable, value: isize) -> CPResult<Change>;
    /// Imposes `var >= value`. Fails when no value of the domain satisfies
    /// that bound
    fn remove_below(&mut self, var: Variable, value: isize) -> CPResult<Change>;
    /// Imposes `var <= value`. Fails when no value of the domain satisfies
    /// that bound
    fn remove_above(&mut self, var: Variable, value: isize) -> CPResult<Change>;

    /// Is the 0,1 variable `var` fixed to 1 ?
    fn is_true(&self, var: Variable) -> bool {
        self.min(var) == Some(1)
    }
    /// Is the 0,1 variable `var` fixed to 0 ?
    fn is_false(&self, var: Variable) -> bool {
        self.max(var) == Some(0)
    }
    /// Fixes the 0,1 variable `var` to the given truth value
    fn fix_bool(&mut self, var: Variable, value: bool) -> CPResult<Change> {
        self.fix(var, isize::from(value))
    }
}

/// What happened to the domain of one variable since the events were last
/// cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainEvent {
    /// The variable this event is about
    pub variable: Variable,
    /// A single value is left
    pub is_fixed: bool,
    /// No value is left (the store has failed)
    pub is_empty: bool,
    /// The lower bound moved up
    pub min_changed: bool,
    /// The upper bound moved down
    pub max_changed: bool,
    /// Some value was removed
    pub domain_changed: bool,
}
impl DomainEvent {
    /// Creates an event where nothing happened to the variable
    fn none(variable: Variable) -> Self {
        Self {
            variable,
            is_fixed: false,
            is_empty: false,
            min_changed: false,
            max_changed: false,
            domain_changed: false,
        }
    }
    /// Returns true iff something is worth reporting in this event
    fn is_relevant(&self) -> bool {
        self.is_empty | self.is_fixed | self.min_changed | self.max_changed | self.domain_changed
    }
}

/// The facet of the store that the propagation engine uses to find out which
/// domains have changed.
pub trait DomainBroker {
    /// Resets the events of all touched variables
    fn clear_events(&mut self);
    /// Calls `f` on the event of every touched variable
    fn for_each_event<F: FnMut(DomainEvent)>(&self, f: F);
}

/// The domains of all the variables of a space, one sparse set each, along
/// with the pending events.
///
/// Cloning a domain store yields a fully independent copy of all domains.
#[derive(Debug, Clone, Default)]
pub struct DomainStoreImpl {
    /// One sparse set per variable
    domains: Vec<SparseSet>,
    /// The events attached to all variables
    events: Vec<DomainEvent>,
    /// The variables whose event is not blank
    touched: Vec<Variable>,
    /// Set as soon as one domain is wiped out
    failed: bool,
}

impl DomainStoreImpl {
    /// Creates a new empty domain store
    pub fn new() -> Self {
        Self::default()
    }
    /// Creates a new integer variable covering the min..=max range of values.
    /// When min > max, the domain of the variable is empty and the store
    /// becomes failed.
    ///
    /// # Note
    /// The number of values of a domain must be representable as an isize
    /// (that is, `max - min + 1 <= isize::MAX`). A wider range cannot be
    /// represented: it yields an empty domain and a failed store.
    pub fn new_int_var(&mut self, min: isize, max: isize) -> Variable {
        let n = if min > max {
            0
        } else {
            match max.checked_sub(min).and_then(|w| w.checked_add(1)) {
                Some(width) => width as usize,
                None => {
                    warn!(min, max, "the domain is too wide to be represented");
                    0
                }
            }
        };
        let variable = Variable(self.domains.len());
        self.domains.push(SparseSet::new(n, min));
        self.events.push(DomainEvent::none(variable));
        if n == 0 {
            self.failed = true;
        }
        variable
    }
    /// Creates a new binary 0,1 variable
    pub fn new_bool_var(&mut self) -> Variable {
        self.new_int_var(0, 1)
    }
    /// Creates a new integer variable whose domain comprises exactly the given
    /// values
    pub fn new_int_var_with_values(&mut self, values: &[isize]) -> Variable {
        let min = values.iter().copied().min().unwrap_or(1);
        let max = values.iter().copied().max().unwrap_or(0);
        let variable = self.new_int_var(min, max);
        let domain = &mut self.domains[variable.0];
        for v in min..=max {
            if !values.contains(&v) {
                domain.remove(v);
            }
        }
        variable
    }
    /// Returns the number of variables declared in this store
    pub fn len(&self) -> usize {
        self.domains.len()
    }
    /// Returns true iff no variable was declared in this store
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
    /// Iterates over the values of the domain of `var` in increasing order
    pub fn values(&self, var: Variable) -> impl Iterator<Item = isize> + '_ {
        self.domains[var.0].iter()
    }
    /// Marks the store as failed (this happens when a propagator detects an
    /// inconsistency without wiping out any domain)
    pub fn fail(&mut self) {
        self.failed = true;
    }
}

impl DomainStore for DomainStoreImpl {
    fn min(&self, var: Variable) -> Option<isize> {
        self.domains[var.0].min()
    }

    fn max(&self, var: Variable) -> Option<isize> {
        self.domains[var.0].max()
    }

    fn size(&self, var: Variable) -> usize {
        self.domains[var.0].size()
    }

    fn contains(&self, var: Variable, value: isize) -> bool {
        self.domains[var.0].contains(value)
    }

    fn is_failed(&self) -> bool {
        self.failed
    }

    fn fix(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        if self.failed {
            return Err(Inconsistency);
        }
        let dom = &mut self.domains[var.0];
        if !dom.contains(value) {
            dom.remove_all();
            self.wipe_out(var)
        } else if dom.size() == 1 {
            Ok(Change::Unchanged)
        } else {
            let min_changed = dom.min() != Some(value);
            let max_changed = dom.max() != Some(value);
            dom.remove_all_but(value);
            self.record(var, |e| {
                e.min_changed |= min_changed;
                e.max_changed |= max_changed;
                e.domain_changed = true;
                e.is_fixed = true;
            });
            Ok(Change::Changed)
        }
    }

    fn remove(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        if self.failed {
            return Err(Inconsistency);
        }
        let dom = &mut self.domains[var.0];
        if !dom.contains(value) {
            // there is nothing to do
            return Ok(Change::Unchanged);
        }
        let min_changed = dom.min() == Some(value);
        let max_changed = dom.max() == Some(value);
        dom.remove(value);
        match dom.size() {
            0 => self.wipe_out(var),
            size => {
                self.record(var, |e| {
                    e.min_changed |= min_changed;
                    e.max_changed |= max_changed;
                    e.is_fixed |= size == 1;
                    e.domain_changed = true;
                });
                Ok(Change::Changed)
            }
        }
    }

    fn remove_below(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        if self.failed {
            return Err(Inconsistency);
        }
        let dom = &mut self.domains[var.0];
        if !dom.remove_below(value) {
            // Nothing to do
            return Ok(Change::Unchanged);
        }
        match dom.size() {
            0 => self.wipe_out(var),
            size => {
                self.record(var, |e| {
                    e.min_changed = true;
                    e.is_fixed |= size == 1;
                    e.domain_changed = true;
                });
                Ok(Change::Changed)
            }
        }
    }

    fn remove_above(&mut self, var: Variable, value: isize) -> CPResult<Change> {
        if self.failed {
            return Err(Inconsistency);
        }
        let dom = &mut self.domains[var.0];
        if !dom.remove_above(value) {
            // Nothing to do
            return Ok(Change::Unchanged);
        }
        match dom.size() {
            0 => self.wipe_out(var),
            size => {
                self.record(var, |e| {
                    e.max_changed = true;
                    e.is_fixed |= size == 1;
                    e.domain_changed = true;
                });
                Ok(Change::Changed)
            }
        }
    }
}

impl DomainBroker for DomainStoreImpl {
    fn clear_events(&mut self) {
        for var in self.touched.drain(..) {
            self.events[var.0] = DomainEvent::none(var);
        }
    }

    fn for_each_event<F: FnMut(DomainEvent)>(&self, f: F) {
        self.touched
            .iter()
            .map(|v| self.events[v.0])
            .filter(DomainEvent::is_relevant)
            .for_each(f);
    }
}
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// private methods
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
impl DomainStoreImpl {
    /// Updates the event of the given variable
    fn record<F: FnOnce(&mut DomainEvent)>(&mut self, var: Variable, f: F) {
        let event = &mut self.events[var.0];
        if !event.is_relevant() {
            self.touched.push(var);
        }
        f(event);
    }
    /// Records the wipe out of the domain of `var` and fails the store
    fn wipe_out(&mut self, var: Variable) -> CPResult<Change> {
        self.record(var, |e| {
            e.is_empty = true;
            e.domain_changed = true;
        });
        self.failed = true;
        Err(Inconsistency)
    }
}
