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

//! This module provides the sparse set which is used to represent the domain
//! of one single variable. Unlike a trailed sparse set, this one owns all of
//! its data: saving the state of a sparse set amounts to cloning it.

/// A sparse set of the values
/// [0 + val_offset, 1 + val_offset, 2 + val_offset, ... , capa-1 + val_offset]
///
/// # Note
/// The set maintains the invariant that the first `size` items of `values` are
/// exactly the values that belong to the set, and that `indices[v]` gives the
/// position of v in `values`. The `min` and `max` fields are only meaningful
/// when the set is not empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseSet {
    /// offset of the values
    val_offset: isize,
    /// the current size of the sparse set
    size: usize,
    /// the minimum value in the set (included, relative to the offset)
    min: usize,
    /// the maximum value in the set (included, relative to the offset)
    max: usize,
    /// the actual content of the set
    values: Vec<usize>,
    /// the position of each value in `values`
    indices: Vec<usize>,
}

impl SparseSet {
    /// creates a new sparse set with values
    /// [0 + val_offset, 1 + val_offset, 2 + val_offset, ... , n-1 + val_offset]
    ///
    /// # Params
    /// - n: the number of values in the sparse set
    /// - val_offset: the "offset" of the first value that belongs to the set
    pub fn new(n: usize, val_offset: isize) -> Self {
        Self {
            val_offset,
            size: n,
            min: 0,
            max: n.saturating_sub(1),
            values: (0..n).collect(),
            indices: (0..n).collect(),
        }
    }
    /// returns the size of the sparse set
    pub fn size(&self) -> usize {
        self.size
    }
    /// returns true iff the sparse set is empty
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
    /// returns the minimum value of the sparse set (if it exists)
    pub fn min(&self) -> Option<isize> {
        if self.is_empty() {
            None
        } else {
            Some(self.min as isize + self.val_offset)
        }
    }
    /// returns the maximum value of the sparse set (if it exists)
    pub fn max(&self) -> Option<isize> {
        if self.is_empty() {
            None
        } else {
            Some(self.max as isize + self.val_offset)
        }
    }
    /// returns true iff the sparse set contains the designated value
    pub fn contains(&self, value: isize) -> bool {
        let val = value.saturating_sub(self.val_offset);
        if val < 0 || val >= self.indices.len() as isize {
            false
        } else {
            self.contains_raw(val as usize)
        }
    }
    /// removes the given value from the sparse set and returns a boolean telling
    /// whether or not the value was actually deleted from the set
    pub fn remove(&mut self, value: isize) -> bool {
        if !self.contains(value) {
            false
        } else {
            let val = value.saturating_sub(self.val_offset) as usize;
            self.swap_out(val);
            if !self.is_empty() {
                if self.min == val {
                    self.update_min();
                }
                if self.max == val {
                    self.update_max();
                }
            }
            true
        }
    }
    /// removes all values in the set
    pub fn remove_all(&mut self) {
        self.size = 0;
    }
    /// removes all values in the set except the given value (if it belongs
    /// to the set)
    pub fn remove_all_but(&mut self, value: isize) {
        if self.contains(value) {
            // in this case, it suffices to place the desired item in position 0
            let val = value.saturating_sub(self.val_offset) as usize;
            self.swap(self.indices[val], 0);
            self.size = 1;
            self.min = val;
            self.max = val;
        } else {
            self.remove_all();
        }
    }
    /// remove from the set all the items having a value lower than the given
    /// `value`. Returns true iff something was removed.
    pub fn remove_below(&mut self, value: isize) -> bool {
        if self.is_empty() {
            return false;
        }
        let val = value.saturating_sub(self.val_offset);
        if val <= self.min as isize {
            false
        } else if val > self.max as isize {
            self.remove_all();
            true
        } else {
            let val = val as usize;
            for x in self.min..val {
                self.swap_out(x);
            }
            self.min = val;
            self.update_min();
            true
        }
    }
    /// remove from the set all the items having a value greater than the given
    /// `value`. Returns true iff something was removed.
    pub fn remove_above(&mut self, value: isize) -> bool {
        if self.is_empty() {
            return false;
        }
        let val = value.saturating_sub(self.val_offset);
        if val >= self.max as isize {
            false
        } else if val < self.min as isize {
            self.remove_all();
            true
        } else {
            let val = val as usize;
            for x in val + 1..=self.max {
                self.swap_out(x);
            }
            self.max = val;
            self.update_max();
            true
        }
    }
    /// Iterates over the values of the set in increasing order
    pub fn iter(&self) -> impl Iterator<Item = isize> + '_ {
        let range = if self.is_empty() {
            1..=0
        } else {
            self.min..=self.max
        };
        range
            .filter(move |v| self.contains_raw(*v))
            .map(move |v| v as isize + self.val_offset)
    }
}
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// private methods
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
impl SparseSet {
    /// true iff the raw (offset free) value belongs to the set
    fn contains_raw(&self, val: usize) -> bool {
        self.indices[val] < self.size
    }
    /// swaps the items at positions a and b in the values vector
    fn swap(&mut self, a: usize, b: usize) {
        let va = self.values[a];
        let vb = self.values[b];
        self.values.swap(a, b);
        self.indices[va] = b;
        self.indices[vb] = a;
    }
    /// moves the raw value past the end of the set (bounds are left untouched)
    fn swap_out(&mut self, val: usize) {
        if self.contains_raw(val) {
            self.swap(self.indices[val], self.size - 1);
            self.size -= 1;
        }
    }
    /// moves the minimum up to the next value that belongs to the set
    fn update_min(&mut self) {
        if !self.is_empty() {
            while !self.contains_raw(self.min) {
                self.min += 1;
            }
        }
    }
    /// moves the maximum down to the previous value that belongs to the set
    fn update_max(&mut self) {
        if !self.is_empty() {
            while !self.contains_raw(self.max) {
                self.max -= 1;
            }
        }
    }
}

// #############################################################################
// ### UNIT TESTS ##############################################################
// #############################################################################

#[cfg(test)]
mod test_sparse_set {
    use super::*;

    #[test]
    fn a_new_set_contains_all_values() {
        let set = SparseSet::new(5, -2);
        assert_eq!(5, set.size());
        assert_eq!(Some(-2), set.min());
        assert_eq!(Some(2), set.max());
        assert_eq!(vec![-2, -1, 0, 1, 2], set.iter().collect::<Vec<_>>());
    }
    #[test]
    fn far_away_values_do_not_overflow() {
        let mut set = SparseSet::new(3, isize::MAX - 2);
        assert!(!set.contains(isize::MIN));
        assert!(!set.remove(-1));
        assert!(!set.remove_below(isize::MIN));
        assert!(!set.remove_above(isize::MAX));
        assert!(set.remove_above(isize::MIN));
        assert!(set.is_empty());
    }
    #[test]
    fn an_empty_set_has_no_bounds() {
        let set = SparseSet::new(0, 3);
        assert!(set.is_empty());
        assert_eq!(None, set.min());
        assert_eq!(None, set.max());
        assert!(!set.contains(3));
        assert_eq!(0, set.iter().count());
    }
    #[test]
    fn contains_is_false_out_of_range() {
        let set = SparseSet::new(5, 10);
        assert!(!set.contains(9));
        assert!(!set.contains(15));
        assert!(set.contains(10));
        assert!(set.contains(14));
    }
    #[test]
    fn remove_leaves_a_hole() {
        let mut set = SparseSet::new(5, 0);
        assert!(set.remove(2));
        assert!(!set.remove(2));
        assert!(!set.contains(2));
        assert_eq!(4, set.size());
        assert_eq!(vec![0, 1, 3, 4], set.iter().collect::<Vec<_>>());
    }
    #[test]
    fn removing_the_min_updates_the_min() {
        let mut set = SparseSet::new(5, 0);
        assert!(set.remove(1));
        assert!(set.remove(0));
        assert_eq!(Some(2), set.min());
    }
    #[test]
    fn removing_the_max_updates_the_max() {
        let mut set = SparseSet::new(5, 0);
        assert!(set.remove(3));
        assert!(set.remove(4));
        assert_eq!(Some(2), set.max());
    }
    #[test]
    fn remove_all_but_keeps_one_value() {
        let mut set = SparseSet::new(5, 0);
        set.remove_all_but(3);
        assert_eq!(1, set.size());
        assert_eq!(Some(3), set.min());
        assert_eq!(Some(3), set.max());
    }
    #[test]
    fn remove_all_but_a_missing_value_empties_the_set() {
        let mut set = SparseSet::new(5, 0);
        set.remove(3);
        set.remove_all_but(3);
        assert!(set.is_empty());
    }
    #[test]
    fn remove_below_skips_holes() {
        let mut set = SparseSet::new(10, 0);
        set.remove(4);
        assert!(set.remove_below(4));
        assert_eq!(Some(5), set.min());
        assert_eq!(5, set.size());
        assert!(!set.remove_below(5));
    }
    #[test]
    fn remove_above_skips_holes() {
        let mut set = SparseSet::new(10, 0);
        set.remove(5);
        assert!(set.remove_above(5));
        assert_eq!(Some(4), set.max());
        assert_eq!(5, set.size());
        assert!(!set.remove_above(4));
    }
    #[test]
    fn remove_below_past_max_empties_the_set() {
        let mut set = SparseSet::new(10, 0);
        assert!(set.remove_below(20));
        assert!(set.is_empty());
    }
    #[test]
    fn remove_above_below_min_empties_the_set() {
        let mut set = SparseSet::new(10, 0);
        assert!(set.remove_above(-1));
        assert!(set.is_empty());
    }
    #[test]
    fn clones_are_independent() {
        let mut a = SparseSet::new(4, 0);
        let b = a.clone();
        a.remove(1);
        assert!(!a.contains(1));
        assert!(b.contains(1));
    }
}
