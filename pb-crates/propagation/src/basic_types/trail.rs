use std::ops::Deref;

use crate::pb_assert_simple;

/// Entries in assignment order, grouped by the decision level at which they were pushed.
///
/// Level `0` is the root. Popping entries and leaving a level are separate steps: the caller pops
/// down to [`Trail::length_at_level`] and then calls [`Trail::synchronise`].
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    entries: Vec<T>,
    /// `level_starts[d - 1]` is the number of entries pushed before level `d` was opened.
    level_starts: Vec<usize>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            entries: Vec::new(),
            level_starts: Vec::new(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn increase_decision_level(&mut self) {
        self.level_starts.push(self.entries.len());
    }

    pub(crate) fn get_decision_level(&self) -> usize {
        self.level_starts.len()
    }

    /// The number of entries pushed at `decision_level` or below.
    pub(crate) fn length_at_level(&self, decision_level: usize) -> usize {
        pb_assert_simple!(decision_level <= self.get_decision_level());

        self.level_starts
            .get(decision_level)
            .copied()
            .unwrap_or(self.entries.len())
    }

    pub(crate) fn push(&mut self, entry: T) {
        self.entries.push(entry)
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.entries.pop()
    }

    /// Closes every level above `decision_level`. Their entries must already be popped.
    pub(crate) fn synchronise(&mut self, decision_level: usize) {
        pb_assert_simple!(decision_level <= self.get_decision_level());
        pb_assert_simple!(self.entries.len() == self.length_at_level(decision_level));

        self.level_starts.truncate(decision_level);
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.entries
    }
}
