use crate::basic_types::ConstraintReference;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::pb_assert_moderate;

/// What a constraint remembers about one of its watches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchHint {
    /// A clause watch; `blocker` is the other watched literal at the time the watch was created. If
    /// it is true, the clause is satisfied and does not need to be inspected.
    Clause { blocker: Literal },
    /// A cardinality watch at position `index` of the constraint.
    Cardinality { index: u32 },
    /// A weighted watch on the term at position `index` of the constraint.
    Weighted { index: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Watcher {
    pub constraint: ConstraintReference,
    pub hint: WatchHint,
}

/// For every literal, the constraints that need to be notified when the literal becomes false.
///
/// Constraints only ever append to these lists; removing stale entries is done by the owner while
/// iterating (see [`ConstraintPropagator`](crate::engine::ConstraintPropagator)).
#[derive(Debug, Default)]
pub struct WatchLists {
    watchers: KeyedVec<Literal, Vec<Watcher>>,
}

impl WatchLists {
    /// Makes room for the two literals of `variable`.
    pub fn grow(&mut self, variable: Variable) {
        self.watchers.extend_to(Literal::positive(variable));
        self.watchers.extend_to(Literal::negative(variable));
    }

    pub fn num_literals(&self) -> usize {
        self.watchers.len()
    }

    pub fn watch(&mut self, literal: Literal, watcher: Watcher) {
        self.watchers[literal].push(watcher)
    }

    pub fn watchers(&self, literal: Literal) -> &[Watcher] {
        &self.watchers[literal]
    }

    /// Moves the watch list of `literal` out so that it can be iterated while constraints add new
    /// watches; it has to be given back with [`WatchLists::restore`].
    pub(crate) fn take(&mut self, literal: Literal) -> Vec<Watcher> {
        std::mem::take(&mut self.watchers[literal])
    }

    pub(crate) fn restore(&mut self, literal: Literal, mut watchers: Vec<Watcher>) {
        let added_meanwhile = &mut self.watchers[literal];
        pb_assert_moderate!(
            added_meanwhile.is_empty(),
            "a constraint watched a false literal"
        );
        watchers.append(added_meanwhile);
        self.watchers[literal] = watchers;
    }

    /// Removes every watcher for which `should_remove` holds.
    pub(crate) fn purge(&mut self, mut should_remove: impl FnMut(&Watcher) -> bool) -> usize {
        let mut num_removed = 0;
        for list in self.watchers.iter_mut() {
            let before = list.len();
            list.retain(|watcher| !should_remove(watcher));
            num_removed += before - list.len();
        }
        num_removed
    }

    pub fn num_watchers(&self, reference: ConstraintReference) -> usize {
        self.watchers
            .iter()
            .flatten()
            .filter(|watcher| watcher.constraint == reference)
            .count()
    }
}
