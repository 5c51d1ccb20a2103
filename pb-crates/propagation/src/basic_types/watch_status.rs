/// The answer of a constraint after it has been notified that one of its watched literals became
/// false.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchStatus {
    /// The watcher stays in the watch list of the falsified literal.
    KeepWatch,
    /// The constraint replaced the watch; the watcher should be removed from the list.
    DropWatch,
    /// The constraint is violated under the current assignment. The watcher is kept.
    Conflicting,
}
