//! # History
//!
//! A bounded, linear undo/redo log per [`Side`], made of full-state [`Snapshot`]s taken after every
//! structural change. Full snapshots rather than inverse operations: simple, and at a few dozen elements
//! per surface the memory is no concern.
//!
//! The top of a side's undo stack is always the state the surface currently displays. Callers apply
//! the snapshots returned by [`HistoryTracker::undo`] and [`HistoryTracker::redo`] back onto the surface.
//!
//! The bottom entry is the *floor*. It is never popped by undo. Before eviction kicks in, the floor is
//! the snapshot the side was [`seed`](HistoryTracker::seed)ed with. Once more than
//! [`HISTORY_CAPACITY`] entries have been pushed, the oldest entries are dropped and the floor moves
//! forward, silently limiting how far back undo reaches.

use std::collections::VecDeque;

use crate::surface::{Side, Snapshot};

/// Maximum entries kept on a side's undo stack.
pub const HISTORY_CAPACITY: usize = 80;

#[derive(Default)]
struct Stacks {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
}

pub struct HistoryTracker {
    capacity: usize,
    sides: [Stacks; 2],
}
impl Default for HistoryTracker {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}
impl HistoryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// A tracker keeping at most `capacity` entries per side. At least two are kept, so that
    /// there is always something to undo to after an edit.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            sides: Default::default(),
        }
    }
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Forget a side's history, starting over from `initial` as the floor.
    pub fn seed(&mut self, side: Side, initial: Snapshot) {
        let stacks = &mut self.sides[side.index()];
        stacks.undo.clear();
        stacks.redo.clear();
        stacks.undo.push_back(initial);
    }
    /// Record the state after an edit. Clears that side's redo stack.
    pub fn push(&mut self, side: Side, snapshot: Snapshot) {
        let stacks = &mut self.sides[side.index()];
        log::trace!(
            "{side}: history push {snapshot:?} ({} entries)",
            stacks.undo.len() + 1
        );
        stacks.undo.push_back(snapshot);
        while stacks.undo.len() > self.capacity {
            stacks.undo.pop_front();
        }
        stacks.redo.clear();
    }
    /// Step back one entry, returning the state to display.
    /// `None` if already at the floor: there is nothing to undo.
    pub fn undo(&mut self, side: Side) -> Option<Snapshot> {
        let stacks = &mut self.sides[side.index()];
        if stacks.undo.len() <= 1 {
            return None;
        }
        // Checked len above.
        let current = stacks.undo.pop_back()?;
        stacks.redo.push(current);
        stacks.undo.back().cloned()
    }
    /// Step forward one entry, returning the state to display.
    /// `None` if nothing was undone since the last edit.
    pub fn redo(&mut self, side: Side) -> Option<Snapshot> {
        let stacks = &mut self.sides[side.index()];
        let next = stacks.redo.pop()?;
        stacks.undo.push_back(next.clone());
        Some(next)
    }
    /// The state the side should currently be displaying.
    #[must_use]
    pub fn current(&self, side: Side) -> Option<&Snapshot> {
        self.sides[side.index()].undo.back()
    }
    /// Entries on the undo stack, including the current state.
    #[must_use]
    pub fn depth(&self, side: Side) -> usize {
        self.sides[side.index()].undo.len()
    }
    #[must_use]
    pub fn redo_depth(&self, side: Side) -> usize {
        self.sides[side.index()].redo.len()
    }
    #[must_use]
    pub fn can_undo(&self, side: Side) -> bool {
        self.depth(side) > 1
    }
    #[must_use]
    pub fn can_redo(&self, side: Side) -> bool {
        self.redo_depth(side) > 0
    }
}

#[cfg(test)]
mod test {
    use super::{HistoryTracker, HISTORY_CAPACITY};
    use crate::surface::{Side, Snapshot};

    fn snap(n: usize) -> Snapshot {
        Snapshot::new(format!("state {n}"))
    }
    fn seeded() -> HistoryTracker {
        let mut history = HistoryTracker::new();
        history.seed(Side::Front, snap(0));
        history.seed(Side::Back, snap(0));
        history
    }

    #[test]
    fn floor_is_never_popped() {
        let mut history = seeded();
        assert_eq!(history.undo(Side::Front), None);
        assert_eq!(history.depth(Side::Front), 1);
        assert_eq!(history.current(Side::Front), Some(&snap(0)));
    }
    #[test]
    fn undo_walks_back_one_edit_at_a_time() {
        let mut history = seeded();
        let edits = HISTORY_CAPACITY - 1;
        for n in 1..=edits {
            history.push(Side::Front, snap(n));
        }
        assert_eq!(history.depth(Side::Front), HISTORY_CAPACITY);
        for n in (0..edits).rev() {
            assert_eq!(history.undo(Side::Front), Some(snap(n)));
            assert_eq!(history.current(Side::Front), Some(&snap(n)));
        }
        assert_eq!(history.undo(Side::Front), None);
        for n in 1..=edits {
            assert_eq!(history.redo(Side::Front), Some(snap(n)));
        }
        assert_eq!(history.redo(Side::Front), None);
    }
    #[test]
    fn new_edit_clears_redo() {
        let mut history = seeded();
        history.push(Side::Front, snap(1));
        history.push(Side::Front, snap(2));
        history.undo(Side::Front);
        assert!(history.can_redo(Side::Front));
        history.push(Side::Front, snap(3));
        assert_eq!(history.redo(Side::Front), None);
        assert_eq!(history.undo(Side::Front), Some(snap(1)));
    }
    #[test]
    fn eviction_is_fifo() {
        let mut history = seeded();
        for n in 1..=200 {
            history.push(Side::Front, snap(n));
            assert!(history.depth(Side::Front) <= HISTORY_CAPACITY);
        }
        assert_eq!(history.depth(Side::Front), HISTORY_CAPACITY);
        // The oldest surviving entry is the new floor.
        let floor = 200 - HISTORY_CAPACITY + 1;
        while history.undo(Side::Front).is_some() {}
        assert_eq!(history.current(Side::Front), Some(&snap(floor)));
    }
    #[test]
    fn round_trips_are_identities() {
        let mut history = seeded();
        history.push(Side::Front, snap(1));
        history.push(Side::Front, snap(2));
        history.undo(Side::Front);

        let before = history.current(Side::Front).cloned();
        history.redo(Side::Front);
        history.undo(Side::Front);
        assert_eq!(history.current(Side::Front).cloned(), before);

        history.undo(Side::Front);
        let before = history.current(Side::Front).cloned();
        history.redo(Side::Front);
        history.undo(Side::Front);
        assert_eq!(history.current(Side::Front).cloned(), before);
        assert_eq!(before, Some(snap(0)));
    }
    #[test]
    fn sides_are_independent() {
        let mut history = seeded();
        history.push(Side::Front, snap(1));
        history.push(Side::Back, snap(10));
        history.push(Side::Back, snap(11));
        history.undo(Side::Back);

        assert_eq!(history.depth(Side::Front), 2);
        assert_eq!(history.redo_depth(Side::Front), 0);
        assert_eq!(history.depth(Side::Back), 2);
        assert_eq!(history.redo_depth(Side::Back), 1);
        history.push(Side::Front, snap(2));
        assert_eq!(history.redo_depth(Side::Back), 1);
    }
    #[test]
    fn unseeded_side_has_nothing_to_undo() {
        let mut history = HistoryTracker::new();
        assert_eq!(history.undo(Side::Back), None);
        assert_eq!(history.redo(Side::Back), None);
        assert_eq!(history.current(Side::Back), None);
    }
}
