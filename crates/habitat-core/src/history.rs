/// A committed action: the state as it was before the action, plus a label.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<S> {
    pub label: String,
    pub snapshot: S,
}

/// Manages the undo/redo history as two stacks of deep-copied snapshots.
///
/// `commit` is called once per fully-committed user action with the state
/// captured before it. Transient states (gesture steps) never reach here.
#[derive(Debug, Clone)]
pub struct HistoryStack<S> {
    undo_stack: Vec<HistoryEntry<S>>,
    redo_stack: Vec<HistoryEntry<S>>,
}

impl<S: Clone> HistoryStack<S> {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn commit(&mut self, label: &str, snapshot_before: S) {
        self.undo_stack.push(HistoryEntry {
            label: label.to_string(),
            snapshot: snapshot_before,
        });
        // A new action invalidates everything that was undone.
        self.redo_stack.clear();
    }

    /// Step back. `current` is parked on the redo stack and the state to
    /// restore is returned, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: S) -> Option<S> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            label: entry.label,
            snapshot: current,
        });
        Some(entry.snapshot)
    }

    pub fn redo(&mut self, current: S) -> Option<S> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            label: entry.label,
            snapshot: current,
        });
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<S: Clone> Default for HistoryStack<S> {
    fn default() -> Self {
        Self::new()
    }
}
