//! Snapshot-basierte Undo/Redo-History der Stage.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::Stage;

/// Stand der Stage vor bzw. nach einer Änderung.
///
/// Hält nur einen `Arc`; die Stage wird erst beim nächsten `Arc::make_mut()` kopiert.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub stage: Arc<Stage>,
}

impl Snapshot {
    pub fn of(stage: &Arc<Stage>) -> Self {
        Self {
            stage: Arc::clone(stage),
        }
    }
}

/// Zwei begrenzte Stapel; bei Überlauf fällt der älteste Stand heraus.
#[derive(Debug, Default)]
pub struct EditHistory {
    past: VecDeque<Snapshot>,
    future: VecDeque<Snapshot>,
    depth: usize,
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, depth: usize) {
    if depth == 0 {
        return;
    }
    while stack.len() >= depth {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

impl EditHistory {
    pub fn with_depth(depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            depth,
        }
    }

    /// Merkt sich den Stand vor einer Änderung. Redo-Einträge verfallen.
    pub fn record(&mut self, before: Snapshot) {
        push_bounded(&mut self.past, before, self.depth);
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Liefert den vorherigen Stand; `current` wandert auf den Redo-Stapel.
    pub fn step_back(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.past.pop_back()?;
        push_bounded(&mut self.future, current, self.depth);
        Some(previous)
    }

    /// Gegenstück zu [`EditHistory::step_back`].
    pub fn step_forward(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.future.pop_back()?;
        push_bounded(&mut self.past, current, self.depth);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
