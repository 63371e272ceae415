//! Use-Cases: Undo/Redo über Stage-Snapshots.

use crate::app::history::Snapshot;
use crate::app::EditorState;

/// Stellt den letzten Stand wieder her. Die Differenz wird als Mutation eingereiht.
pub fn undo(state: &mut EditorState) -> bool {
    let current = Snapshot::of(&state.stage);
    match state.history.step_back(current) {
        Some(previous) => {
            state.restore(previous);
            log::info!("Undo ausgeführt");
            true
        }
        None => {
            log::debug!("Undo: nichts rückgängig zu machen");
            false
        }
    }
}

pub fn redo(state: &mut EditorState) -> bool {
    let current = Snapshot::of(&state.stage);
    match state.history.step_forward(current) {
        Some(next) => {
            state.restore(next);
            log::info!("Redo ausgeführt");
            true
        }
        None => {
            log::debug!("Redo: nichts wiederherzustellen");
            false
        }
    }
}
