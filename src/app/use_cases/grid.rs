//! Use-Case: Rasterkonfiguration, Rasterskala und Snap-Modifier.

use crate::app::EditorState;
use crate::core::{GridConfig, SnapModifiers};

/// Übernimmt eine neue Rasterkonfiguration nach Validierung.
pub fn set_grid_config(state: &mut EditorState, grid: GridConfig) -> anyhow::Result<()> {
    grid.validate(state.options.min_cell_size)?;
    log::info!(
        "Raster gesetzt: {:?} {}×{} (Offset {}, {}), Snap {}",
        grid.grid_type,
        grid.cell_size.width,
        grid.cell_size.height,
        grid.offset.left,
        grid.offset.top,
        grid.snap
    );
    state.mutate_stage(|stage| stage.grid = grid);
    Ok(())
}

/// Setzt die Rasterskala (Fuß pro Zelle).
pub fn set_grid_scale(state: &mut EditorState, feet_per_cell: f32) -> anyhow::Result<()> {
    if !feet_per_cell.is_finite() || feet_per_cell <= 0.0 {
        anyhow::bail!("Ungültige Rasterskala: {feet_per_cell} ft pro Zelle");
    }
    state.mutate_stage(|stage| stage.grid_scale = feet_per_cell);
    log::info!("Rasterskala: {feet_per_cell} ft pro Zelle");
    Ok(())
}

/// Merkt die aktuell gehaltenen Modifier-Tasten für das Snapping.
pub fn set_snap_modifiers(state: &mut EditorState, modifiers: SnapModifiers) {
    state.snap_modifiers = modifiers;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GridType, Stage};
    use crate::shared::EditorOptions;

    fn state() -> EditorState {
        EditorState::new(Stage::new("stage-1"), EditorOptions::default())
    }

    #[test]
    fn zu_kleine_zellen_werden_abgelehnt() {
        let mut state = state();
        let result = set_grid_config(&mut state, GridConfig::new(GridType::Square, 4.0));
        assert!(result.is_err());
        assert_eq!(state.stage.grid, GridConfig::default());
        assert!(!state.can_undo());
    }

    #[test]
    fn raster_wechsel_ist_rueckgaengig_machbar() {
        let mut state = state();
        set_grid_config(&mut state, GridConfig::new(GridType::HexV, 60.0)).expect("gültig");
        assert_eq!(state.stage.grid.grid_type, GridType::HexV);
        assert!(state.can_undo());
    }

    #[test]
    fn rasterskala_muss_positiv_sein() {
        let mut state = state();
        assert!(set_grid_scale(&mut state, 0.0).is_err());
        assert!(set_grid_scale(&mut state, f32::NAN).is_err());
        set_grid_scale(&mut state, 10.0).expect("gültig");
        assert_eq!(state.stage.grid_scale, 10.0);
    }
}
