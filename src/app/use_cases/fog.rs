//! Use-Cases: Fog-of-War bearbeiten.

use glam::Vec2;

use crate::app::EditorState;
use crate::core::{FogMask, FogMode, FogTool};

pub fn set_fog_mode(state: &mut EditorState, mode: FogMode) {
    state.fog_mode = mode;
}

pub fn set_fog_tool(state: &mut EditorState, tool: FogTool) {
    state.fog_tool = tool;
}

/// Legt eine neue (vollständig aufgedeckte) Maske über `size` Pixel an.
///
/// Der Ursprung folgt dem Raster-Offset der Stage.
pub fn resize_fog(state: &mut EditorState, size: Vec2) -> anyhow::Result<()> {
    if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
        anyhow::bail!("Ungültige Fog-Größe: {} × {}", size.x, size.y);
    }
    let origin = Vec2::new(state.stage.grid.offset.left, state.stage.grid.offset.top);
    let mask = FogMask::covering(origin, size, state.options.fog_cell_size)?;
    log::info!("Fog-Maske neu angelegt: {} × {} Zellen", mask.cols, mask.rows);
    state.mutate_stage(|stage| stage.fog = mask);
    Ok(())
}

pub fn hide_all(state: &mut EditorState) {
    state.mutate_stage(|stage| stage.fog.hide_all());
    log::info!("Fog: alles verdeckt");
}

pub fn reveal_all(state: &mut EditorState) {
    state.mutate_stage(|stage| stage.fog.reveal_all());
    log::info!("Fog: alles aufgedeckt");
}

/// Wendet ein Polygon im aktuellen Modus an. Liefert die Anzahl geänderter Zellen.
pub fn apply_fog_polygon(state: &mut EditorState, polygon: &[Vec2]) -> usize {
    let mode = state.fog_mode;
    let changed = state.mutate_stage(|stage| stage.fog.apply_polygon(polygon, mode));
    log::info!("Fog-Polygon ({mode:?}): {changed} Zellen geändert");
    changed
}

/// Flächenfüllung ab `seed`, begrenzt durch blockierende Wandspannen.
pub fn bucket_fill_fog(state: &mut EditorState, seed: Vec2) -> usize {
    let mode = state.fog_mode;
    let barriers = state.stage.barrier_lines();
    let changed = state.mutate_stage(|stage| stage.fog.bucket_fill(seed, mode, &barriers));
    log::info!(
        "Fog-Füllung ({mode:?}) ab ({:.1}, {:.1}): {changed} Zellen geändert",
        seed.x,
        seed.y
    );
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FogCell, Stage};
    use crate::shared::EditorOptions;

    fn state() -> EditorState {
        let mut state = EditorState::new(Stage::new("stage-1"), EditorOptions::default());
        resize_fog(&mut state, Vec2::new(100.0, 100.0)).expect("gültig");
        state
    }

    #[test]
    fn neue_maske_ist_aufgedeckt() {
        let state = state();
        assert_eq!(state.stage.fog.cols, 10);
        assert_eq!(state.stage.fog.rows, 10);
        assert_eq!(state.stage.fog.hidden_count(), 0);
    }

    #[test]
    fn modus_bestimmt_zielzustand() {
        let mut state = state();
        let polygon = [
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(0.0, 50.0),
        ];
        assert_eq!(apply_fog_polygon(&mut state, &polygon), 25);
        assert_eq!(state.stage.fog.get(0, 0), Some(FogCell::Hidden));

        set_fog_mode(&mut state, FogMode::Subtract);
        hide_all(&mut state);
        assert_eq!(apply_fog_polygon(&mut state, &polygon), 25);
        assert_eq!(state.stage.fog.hidden_count(), 75);
    }

    #[test]
    fn wiederholte_anwendung_erzeugt_keine_mutation() {
        let mut state = state();
        hide_all(&mut state);
        state.outbox.drain();
        hide_all(&mut state);
        assert_eq!(state.outbox.queued_len(), 0);
    }

    #[test]
    fn fuellung_ohne_waende_terminiert() {
        let mut state = state();
        assert_eq!(bucket_fill_fog(&mut state, Vec2::new(5.0, 5.0)), 100);
        assert_eq!(bucket_fill_fog(&mut state, Vec2::new(500.0, 5.0)), 0);
    }

    #[test]
    fn ungueltige_groesse() {
        let mut state = state();
        assert!(resize_fog(&mut state, Vec2::new(0.0, 10.0)).is_err());
        assert!(resize_fog(&mut state, Vec2::new(f32::NAN, 10.0)).is_err());
    }
}
