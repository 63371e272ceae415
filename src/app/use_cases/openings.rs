//! Use-Cases: Öffnungen (Türen, Fenster, Durchgänge) an Wandspannen.

use super::ensure_color;
use crate::app::mutation::OpeningUpdate;
use crate::app::EditorState;
use crate::core::{Opening, OpeningPlacement};

/// Platziert eine Öffnung auf einer bestehenden Wand.
pub fn place_opening(state: &mut EditorState, placement: OpeningPlacement) -> anyhow::Result<u32> {
    ensure_color(placement.color.as_deref())?;
    if placement.width <= 0.0 || placement.height <= 0.0 {
        anyhow::bail!(
            "Öffnung braucht positive Maße ({} × {})",
            placement.width,
            placement.height
        );
    }
    let Some(wall) = state.stage.walls.get(&placement.wall_index) else {
        anyhow::bail!("Wand {} existiert nicht", placement.wall_index);
    };

    let index = state.allocator.peek()?;
    let opening = Opening {
        index,
        name: placement
            .name
            .unwrap_or_else(|| format!("{} {index}", placement.opening_type)),
        opening_type: placement.opening_type,
        width: placement.width,
        height: placement.height,
        wall_index: placement.wall_index,
        start_pole_index: placement.start_pole_index,
        end_pole_index: placement.end_pole_index,
        visibility: placement.visibility,
        state: placement.state,
        opacity: placement.opacity,
        material: placement.material,
        color: placement.color,
    };
    opening.validate_against(wall)?;
    let index = state.allocator.allocate()?;

    log::info!(
        "Öffnung {} ({}) an Wand {} platziert, Poles {}..{}",
        index,
        opening.opening_type,
        opening.wall_index,
        opening.start_pole_index,
        opening.end_pole_index
    );
    state.mutate_stage(|stage| {
        stage.openings.insert(index, opening);
    });
    Ok(index)
}

/// Wendet ein Partial-Update an; das Ergebnis muss zur Trägerwand passen.
pub fn update_opening(
    state: &mut EditorState,
    index: u32,
    update: OpeningUpdate,
) -> anyhow::Result<bool> {
    if let Some(Some(color)) = &update.color {
        ensure_color(Some(color))?;
    }
    let Some(current) = state.stage.openings.get(&index) else {
        log::warn!("Öffnung {index} existiert nicht, Update ignoriert");
        return Ok(false);
    };
    let mut updated = current.clone();
    update.apply_to(&mut updated);
    let Some(wall) = state.stage.walls.get(&updated.wall_index) else {
        anyhow::bail!("Öffnung {index}: Wand {} existiert nicht", updated.wall_index);
    };
    updated.validate_against(wall)?;

    state.mutate_stage(|stage| {
        stage.openings.insert(index, updated);
    });
    log::info!("Öffnung {index} aktualisiert");
    Ok(true)
}

pub fn remove_opening(state: &mut EditorState, index: u32) -> bool {
    let removed = state.mutate_stage(|stage| stage.openings.shift_remove(&index).is_some());
    if removed {
        log::info!("Öffnung {index} entfernt");
    } else {
        log::warn!("Öffnung {index} existiert nicht");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::use_cases::walls::place_wall;
    use crate::core::{OpeningState, Stage, WallPlacement, OPENING_PRESETS};
    use crate::shared::EditorOptions;
    use glam::Vec2;

    fn state_with_wall() -> (EditorState, u32) {
        let mut state = EditorState::new(Stage::new("stage-1"), EditorOptions::default());
        let poles = vec![Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)];
        let wall = place_wall(&mut state, poles, WallPlacement::default())
            .expect("gültig")
            .applied()
            .expect("angewendet");
        (state, wall)
    }

    #[test]
    fn tuer_aus_vorlage_platzieren() {
        let (mut state, wall) = state_with_wall();
        let placement = OPENING_PRESETS[0].placement(wall, 0, 1);
        let index = place_opening(&mut state, placement).expect("gültig");
        let opening = &state.stage.openings[&index];
        assert_eq!(opening.opening_type, "Door");
        assert_eq!(opening.state, OpeningState::Closed);
        assert!(index > wall);
    }

    #[test]
    fn ungueltige_spanne_verbraucht_keinen_index() {
        let (mut state, wall) = state_with_wall();
        let next = state.allocator.peek().ok();
        let placement = OPENING_PRESETS[0].placement(wall, 2, 1);
        assert!(place_opening(&mut state, placement).is_err());
        let placement = OPENING_PRESETS[0].placement(wall, 1, 4);
        assert!(place_opening(&mut state, placement).is_err());
        assert_eq!(state.allocator.peek().ok(), next);
        assert!(state.stage.openings.is_empty());
    }

    #[test]
    fn update_wird_gegen_wand_geprueft() {
        let (mut state, wall) = state_with_wall();
        let index = place_opening(&mut state, OPENING_PRESETS[0].placement(wall, 0, 1))
            .expect("gültig");
        let bad = OpeningUpdate {
            end_pole_index: Some(7),
            ..OpeningUpdate::default()
        };
        assert!(update_opening(&mut state, index, bad).is_err());
        let open = OpeningUpdate {
            state: Some(OpeningState::Open),
            ..OpeningUpdate::default()
        };
        assert!(update_opening(&mut state, index, open).expect("gültig"));
        assert_eq!(state.stage.openings[&index].state, OpeningState::Open);
        assert!(remove_opening(&mut state, index));
        assert!(!remove_opening(&mut state, index));
    }
}
