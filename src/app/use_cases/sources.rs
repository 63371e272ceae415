//! Use-Cases: Licht- und Geräuschquellen.

use glam::Vec2;

use super::ensure_override_color;
use crate::app::mutation::{LightSourceUpdate, SoundSourceUpdate};
use crate::app::EditorState;
use crate::core::light::range_cells_from_feet;
use crate::core::{LightPlacement, LightSource, SoundPlacement, SoundSource};

fn ensure_range(kind: &str, cells: f32) -> anyhow::Result<()> {
    if !cells.is_finite() || cells < 0.0 {
        anyhow::bail!("{kind}: ungültige Reichweite {cells}");
    }
    Ok(())
}

// ── Licht ──────────────────────────────────────────────────────────

/// Platziert eine Lichtquelle (Asset-Snapping).
pub fn place_light(
    state: &mut EditorState,
    position: Vec2,
    placement: LightPlacement,
) -> anyhow::Result<u32> {
    ensure_range("Licht", placement.range)?;
    ensure_override_color(placement.color.as_deref())?;

    let position = state.snap_point(position, state.options.asset_snap);
    let index = state.allocator.allocate()?;
    let mut light = LightSource {
        index,
        name: placement
            .name
            .unwrap_or_else(|| format!("Light {index}")),
        light_type: placement.light_type,
        position,
        range: placement.range,
        is_on: placement.is_on,
        direction: placement.direction,
        arc: placement.arc,
        color: placement.color,
    };
    light.normalize_direction();
    log::info!(
        "Licht {} platziert ({}, {:.1} ft) bei ({:.1}, {:.1})",
        index,
        light.mode_label(),
        light.effective_range_feet(state.stage.grid_scale),
        position.x,
        position.y
    );
    state.mutate_stage(|stage| {
        stage.lights.insert(index, light);
    });
    Ok(index)
}

/// Wendet ein Partial-Update an; halbe Richtungsangaben werden entfernt.
pub fn update_light(
    state: &mut EditorState,
    index: u32,
    update: LightSourceUpdate,
) -> anyhow::Result<bool> {
    if let Some(Some(color)) = &update.color {
        ensure_override_color(Some(color))?;
    }
    let Some(current) = state.stage.lights.get(&index) else {
        log::warn!("Licht {index} existiert nicht, Update ignoriert");
        return Ok(false);
    };
    let mut updated = current.clone();
    update.apply_to(&mut updated);
    ensure_range("Licht", updated.range)?;
    updated.normalize_direction();

    state.mutate_stage(|stage| {
        stage.lights.insert(index, updated);
    });
    log::info!("Licht {index} aktualisiert");
    Ok(true)
}

/// Setzt die Reichweite aus einer Eingabe in Fuß.
pub fn set_light_range_feet(state: &mut EditorState, index: u32, feet: f32) -> anyhow::Result<bool> {
    let Some(range) = range_cells_from_feet(feet, state.stage.grid_scale) else {
        anyhow::bail!("Licht {index}: ungültige Reichweite {feet} ft");
    };
    update_light(
        state,
        index,
        LightSourceUpdate {
            range: Some(range),
            ..LightSourceUpdate::default()
        },
    )
}

pub fn remove_light(state: &mut EditorState, index: u32) -> bool {
    let removed = state.mutate_stage(|stage| stage.lights.shift_remove(&index).is_some());
    if removed {
        log::info!("Licht {index} entfernt");
    } else {
        log::warn!("Licht {index} existiert nicht");
    }
    removed
}

// ── Geräusche ──────────────────────────────────────────────────────

/// Platziert eine Geräuschquelle (Asset-Snapping).
pub fn place_sound(
    state: &mut EditorState,
    position: Vec2,
    placement: SoundPlacement,
) -> anyhow::Result<u32> {
    ensure_range("Geräusch", placement.radius)?;

    let position = state.snap_point(position, state.options.asset_snap);
    let index = state.allocator.allocate()?;
    let sound = SoundSource {
        index,
        name: placement
            .name
            .unwrap_or_else(|| format!("Sound {index}")),
        resource_id: placement.resource_id,
        position,
        radius: placement.radius,
        is_playing: placement.is_playing,
    };
    log::info!(
        "Geräusch {} platziert ({:.1} ft) bei ({:.1}, {:.1})",
        index,
        sound.effective_radius_feet(state.stage.grid_scale),
        position.x,
        position.y
    );
    state.mutate_stage(|stage| {
        stage.sounds.insert(index, sound);
    });
    Ok(index)
}

pub fn update_sound(
    state: &mut EditorState,
    index: u32,
    update: SoundSourceUpdate,
) -> anyhow::Result<bool> {
    let Some(current) = state.stage.sounds.get(&index) else {
        log::warn!("Geräusch {index} existiert nicht, Update ignoriert");
        return Ok(false);
    };
    let mut updated = current.clone();
    update.apply_to(&mut updated);
    ensure_range("Geräusch", updated.radius)?;

    state.mutate_stage(|stage| {
        stage.sounds.insert(index, updated);
    });
    log::info!("Geräusch {index} aktualisiert");
    Ok(true)
}

/// Setzt den Radius aus einer Eingabe in Fuß.
pub fn set_sound_radius_feet(
    state: &mut EditorState,
    index: u32,
    feet: f32,
) -> anyhow::Result<bool> {
    let Some(radius) = range_cells_from_feet(feet, state.stage.grid_scale) else {
        anyhow::bail!("Geräusch {index}: ungültiger Radius {feet} ft");
    };
    update_sound(
        state,
        index,
        SoundSourceUpdate {
            radius: Some(radius),
            ..SoundSourceUpdate::default()
        },
    )
}

pub fn remove_sound(state: &mut EditorState, index: u32) -> bool {
    let removed = state.mutate_stage(|stage| stage.sounds.shift_remove(&index).is_some());
    if removed {
        log::info!("Geräusch {index} entfernt");
    } else {
        log::warn!("Geräusch {index} existiert nicht");
    }
    removed
}
