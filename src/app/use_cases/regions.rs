//! Use-Cases: Regionen (Elevation, Terrain, Illumination), Verschmelzen und Füllen.

use glam::Vec2;

use super::ensure_color;
use crate::app::mutation::RegionUpdate;
use crate::app::EditorState;
use crate::core::{
    default_value_for_type, find_mergeable_regions, is_valid_value, merge_polygons,
    stage_rectangle, suggest_region_name, trace_region_boundary, Region, RegionBoundary,
    RegionPlacement, RegionType,
};

/// Platziert eine neue Region aus mindestens drei Eckpunkten.
pub fn place_region(
    state: &mut EditorState,
    vertices: Vec<Vec2>,
    placement: RegionPlacement,
) -> anyhow::Result<u32> {
    let vertices = snapped_outline(state, vertices)?;
    let value = checked_value(&placement)?;
    insert_region(state, vertices, placement, value)
}

/// Platziert eine Region und verschmilzt sie mit gleichartigen Nachbarn.
///
/// Gleichartig heißt gleicher Typ und gleicher Wert; Nachbar heißt gemeinsame
/// Kante oder flächige Überlappung. Die Nachbar-Region mit dem kleinsten Index
/// erhält den vereinigten Umriss und behält Name und Farbe, die übrigen werden
/// gelöscht. Ohne Nachbarn entsteht eine neue Region. In beiden Fällen genau
/// ein Undo-Schritt.
pub fn merge_region(
    state: &mut EditorState,
    vertices: Vec<Vec2>,
    placement: RegionPlacement,
) -> anyhow::Result<u32> {
    let vertices = snapped_outline(state, vertices)?;
    let value = checked_value(&placement)?;

    let partners: Vec<(u32, Vec<Vec2>)> = find_mergeable_regions(
        state.stage.regions.values(),
        &vertices,
        placement.region_type,
        value,
    )
    .into_iter()
    .map(|r| (r.index, r.vertices.clone()))
    .collect();
    let Some(&(target, _)) = partners.first() else {
        return insert_region(state, vertices, placement, value);
    };

    let mut outlines = vec![vertices];
    outlines.extend(partners.iter().map(|(_, outline)| outline.clone()));
    let merged = merge_polygons(&outlines);
    if merged.len() < 3 {
        anyhow::bail!("Vereinigung mit Region {target} ist entartet");
    }
    let absorbed: Vec<u32> = partners.iter().skip(1).map(|(index, _)| *index).collect();
    let corners = merged.len();

    state.mutate_stage(|stage| {
        if let Some(region) = stage.regions.get_mut(&target) {
            region.vertices = merged;
        }
        for index in &absorbed {
            stage.regions.shift_remove(index);
        }
    });
    log::info!(
        "Region {target} verschmolzen: {} Partner, {} aufgelöst, {corners} Eckpunkte",
        partners.len(),
        absorbed.len()
    );
    Ok(target)
}

/// Legt eine Region über die von Wänden begrenzte Fläche um `seed`.
///
/// Ohne blockierende Wände deckt die Region die ganze Stage ab; läuft die
/// Füllung aus, ebenfalls. Liegt die Saat außerhalb, entsteht keine Region.
/// Der Umriss folgt dem Füllraster und wird nicht gesnappt.
pub fn fill_region(
    state: &mut EditorState,
    seed: Vec2,
    stage_size: Vec2,
    placement: RegionPlacement,
) -> anyhow::Result<Option<u32>> {
    if !(stage_size.is_finite() && stage_size.x > 0.0 && stage_size.y > 0.0) {
        anyhow::bail!(
            "Ungültige Stage-Größe für Regionsfüllung: {} × {}",
            stage_size.x,
            stage_size.y
        );
    }
    let value = checked_value(&placement)?;

    let barriers = state.stage.barriers();
    let cell_size = state.options.region_fill_cell_size;
    let outline = match trace_region_boundary(seed, &barriers, stage_size, cell_size) {
        RegionBoundary::FullStage => stage_rectangle(stage_size),
        RegionBoundary::Traced(traced) => {
            if !traced.holes.is_empty() {
                log::warn!(
                    "Regionsfüllung: {} umschlossene Inseln werden nicht ausgespart",
                    traced.holes.len()
                );
            }
            log::info!(
                "Regionsfüllung begrenzt durch Wände {:?}{}",
                traced.bounding_walls,
                if traced.reached_stage_edge { " (bis Stage-Rand)" } else { "" }
            );
            traced.outline
        }
        RegionBoundary::NotFound => {
            log::warn!(
                "Regionsfüllung ab ({:.1}, {:.1}): keine Fläche gefunden",
                seed.x,
                seed.y
            );
            return Ok(None);
        }
    };
    insert_region(state, outline, placement, value).map(Some)
}

fn snapped_outline(state: &EditorState, vertices: Vec<Vec2>) -> anyhow::Result<Vec<Vec2>> {
    if vertices.len() < 3 {
        anyhow::bail!("Eine Region braucht mindestens 3 Eckpunkte ({} angegeben)", vertices.len());
    }
    let snap = state.options.wall_snap;
    Ok(vertices
        .into_iter()
        .map(|v| state.snap_point(v, snap))
        .collect())
}

/// Effektiver Wert einer Platzierung; prüft auch die Farbe.
fn checked_value(placement: &RegionPlacement) -> anyhow::Result<i32> {
    let value = placement
        .value
        .unwrap_or_else(|| default_value_for_type(placement.region_type));
    if !is_valid_value(placement.region_type, value) {
        anyhow::bail!(
            "Wert {value} ist für {} nicht zulässig",
            placement.region_type.label()
        );
    }
    ensure_color(placement.color.as_deref())?;
    Ok(value)
}

fn insert_region(
    state: &mut EditorState,
    vertices: Vec<Vec2>,
    placement: RegionPlacement,
    value: i32,
) -> anyhow::Result<u32> {
    let name = placement.name.unwrap_or_else(|| {
        suggest_region_name(state.stage.regions.values().map(|r| r.name.as_str()))
    });

    let index = state.allocator.allocate()?;
    let region = Region {
        id: None,
        index,
        name,
        region_type: placement.region_type,
        vertices,
        value,
        color: placement.color,
    };
    log::info!(
        "Region {} '{}' platziert ({}, Wert {})",
        index,
        region.name,
        region.region_type.label(),
        region.value
    );
    state.mutate_stage(|stage| {
        stage.regions.insert(index, region);
    });
    Ok(index)
}

/// Wendet ein Partial-Update an.
///
/// Ein Typwechsel ohne gleichzeitigen Wert setzt den Wert auf den Standard des neuen Typs.
pub fn update_region(
    state: &mut EditorState,
    index: u32,
    update: RegionUpdate,
) -> anyhow::Result<bool> {
    if let Some(Some(color)) = &update.color {
        ensure_color(Some(color))?;
    }
    let Some(current) = state.stage.regions.get(&index) else {
        log::warn!("Region {index} existiert nicht, Update ignoriert");
        return Ok(false);
    };
    let mut updated = current.clone();
    if let Some(region_type) = update.region_type {
        if region_type != updated.region_type && update.value.is_none() {
            updated.set_type(region_type);
        }
    }
    update.apply_to(&mut updated);
    if updated.vertices.len() < 3 {
        anyhow::bail!("Region {index}: mindestens 3 Eckpunkte erforderlich");
    }
    if !is_valid_value(updated.region_type, updated.value) {
        anyhow::bail!(
            "Region {index}: Wert {} ist für {} nicht zulässig",
            updated.value,
            updated.region_type.label()
        );
    }

    state.mutate_stage(|stage| {
        stage.regions.insert(index, updated);
    });
    log::info!("Region {index} aktualisiert");
    Ok(true)
}

/// Wechselt den Typ einer Region; der Wert fällt auf den Standard zurück.
pub fn set_region_type(state: &mut EditorState, index: u32, region_type: RegionType) -> bool {
    let applied = state.mutate_stage(|stage| match stage.regions.get_mut(&index) {
        Some(region) => {
            if region.region_type != region_type {
                region.set_type(region_type);
            }
            true
        }
        None => false,
    });
    if applied {
        log::info!("Region {index}: Typ {}", region_type.label());
    } else {
        log::warn!("Region {index} existiert nicht");
    }
    applied
}

/// Setzt den Wert einer Region; unzulässige Werte werden abgelehnt.
pub fn set_region_value(state: &mut EditorState, index: u32, value: i32) -> anyhow::Result<bool> {
    let Some(region) = state.stage.regions.get(&index) else {
        log::warn!("Region {index} existiert nicht");
        return Ok(false);
    };
    if !is_valid_value(region.region_type, value) {
        anyhow::bail!(
            "Region {index}: Wert {value} ist für {} nicht zulässig",
            region.region_type.label()
        );
    }
    state.mutate_stage(|stage| {
        if let Some(region) = stage.regions.get_mut(&index) {
            region.value = value;
        }
    });
    Ok(true)
}

pub fn delete_region(state: &mut EditorState, index: u32) -> bool {
    let removed = state.mutate_stage(|stage| stage.regions.shift_remove(&index).is_some());
    if removed {
        log::info!("Region {index} gelöscht");
    } else {
        log::warn!("Region {index} existiert nicht");
    }
    removed
}
