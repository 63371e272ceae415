//! Use-Cases: Wände platzieren, bearbeiten, löschen und Vertex-Bearbeitung.

use glam::Vec2;

use super::ensure_color;
use crate::app::mutation::WallUpdate;
use crate::app::{EditOutcome, EditorState, PendingAction, VertexEditSession};
use crate::core::{Pole, PoleMatch, SegmentState, SegmentType, Stage, Wall, WallPlacement};

/// Platziert eine neue Wand aus den gegebenen Pole-Positionen.
///
/// Läuft eine Vertex-Bearbeitung mit ungesicherten Änderungen, wird die Aktion
/// vorgemerkt und `ConfirmationRequired` geliefert.
pub fn place_wall(
    state: &mut EditorState,
    poles: Vec<Vec2>,
    placement: WallPlacement,
) -> anyhow::Result<EditOutcome<u32>> {
    if poles.len() < 2 {
        anyhow::bail!("Eine Wand braucht mindestens 2 Poles ({} angegeben)", poles.len());
    }
    if placement.default_height < 0.0 || !placement.default_height.is_finite() {
        anyhow::bail!("Ungültige Wandhöhe: {}", placement.default_height);
    }
    ensure_color(placement.color.as_deref())?;

    if state.has_unsaved_vertex_edit() {
        log::info!("Wand platzieren: ungesicherte Vertex-Änderungen, Bestätigung nötig");
        state.pending = Some(PendingAction::PlaceWall { poles, placement });
        return Ok(EditOutcome::ConfirmationRequired);
    }
    let index = state.allocator.allocate()?;
    state.session = None;

    let snap = state.options.wall_snap;
    let poles: Vec<Pole> = poles
        .into_iter()
        .map(|p| Pole::at(state.snap_point(p, snap), placement.default_height))
        .collect();

    let wall = Wall {
        index,
        name: placement
            .name
            .unwrap_or_else(|| format!("Wall {index}")),
        poles,
        visibility: placement.visibility,
        is_closed: placement.is_closed,
        material: placement.material,
        color: placement.color,
        segments: Vec::new(),
    };
    log::info!(
        "Wand {} platziert ({} Poles, {:?}{})",
        index,
        wall.poles.len(),
        wall.visibility,
        if wall.is_closed { ", geschlossen" } else { "" }
    );
    state.mutate_stage(|stage| {
        stage.walls.insert(index, wall);
    });
    Ok(EditOutcome::Applied(index))
}

/// Löscht eine Wand samt ihrer Öffnungen.
pub fn delete_wall(state: &mut EditorState, index: u32) -> EditOutcome<bool> {
    if state.has_unsaved_vertex_edit() {
        log::info!("Wand {index} löschen: ungesicherte Vertex-Änderungen, Bestätigung nötig");
        state.pending = Some(PendingAction::DeleteWall { index });
        return EditOutcome::ConfirmationRequired;
    }
    if !state.stage.walls.contains_key(&index) {
        log::warn!("Wand {index} existiert nicht, nichts gelöscht");
        return EditOutcome::Applied(false);
    }
    if state.session.as_ref().is_some_and(|s| s.wall_index == index) {
        state.session = None;
    }

    let removed_openings = state.mutate_stage(|stage| {
        stage.walls.shift_remove(&index);
        let before = stage.openings.len();
        stage.openings.retain(|_, o| o.wall_index != index);
        before - stage.openings.len()
    });
    log::info!("Wand {index} gelöscht ({removed_openings} Öffnungen entfernt)");
    EditOutcome::Applied(true)
}

/// Wendet ein Partial-Update auf eine Wand an.
pub fn update_wall(state: &mut EditorState, index: u32, update: WallUpdate) -> anyhow::Result<bool> {
    if let Some(Some(color)) = &update.color {
        ensure_color(Some(color))?;
    }
    if update.poles.as_ref().is_some_and(|poles| poles.len() < 2) {
        anyhow::bail!("Wand {index}: mindestens 2 Poles erforderlich");
    }
    if !state.stage.walls.contains_key(&index) {
        log::warn!("Wand {index} existiert nicht, Update ignoriert");
        return Ok(false);
    }

    state.mutate_stage(|stage| {
        if let Some(wall) = stage.walls.get_mut(&index) {
            update.apply_to(wall);
            wall.normalize_segments();
        }
        drop_invalid_openings(stage, index);
    });
    log::info!("Wand {index} aktualisiert");
    Ok(true)
}

/// Setzt den Typ einer Wandspanne; der Zustand wird normalisiert.
pub fn set_segment_type(
    state: &mut EditorState,
    wall_index: u32,
    span: usize,
    segment_type: SegmentType,
) -> bool {
    let applied = state.mutate_stage(|stage| {
        stage
            .walls
            .get_mut(&wall_index)
            .is_some_and(|wall| wall.set_segment_type(span, segment_type))
    });
    if applied {
        log::info!("Wand {wall_index}, Spanne {span}: Typ {}", segment_type.label());
    } else {
        log::warn!("Wand {wall_index}, Spanne {span} existiert nicht");
    }
    applied
}

/// Setzt den Zustand einer Wandspanne (ungültige Zustände fallen auf den Standard).
pub fn set_segment_state(
    state: &mut EditorState,
    wall_index: u32,
    span: usize,
    segment_state: SegmentState,
) -> bool {
    let applied = state.mutate_stage(|stage| {
        stage
            .walls
            .get_mut(&wall_index)
            .is_some_and(|wall| wall.set_segment_state(span, segment_state))
    });
    if !applied {
        log::warn!("Wand {wall_index}, Spanne {span} existiert nicht");
    }
    applied
}

/// Startet die Vertex-Bearbeitung einer Wand.
pub fn begin_vertex_edit(state: &mut EditorState, wall_index: u32) -> EditOutcome<bool> {
    if state
        .session
        .as_ref()
        .is_some_and(|s| s.wall_index == wall_index)
    {
        return EditOutcome::Applied(true);
    }
    if state.has_unsaved_vertex_edit() {
        log::info!("Vertex-Bearbeitung Wand {wall_index}: ungesicherte Änderungen, Bestätigung nötig");
        state.pending = Some(PendingAction::BeginVertexEdit { wall_index });
        return EditOutcome::ConfirmationRequired;
    }
    let Some(wall) = state.stage.walls.get(&wall_index) else {
        log::warn!("Wand {wall_index} existiert nicht, keine Vertex-Bearbeitung");
        return EditOutcome::Applied(false);
    };
    state.session = Some(VertexEditSession::begin(wall));
    log::info!("Vertex-Bearbeitung von Wand {wall_index} gestartet");
    EditOutcome::Applied(true)
}

/// Verschiebt einen Pole im Entwurf (mit Wand-Snapping).
pub fn move_pole(state: &mut EditorState, pole_index: usize, position: Vec2) -> bool {
    let snapped = state.snap_point(position, state.options.wall_snap);
    let Some(session) = state.session.as_mut() else {
        log::warn!("Pole verschieben: keine Vertex-Bearbeitung aktiv");
        return false;
    };
    session.move_pole(pole_index, snapped)
}

/// Fügt einen Pole in den Entwurf ein.
pub fn insert_pole(state: &mut EditorState, at: usize, position: Vec2) -> bool {
    let snapped = state.snap_point(position, state.options.wall_snap);
    let height = state.options.wall_default_height;
    let Some(session) = state.session.as_mut() else {
        log::warn!("Pole einfügen: keine Vertex-Bearbeitung aktiv");
        return false;
    };
    if at > session.draft().poles.len() {
        log::warn!("Pole einfügen: Position {at} außerhalb der Wand");
        return false;
    }
    session.insert_pole(at, snapped, height);
    true
}

/// Entfernt einen Pole aus dem Entwurf (mindestens zwei bleiben).
pub fn remove_pole(state: &mut EditorState, pole_index: usize) -> bool {
    let Some(session) = state.session.as_mut() else {
        log::warn!("Pole entfernen: keine Vertex-Bearbeitung aktiv");
        return false;
    };
    session.remove_pole(pole_index).is_some()
}

/// Überträgt den Entwurf in die Stage und beendet die Session.
///
/// Öffnungen, deren Pole-Indizes nicht mehr passen, werden entfernt.
pub fn commit_vertex_edit(state: &mut EditorState) -> bool {
    let Some(session) = state.session.take() else {
        log::warn!("Keine Vertex-Bearbeitung zum Übernehmen");
        return false;
    };
    if !session.has_changes() {
        return true;
    }
    let wall_index = session.wall_index;
    let draft = session.into_draft();
    let committed = state.mutate_stage(|stage| {
        let Some(wall) = stage.walls.get_mut(&wall_index) else {
            return false;
        };
        wall.poles = draft.poles;
        wall.segments = draft.segments;
        wall.normalize_segments();
        drop_invalid_openings(stage, wall_index);
        true
    });
    if committed {
        log::info!("Vertex-Bearbeitung von Wand {wall_index} übernommen");
    } else {
        log::warn!("Wand {wall_index} existiert nicht mehr, Entwurf verworfen");
    }
    committed
}

/// Verwirft den Entwurf; die Stage bleibt unverändert.
pub fn discard_vertex_edit(state: &mut EditorState) -> bool {
    match state.session.take() {
        Some(session) => {
            log::info!("Vertex-Bearbeitung von Wand {} verworfen", session.wall_index);
            true
        }
        None => false,
    }
}

/// Bestätigt die vorgemerkte Aktion: Entwurf verwerfen, Aktion ausführen.
///
/// Liefert den Index der betroffenen Wand, falls die Aktion wirksam war.
pub fn confirm_pending(state: &mut EditorState) -> anyhow::Result<Option<u32>> {
    let Some(action) = state.pending.take() else {
        return Ok(None);
    };
    discard_vertex_edit(state);
    let result = match action {
        PendingAction::PlaceWall { poles, placement } => {
            place_wall(state, poles, placement)?.applied()
        }
        PendingAction::DeleteWall { index } => delete_wall(state, index)
            .applied()
            .and_then(|deleted| deleted.then_some(index)),
        PendingAction::BeginVertexEdit { wall_index } => begin_vertex_edit(state, wall_index)
            .applied()
            .and_then(|started| started.then_some(wall_index)),
    };
    Ok(result)
}

/// Verwirft die vorgemerkte Aktion; die Vertex-Bearbeitung läuft weiter.
pub fn cancel_pending(state: &mut EditorState) -> bool {
    state.pending.take().is_some()
}

/// Sucht den nächsten Pole im Pick-Radius.
pub fn pick_pole(state: &mut EditorState, position: Vec2) -> Option<PoleMatch> {
    let radius = state.options.pole_pick_radius_px;
    state.pole_index().pick(position, radius)
}

fn drop_invalid_openings(stage: &mut Stage, wall_index: u32) {
    let Some(wall) = stage.walls.get(&wall_index) else {
        return;
    };
    let before = stage.openings.len();
    stage
        .openings
        .retain(|_, o| o.wall_index != wall_index || o.validate_against(wall).is_ok());
    let dropped = before - stage.openings.len();
    if dropped > 0 {
        log::warn!("Wand {wall_index}: {dropped} Öffnungen passen nicht mehr und wurden entfernt");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::mutation::StageMutation;
    use crate::core::{Opening, OpeningOpacity, OpeningState, OpeningVisibility};
    use crate::shared::EditorOptions;

    fn state() -> EditorState {
        EditorState::new(Stage::new("stage-1"), EditorOptions::default())
    }

    fn corridor(state: &mut EditorState) -> u32 {
        let poles = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(200.0, 0.0),
        ];
        place_wall(state, poles, WallPlacement::default())
            .expect("gültige Wand")
            .applied()
            .expect("keine Bestätigung nötig")
    }

    fn door(index: u32, wall_index: u32, start: usize, end: usize) -> Opening {
        Opening {
            index,
            name: "Door".into(),
            opening_type: "Door".into(),
            width: 5.0,
            height: 8.0,
            wall_index,
            start_pole_index: start,
            end_pole_index: end,
            visibility: OpeningVisibility::Visible,
            state: OpeningState::Closed,
            opacity: OpeningOpacity::Opaque,
            material: None,
            color: None,
        }
    }

    #[test]
    fn wand_platzieren_vergibt_index_und_name() {
        let mut state = state();
        let index = corridor(&mut state);
        let wall = &state.stage.walls[&index];
        assert_eq!(wall.name, format!("Wall {index}"));
        assert_eq!(wall.poles.len(), 3);
        assert_eq!(wall.poles[0].h, 10.0);
        assert_eq!(state.outbox.queued_len(), 1);
    }

    #[test]
    fn wand_mit_einem_pole_wird_abgelehnt() {
        let mut state = state();
        let result = place_wall(&mut state, vec![Vec2::ZERO], WallPlacement::default());
        assert!(result.is_err());
        assert!(state.stage.walls.is_empty());
    }

    #[test]
    fn wand_loeschen_entfernt_oeffnungen() {
        let mut state = state();
        let index = corridor(&mut state);
        state.mutate_stage(|stage| {
            stage.openings.insert(50, door(50, index, 0, 1));
        });
        assert_eq!(delete_wall(&mut state, index), EditOutcome::Applied(true));
        assert!(state.stage.walls.is_empty());
        assert!(state.stage.openings.is_empty());
    }

    #[test]
    fn unbekannte_wand_loeschen_ist_wirkungslos() {
        let mut state = state();
        assert_eq!(delete_wall(&mut state, 99), EditOutcome::Applied(false));
        assert!(!state.can_undo());
    }

    #[test]
    fn abschnittstyp_normalisiert_zustand() {
        let mut state = state();
        let index = corridor(&mut state);
        assert!(set_segment_state(&mut state, index, 1, SegmentState::Locked));
        assert!(set_segment_type(&mut state, index, 1, SegmentType::Door));
        assert!(set_segment_state(&mut state, index, 1, SegmentState::Locked));
        assert!(set_segment_type(&mut state, index, 1, SegmentType::Passage));
        let segment = state.stage.walls[&index].segment_at(1);
        assert_eq!(segment.segment_type, SegmentType::Passage);
        assert_eq!(segment.state, SegmentType::Passage.default_state());
        assert!(!set_segment_type(&mut state, index, 5, SegmentType::Door));
    }

    #[test]
    fn vertex_bearbeitung_aendert_stage_erst_beim_uebernehmen() {
        let mut state = state();
        let index = corridor(&mut state);
        assert_eq!(begin_vertex_edit(&mut state, index), EditOutcome::Applied(true));
        assert!(move_pole(&mut state, 1, Vec2::new(100.0, 50.0)));
        assert_eq!(state.stage.walls[&index].poles[1].position(), Vec2::new(100.0, 0.0));
        assert!(state.has_unsaved_vertex_edit());

        assert!(commit_vertex_edit(&mut state));
        assert!(state.session.is_none());
        assert_eq!(state.stage.walls[&index].poles[1].position(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn konflikt_verlangt_bestaetigung() {
        let mut state = state();
        let index = corridor(&mut state);
        begin_vertex_edit(&mut state, index);
        move_pole(&mut state, 0, Vec2::new(0.0, 50.0));

        let outcome = delete_wall(&mut state, index);
        assert!(outcome.needs_confirmation());
        assert!(state.stage.walls.contains_key(&index));
        assert_eq!(state.pending, Some(PendingAction::DeleteWall { index }));

        assert!(cancel_pending(&mut state));
        assert!(state.session.is_some());
        assert!(state.stage.walls.contains_key(&index));

        delete_wall(&mut state, index);
        assert_eq!(confirm_pending(&mut state).expect("ok"), Some(index));
        assert!(state.session.is_none());
        assert!(state.stage.walls.is_empty());
    }

    #[test]
    fn bestaetigtes_platzieren_verwirft_entwurf() {
        let mut state = state();
        let index = corridor(&mut state);
        begin_vertex_edit(&mut state, index);
        remove_pole(&mut state, 2);

        let poles = vec![Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0)];
        let outcome = place_wall(&mut state, poles, WallPlacement::default()).expect("ok");
        assert!(outcome.needs_confirmation());
        assert_eq!(state.stage.walls.len(), 1);

        let created = confirm_pending(&mut state).expect("ok").expect("neue Wand");
        assert_ne!(created, index);
        assert_eq!(state.stage.walls[&index].poles.len(), 3);
        assert_eq!(state.stage.walls.len(), 2);
    }

    #[test]
    fn ohne_aenderungen_keine_bestaetigung() {
        let mut state = state();
        let first = corridor(&mut state);
        let second = corridor(&mut state);
        begin_vertex_edit(&mut state, first);
        assert_eq!(begin_vertex_edit(&mut state, second), EditOutcome::Applied(true));
        assert_eq!(state.session.as_ref().map(|s| s.wall_index), Some(second));
    }

    #[test]
    fn uebernehmen_entfernt_ungueltige_oeffnungen() {
        let mut state = state();
        let index = corridor(&mut state);
        state.mutate_stage(|stage| {
            stage.openings.insert(50, door(50, index, 1, 3));
            stage.openings.insert(51, door(51, index, 0, 1));
        });
        begin_vertex_edit(&mut state, index);
        assert!(remove_pole(&mut state, 2));
        commit_vertex_edit(&mut state);
        assert!(!state.stage.openings.contains_key(&50));
        assert!(state.stage.openings.contains_key(&51));
    }

    #[test]
    fn verwerfen_laesst_stage_unveraendert() {
        let mut state = state();
        let index = corridor(&mut state);
        let before = state.stage.clone();
        begin_vertex_edit(&mut state, index);
        insert_pole(&mut state, 1, Vec2::new(50.0, 50.0));
        assert!(discard_vertex_edit(&mut state));
        assert_eq!(state.stage, before);
    }

    #[test]
    fn wand_update_erzeugt_partial_update() {
        let mut state = state();
        let index = corridor(&mut state);
        state.outbox.drain();
        let update = WallUpdate {
            name: Some("North".into()),
            ..WallUpdate::default()
        };
        assert!(update_wall(&mut state, index, update).expect("ok"));
        let drained = state.outbox.drain();
        assert_eq!(drained.len(), 1);
        let StageMutation::UpdateWall { update, .. } = &drained[0].mutation else {
            panic!("UpdateWall erwartet");
        };
        assert_eq!(update.name.as_deref(), Some("North"));
        assert!(update.poles.is_none());
    }

    #[test]
    fn pole_picken() {
        let mut state = state();
        let index = corridor(&mut state);
        let hit = pick_pole(&mut state, Vec2::new(103.0, 4.0)).expect("Treffer");
        assert_eq!(hit.pole.wall_index, index);
        assert_eq!(hit.pole.pole_index, 1);
        assert!(pick_pole(&mut state, Vec2::new(150.0, 60.0)).is_none());
    }
}
