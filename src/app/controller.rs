//! Stage-Editor: zentrale Command-Schnittstelle über dem Editor-Zustand.

use glam::Vec2;

use super::mutation::{
    EntityRef, LightSourceUpdate, OpeningUpdate, PendingMutation, RegionUpdate,
    SoundSourceUpdate, WallUpdate,
};
use super::use_cases;
use super::{CommandOutcome, EditOutcome, EditorCommand, EditorState, PendingAction};
use crate::core::{
    FogMask, FogMode, FogTool, GridConfig, LightPlacement, LightSource, Opening,
    OpeningPlacement, PoleMatch, Region, RegionPlacement, RegionType, SegmentState, SegmentType,
    SnapModifiers, SoundPlacement, SoundSource, Stage, Wall, WallPlacement,
};
use crate::shared::EditorOptions;

/// Orchestriert Editor-Operationen auf dem Zustand und reiht die
/// resultierenden Partial-Updates in die Outbox ein.
pub struct StageEditor {
    state: EditorState,
}

impl StageEditor {
    /// Erstellt einen Editor für eine geladene Stage.
    pub fn new(stage: Stage, options: EditorOptions) -> Self {
        Self {
            state: EditorState::new(stage, options),
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.state.stage
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    /// Führt einen Command aus und protokolliert ihn samt Ergebnis.
    pub fn handle_command(&mut self, command: EditorCommand) -> anyhow::Result<CommandOutcome> {
        let logged = command.clone();
        let result = self.execute(command);
        self.state
            .command_log
            .record(logged, result.as_ref().ok().copied());
        result
    }

    fn execute(&mut self, command: EditorCommand) -> anyhow::Result<CommandOutcome> {
        let outcome = match command {
            // === Raster ===
            EditorCommand::SetGridConfig { grid } => {
                self.set_grid_config(grid)?;
                CommandOutcome::Done
            }
            EditorCommand::SetGridScale { feet_per_cell } => {
                self.set_grid_scale(feet_per_cell)?;
                CommandOutcome::Done
            }
            EditorCommand::SetSnapModifiers { alt, ctrl } => {
                self.set_snap_modifiers(SnapModifiers { alt, ctrl });
                CommandOutcome::Done
            }

            // === Wände ===
            EditorCommand::PlaceWall { poles, placement } => {
                let placement = placement.unwrap_or_else(|| self.state.options.wall_placement());
                edit_outcome(self.place_wall(poles, placement)?, CommandOutcome::Created)
            }
            EditorCommand::DeleteWall { index } => {
                edit_outcome(self.delete_wall(index), CommandOutcome::from_flag)
            }
            EditorCommand::UpdateWall { index, update } => {
                CommandOutcome::from_flag(self.update_wall(index, update)?)
            }
            EditorCommand::SetSegmentType {
                wall_index,
                span,
                segment_type,
            } => CommandOutcome::from_flag(self.set_segment_type(wall_index, span, segment_type)),
            EditorCommand::SetSegmentState {
                wall_index,
                span,
                state,
            } => CommandOutcome::from_flag(self.set_segment_state(wall_index, span, state)),

            // === Vertex-Edit ===
            EditorCommand::BeginVertexEdit { wall_index } => {
                edit_outcome(self.begin_vertex_edit(wall_index), CommandOutcome::from_flag)
            }
            EditorCommand::MovePole {
                pole_index,
                position,
            } => CommandOutcome::from_flag(self.move_pole(pole_index, position)),
            EditorCommand::InsertPole { at, position } => {
                CommandOutcome::from_flag(self.insert_pole(at, position))
            }
            EditorCommand::RemovePole { pole_index } => {
                CommandOutcome::from_flag(self.remove_pole(pole_index))
            }
            EditorCommand::CommitVertexEdit => CommandOutcome::from_flag(self.commit_vertex_edit()),
            EditorCommand::DiscardVertexEdit => {
                CommandOutcome::from_flag(self.discard_vertex_edit())
            }
            EditorCommand::ConfirmPending => {
                let places_wall =
                    matches!(self.state.pending, Some(PendingAction::PlaceWall { .. }));
                match self.confirm_pending()? {
                    Some(index) if places_wall => CommandOutcome::Created(index),
                    Some(_) => CommandOutcome::Done,
                    None => CommandOutcome::Ignored,
                }
            }
            EditorCommand::CancelPending => CommandOutcome::from_flag(self.cancel_pending()),

            // === Öffnungen ===
            EditorCommand::PlaceOpening { placement } => {
                CommandOutcome::Created(self.place_opening(placement)?)
            }
            EditorCommand::UpdateOpening { index, update } => {
                CommandOutcome::from_flag(self.update_opening(index, update)?)
            }
            EditorCommand::RemoveOpening { index } => {
                CommandOutcome::from_flag(self.remove_opening(index))
            }

            // === Regionen ===
            EditorCommand::PlaceRegion {
                vertices,
                placement,
            } => CommandOutcome::Created(self.place_region(vertices, placement)?),
            EditorCommand::MergeRegion {
                vertices,
                placement,
            } => CommandOutcome::Created(self.merge_region(vertices, placement)?),
            EditorCommand::FillRegion {
                seed,
                stage_size,
                placement,
            } => match self.fill_region(seed, stage_size, placement)? {
                Some(index) => CommandOutcome::Created(index),
                None => CommandOutcome::Ignored,
            },
            EditorCommand::UpdateRegion { index, update } => {
                CommandOutcome::from_flag(self.update_region(index, update)?)
            }
            EditorCommand::SetRegionType { index, region_type } => {
                CommandOutcome::from_flag(self.set_region_type(index, region_type))
            }
            EditorCommand::SetRegionValue { index, value } => {
                CommandOutcome::from_flag(self.set_region_value(index, value)?)
            }
            EditorCommand::DeleteRegion { index } => {
                CommandOutcome::from_flag(self.delete_region(index))
            }

            // === Licht & Geräusche ===
            EditorCommand::PlaceLight {
                position,
                placement,
            } => CommandOutcome::Created(self.place_light(position, placement)?),
            EditorCommand::UpdateLight { index, update } => {
                CommandOutcome::from_flag(self.update_light(index, update)?)
            }
            EditorCommand::SetLightRangeFeet { index, feet } => {
                CommandOutcome::from_flag(self.set_light_range_feet(index, feet)?)
            }
            EditorCommand::RemoveLight { index } => {
                CommandOutcome::from_flag(self.remove_light(index))
            }
            EditorCommand::PlaceSound {
                position,
                placement,
            } => CommandOutcome::Created(self.place_sound(position, placement)?),
            EditorCommand::UpdateSound { index, update } => {
                CommandOutcome::from_flag(self.update_sound(index, update)?)
            }
            EditorCommand::SetSoundRadiusFeet { index, feet } => {
                CommandOutcome::from_flag(self.set_sound_radius_feet(index, feet)?)
            }
            EditorCommand::RemoveSound { index } => {
                CommandOutcome::from_flag(self.remove_sound(index))
            }

            // === Fog of War ===
            EditorCommand::SetFogMode { mode } => {
                self.set_fog_mode(mode);
                CommandOutcome::Done
            }
            EditorCommand::SetFogTool { tool } => {
                self.set_fog_tool(tool);
                CommandOutcome::Done
            }
            EditorCommand::ResizeFog { size } => {
                self.resize_fog(size)?;
                CommandOutcome::Done
            }
            EditorCommand::HideAll => {
                self.hide_all();
                CommandOutcome::Done
            }
            EditorCommand::RevealAll => {
                self.reveal_all();
                CommandOutcome::Done
            }
            EditorCommand::ApplyFogPolygon { polygon } => {
                CommandOutcome::CellsChanged(self.apply_fog_polygon(&polygon))
            }
            EditorCommand::BucketFillFog { seed } => {
                CommandOutcome::CellsChanged(self.bucket_fill_fog(seed))
            }

            // === History ===
            EditorCommand::Undo => CommandOutcome::from_flag(self.undo()),
            EditorCommand::Redo => CommandOutcome::from_flag(self.redo()),
        };
        Ok(outcome)
    }

    // ── Raster ─────────────────────────────────────────────────────

    pub fn set_grid_config(&mut self, grid: GridConfig) -> anyhow::Result<()> {
        use_cases::grid::set_grid_config(&mut self.state, grid)
    }

    pub fn set_grid_scale(&mut self, feet_per_cell: f32) -> anyhow::Result<()> {
        use_cases::grid::set_grid_scale(&mut self.state, feet_per_cell)
    }

    pub fn set_snap_modifiers(&mut self, modifiers: SnapModifiers) {
        use_cases::grid::set_snap_modifiers(&mut self.state, modifiers)
    }

    // ── Wände ──────────────────────────────────────────────────────

    pub fn place_wall(
        &mut self,
        poles: Vec<Vec2>,
        placement: WallPlacement,
    ) -> anyhow::Result<EditOutcome<u32>> {
        use_cases::walls::place_wall(&mut self.state, poles, placement)
    }

    pub fn delete_wall(&mut self, index: u32) -> EditOutcome<bool> {
        use_cases::walls::delete_wall(&mut self.state, index)
    }

    pub fn update_wall(&mut self, index: u32, update: WallUpdate) -> anyhow::Result<bool> {
        use_cases::walls::update_wall(&mut self.state, index, update)
    }

    pub fn set_segment_type(
        &mut self,
        wall_index: u32,
        span: usize,
        segment_type: SegmentType,
    ) -> bool {
        use_cases::walls::set_segment_type(&mut self.state, wall_index, span, segment_type)
    }

    pub fn set_segment_state(&mut self, wall_index: u32, span: usize, state: SegmentState) -> bool {
        use_cases::walls::set_segment_state(&mut self.state, wall_index, span, state)
    }

    pub fn begin_vertex_edit(&mut self, wall_index: u32) -> EditOutcome<bool> {
        use_cases::walls::begin_vertex_edit(&mut self.state, wall_index)
    }

    pub fn move_pole(&mut self, pole_index: usize, position: Vec2) -> bool {
        use_cases::walls::move_pole(&mut self.state, pole_index, position)
    }

    pub fn insert_pole(&mut self, at: usize, position: Vec2) -> bool {
        use_cases::walls::insert_pole(&mut self.state, at, position)
    }

    pub fn remove_pole(&mut self, pole_index: usize) -> bool {
        use_cases::walls::remove_pole(&mut self.state, pole_index)
    }

    pub fn commit_vertex_edit(&mut self) -> bool {
        use_cases::walls::commit_vertex_edit(&mut self.state)
    }

    pub fn discard_vertex_edit(&mut self) -> bool {
        use_cases::walls::discard_vertex_edit(&mut self.state)
    }

    pub fn confirm_pending(&mut self) -> anyhow::Result<Option<u32>> {
        use_cases::walls::confirm_pending(&mut self.state)
    }

    pub fn cancel_pending(&mut self) -> bool {
        use_cases::walls::cancel_pending(&mut self.state)
    }

    pub fn pick_pole(&mut self, position: Vec2) -> Option<PoleMatch> {
        use_cases::walls::pick_pole(&mut self.state, position)
    }

    // ── Öffnungen ──────────────────────────────────────────────────

    pub fn place_opening(&mut self, placement: OpeningPlacement) -> anyhow::Result<u32> {
        use_cases::openings::place_opening(&mut self.state, placement)
    }

    pub fn update_opening(&mut self, index: u32, update: OpeningUpdate) -> anyhow::Result<bool> {
        use_cases::openings::update_opening(&mut self.state, index, update)
    }

    pub fn remove_opening(&mut self, index: u32) -> bool {
        use_cases::openings::remove_opening(&mut self.state, index)
    }

    // ── Regionen ───────────────────────────────────────────────────

    pub fn place_region(
        &mut self,
        vertices: Vec<Vec2>,
        placement: RegionPlacement,
    ) -> anyhow::Result<u32> {
        use_cases::regions::place_region(&mut self.state, vertices, placement)
    }

    pub fn merge_region(
        &mut self,
        vertices: Vec<Vec2>,
        placement: RegionPlacement,
    ) -> anyhow::Result<u32> {
        use_cases::regions::merge_region(&mut self.state, vertices, placement)
    }

    pub fn fill_region(
        &mut self,
        seed: Vec2,
        stage_size: Vec2,
        placement: RegionPlacement,
    ) -> anyhow::Result<Option<u32>> {
        use_cases::regions::fill_region(&mut self.state, seed, stage_size, placement)
    }

    pub fn update_region(&mut self, index: u32, update: RegionUpdate) -> anyhow::Result<bool> {
        use_cases::regions::update_region(&mut self.state, index, update)
    }

    pub fn set_region_type(&mut self, index: u32, region_type: RegionType) -> bool {
        use_cases::regions::set_region_type(&mut self.state, index, region_type)
    }

    pub fn set_region_value(&mut self, index: u32, value: i32) -> anyhow::Result<bool> {
        use_cases::regions::set_region_value(&mut self.state, index, value)
    }

    pub fn delete_region(&mut self, index: u32) -> bool {
        use_cases::regions::delete_region(&mut self.state, index)
    }

    // ── Licht & Geräusche ──────────────────────────────────────────

    pub fn place_light(&mut self, position: Vec2, placement: LightPlacement) -> anyhow::Result<u32> {
        use_cases::sources::place_light(&mut self.state, position, placement)
    }

    pub fn update_light(&mut self, index: u32, update: LightSourceUpdate) -> anyhow::Result<bool> {
        use_cases::sources::update_light(&mut self.state, index, update)
    }

    pub fn set_light_range_feet(&mut self, index: u32, feet: f32) -> anyhow::Result<bool> {
        use_cases::sources::set_light_range_feet(&mut self.state, index, feet)
    }

    pub fn remove_light(&mut self, index: u32) -> bool {
        use_cases::sources::remove_light(&mut self.state, index)
    }

    pub fn place_sound(&mut self, position: Vec2, placement: SoundPlacement) -> anyhow::Result<u32> {
        use_cases::sources::place_sound(&mut self.state, position, placement)
    }

    pub fn update_sound(&mut self, index: u32, update: SoundSourceUpdate) -> anyhow::Result<bool> {
        use_cases::sources::update_sound(&mut self.state, index, update)
    }

    pub fn set_sound_radius_feet(&mut self, index: u32, feet: f32) -> anyhow::Result<bool> {
        use_cases::sources::set_sound_radius_feet(&mut self.state, index, feet)
    }

    pub fn remove_sound(&mut self, index: u32) -> bool {
        use_cases::sources::remove_sound(&mut self.state, index)
    }

    // ── Fog of War ─────────────────────────────────────────────────

    pub fn set_fog_mode(&mut self, mode: FogMode) {
        use_cases::fog::set_fog_mode(&mut self.state, mode)
    }

    pub fn set_fog_tool(&mut self, tool: FogTool) {
        use_cases::fog::set_fog_tool(&mut self.state, tool)
    }

    pub fn resize_fog(&mut self, size: Vec2) -> anyhow::Result<()> {
        use_cases::fog::resize_fog(&mut self.state, size)
    }

    pub fn hide_all(&mut self) {
        use_cases::fog::hide_all(&mut self.state)
    }

    pub fn reveal_all(&mut self) {
        use_cases::fog::reveal_all(&mut self.state)
    }

    pub fn apply_fog_polygon(&mut self, polygon: &[Vec2]) -> usize {
        use_cases::fog::apply_fog_polygon(&mut self.state, polygon)
    }

    pub fn bucket_fill_fog(&mut self, seed: Vec2) -> usize {
        use_cases::fog::bucket_fill_fog(&mut self.state, seed)
    }

    // ── History ────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        use_cases::history::undo(&mut self.state)
    }

    pub fn redo(&mut self) -> bool {
        use_cases::history::redo(&mut self.state)
    }

    // ── Outbox & Abgleich ──────────────────────────────────────────

    /// Übergibt alle eingereihten Mutationen an den Host.
    pub fn drain_mutations(&mut self) -> Vec<PendingMutation> {
        self.state.outbox.drain()
    }

    pub fn report_success(&mut self, id: u64) -> bool {
        self.state.outbox.report_success(id)
    }

    /// Meldet einen Fehlschlag. Der lokale Stand bleibt erhalten, die Entität gilt als veraltet.
    pub fn report_failure(&mut self, id: u64, reason: &str) -> Option<EntityRef> {
        self.state.outbox.report_failure(id, reason)
    }

    pub fn stale_entities(&self) -> Vec<EntityRef> {
        self.state.outbox.stale_entities().collect()
    }

    pub fn apply_authoritative_wall(&mut self, wall: Wall) {
        let entity = EntityRef::Wall(wall.index);
        self.state.replace_authoritative(|stage| {
            let mut wall = wall;
            wall.normalize_segments();
            stage.walls.insert(wall.index, wall);
        });
        self.state.outbox.clear_stale(entity);
    }

    pub fn apply_authoritative_opening(&mut self, opening: Opening) {
        let entity = EntityRef::Opening(opening.index);
        self.state.replace_authoritative(|stage| {
            stage.openings.insert(opening.index, opening);
        });
        self.state.outbox.clear_stale(entity);
    }

    pub fn apply_authoritative_region(&mut self, region: Region) {
        let entity = EntityRef::Region(region.index);
        self.state.replace_authoritative(|stage| {
            stage.regions.insert(region.index, region);
        });
        self.state.outbox.clear_stale(entity);
    }

    pub fn apply_authoritative_light(&mut self, light: LightSource) {
        let entity = EntityRef::LightSource(light.index);
        self.state.replace_authoritative(|stage| {
            let mut light = light;
            light.normalize_direction();
            stage.lights.insert(light.index, light);
        });
        self.state.outbox.clear_stale(entity);
    }

    pub fn apply_authoritative_sound(&mut self, sound: SoundSource) {
        let entity = EntityRef::SoundSource(sound.index);
        self.state.replace_authoritative(|stage| {
            stage.sounds.insert(sound.index, sound);
        });
        self.state.outbox.clear_stale(entity);
    }

    pub fn apply_authoritative_grid(&mut self, grid: GridConfig, grid_scale: f32) {
        self.state.replace_authoritative(|stage| {
            stage.grid = grid;
            stage.grid_scale = grid_scale;
        });
        self.state.outbox.clear_stale(EntityRef::Grid);
    }

    pub fn apply_authoritative_fog(&mut self, fog: FogMask) -> anyhow::Result<()> {
        fog.validate()?;
        self.state.replace_authoritative(|stage| {
            let mut fog = fog;
            fog.normalize();
            stage.fog = fog;
        });
        self.state.outbox.clear_stale(EntityRef::Fog);
        Ok(())
    }

    /// Entfernt eine Entität, die serverseitig nicht (mehr) existiert.
    pub fn apply_authoritative_removal(&mut self, entity: EntityRef) {
        self.state.replace_authoritative(|stage| match entity {
            EntityRef::Wall(index) => {
                stage.walls.shift_remove(&index);
            }
            EntityRef::Opening(index) => {
                stage.openings.shift_remove(&index);
            }
            EntityRef::Region(index) => {
                stage.regions.shift_remove(&index);
            }
            EntityRef::LightSource(index) => {
                stage.lights.shift_remove(&index);
            }
            EntityRef::SoundSource(index) => {
                stage.sounds.shift_remove(&index);
            }
            EntityRef::Grid | EntityRef::Fog => {}
        });
        self.state.outbox.clear_stale(entity);
    }

    /// Ersetzt die gesamte Stage (Neuladen); History und Sessions werden verworfen.
    pub fn apply_authoritative_stage(&mut self, stage: Stage) -> anyhow::Result<()> {
        stage.fog.validate()?;
        let mut stage = stage;
        stage.normalize();
        let options = self.state.options.clone();
        let outbox = std::mem::take(&mut self.state.outbox);
        let command_log = std::mem::take(&mut self.state.command_log);
        let allocator = self.state.allocator.clone();

        let mut state = EditorState::new(stage, options);
        state.allocator.absorb(&allocator);
        state.outbox = outbox;
        state.outbox.clear_all_stale();
        state.command_log = command_log;
        state.fog_mode = self.state.fog_mode;
        state.fog_tool = self.state.fog_tool;
        state.snap_modifiers = self.state.snap_modifiers;
        self.state = state;
        log::info!("Stage '{}' autoritativ neu geladen", self.state.stage.id);
        Ok(())
    }
}

fn edit_outcome<T>(outcome: EditOutcome<T>, applied: impl FnOnce(T) -> CommandOutcome) -> CommandOutcome {
    match outcome {
        EditOutcome::Applied(value) => applied(value),
        EditOutcome::ConfirmationRequired => CommandOutcome::ConfirmationRequired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> StageEditor {
        StageEditor::new(Stage::new("stage-1"), EditorOptions::default())
    }

    #[test]
    fn commands_werden_protokolliert() {
        let mut editor = editor();
        let outcome = editor
            .handle_command(EditorCommand::PlaceWall {
                poles: vec![Vec2::ZERO, Vec2::new(100.0, 0.0)],
                placement: None,
            })
            .expect("ok");
        assert_eq!(outcome, CommandOutcome::Created(0));
        assert_eq!(
            editor.handle_command(EditorCommand::DeleteWall { index: 7 }).expect("ok"),
            CommandOutcome::Ignored
        );
        assert_eq!(editor.state().command_log.len(), 2);
        assert_eq!(editor.state().command_log.rejected_count(), 0);
    }

    #[test]
    fn fehlerhafte_commands_liefern_fehler() {
        let mut editor = editor();
        let result = editor.handle_command(EditorCommand::PlaceRegion {
            vertices: vec![Vec2::ZERO],
            placement: RegionPlacement::default(),
        });
        assert!(result.is_err());
        let last = editor.state().command_log.last().expect("protokolliert");
        assert!(last.was_rejected());
    }

    #[test]
    fn autoritative_daten_loeschen_stale_markierung() {
        let mut editor = editor();
        let index = editor
            .place_light(Vec2::ZERO, LightPlacement::default())
            .expect("ok");
        let drained = editor.drain_mutations();
        let entity = editor.report_failure(drained[0].id, "500").expect("bekannt");
        assert_eq!(entity, EntityRef::LightSource(index));
        assert_eq!(editor.stale_entities(), vec![entity]);
        assert!(editor.stage().lights.contains_key(&index));

        let mut light = editor.stage().lights[&index].clone();
        light.range = 2.0;
        editor.apply_authoritative_light(light);
        assert!(editor.stale_entities().is_empty());
        assert_eq!(editor.stage().lights[&index].range, 2.0);
        assert!(editor.drain_mutations().is_empty());
    }

    #[test]
    fn neu_laden_vergibt_keine_alten_indizes() {
        let mut editor = editor();
        let index = editor
            .place_sound(Vec2::ZERO, SoundPlacement::default())
            .expect("ok");
        editor.remove_sound(index);
        editor
            .apply_authoritative_stage(Stage::new("stage-1"))
            .expect("gültige Stage");
        let next = editor
            .place_sound(Vec2::ZERO, SoundPlacement::default())
            .expect("ok");
        assert!(next > index);
        assert!(!editor.can_undo());
    }

    #[test]
    fn uebergrosse_autoritative_maske_wird_abgelehnt() {
        let mut editor = editor();
        editor.resize_fog(Vec2::new(100.0, 100.0)).expect("ok");
        let before = editor.stage().fog.clone();
        let huge: FogMask = serde_json::from_str(
            r#"{"origin": {"x": 0, "y": 0}, "cellSize": 10, "cols": 4294967296, "rows": 4294967296}"#,
        )
        .expect("Maske sollte parsen");
        assert!(editor.apply_authoritative_fog(huge).is_err());
        assert_eq!(editor.stage().fog, before);
    }
}
