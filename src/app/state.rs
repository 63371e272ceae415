use std::sync::Arc;

use glam::Vec2;

use super::edit_session::VertexEditSession;
use super::history::{EditHistory, Snapshot};
use super::index_allocator::IndexAllocator;
use super::mutation::{diff_stages, MutationOutbox};
use super::CommandLog;
use crate::core::{
    resolve_snap_mode, snap_with_mode, FogMode, FogTool, PoleIndex, SnapConfig, SnapModifiers,
    Stage, WallPlacement,
};
use crate::shared::EditorOptions;

/// Aktion, die wegen ungesicherter Vertex-Änderungen auf Bestätigung wartet.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    PlaceWall {
        poles: Vec<Vec2>,
        placement: WallPlacement,
    },
    DeleteWall {
        index: u32,
    },
    BeginVertexEdit {
        wall_index: u32,
    },
}

/// Ergebnis einer Operation, die eine laufende Vertex-Bearbeitung verwerfen würde.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome<T> {
    Applied(T),
    /// Ungesicherte Änderungen; die Aktion liegt in `EditorState::pending`.
    ConfirmationRequired,
}

impl<T> EditOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            EditOutcome::Applied(value) => Some(value),
            EditOutcome::ConfirmationRequired => None,
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        matches!(self, EditOutcome::ConfirmationRequired)
    }
}

/// Hauptzustand des Stage-Editors
pub struct EditorState {
    /// Lokale (optimistische) Stage
    pub stage: Arc<Stage>,
    /// Undo/Redo-History (Snapshot-basiert)
    pub history: EditHistory,
    /// Index-Vergabe (nicht Teil der History)
    pub allocator: IndexAllocator,
    /// Laufende Vertex-Bearbeitung
    pub session: Option<VertexEditSession>,
    /// Auf Bestätigung wartende Aktion
    pub pending: Option<PendingAction>,
    pub fog_mode: FogMode,
    pub fog_tool: FogTool,
    /// Aktuell gehaltene Modifier-Tasten
    pub snap_modifiers: SnapModifiers,
    /// Ausstehende Mutationen an die Stage-API
    pub outbox: MutationOutbox,
    /// Verlauf ausgeführter Commands
    pub command_log: CommandLog,
    /// Laufzeit-Optionen
    pub options: EditorOptions,
    pole_index: Option<PoleIndex>,
}

impl EditorState {
    /// Erstellt den Zustand für eine geladene Stage.
    pub fn new(stage: Stage, options: EditorOptions) -> Self {
        let allocator = IndexAllocator::from_stage(&stage);
        Self {
            stage: Arc::new(stage),
            history: EditHistory::with_depth(options.history_depth),
            allocator,
            session: None,
            pending: None,
            fog_mode: FogMode::default(),
            fog_tool: FogTool::default(),
            snap_modifiers: SnapModifiers::default(),
            outbox: MutationOutbox::new(),
            command_log: CommandLog::new(),
            options,
            pole_index: None,
        }
    }

    /// Führt eine Änderung an der Stage aus.
    ///
    /// Bei tatsächlicher Änderung: Undo-Snapshot ablegen, Partial-Updates
    /// einreihen und den Pole-Index verwerfen. Ohne Änderung bleibt alles unberührt.
    pub fn mutate_stage<R>(&mut self, mutate: impl FnOnce(&mut Stage) -> R) -> R {
        let before = Arc::clone(&self.stage);
        let result = mutate(Arc::make_mut(&mut self.stage));

        let mutations = diff_stages(&before, &self.stage);
        if mutations.is_empty() {
            // Unverändert: den (ggf. kopierten) Vorzustand wiederverwenden
            self.stage = before;
            return result;
        }

        self.history.record(Snapshot { stage: before });
        self.outbox.enqueue(&self.stage.id, mutations);
        self.pole_index = None;
        result
    }

    /// Setzt einen Stand aus der History ein und reiht die Differenz ein.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let mutations = diff_stages(&self.stage, &snapshot.stage);
        self.stage = snapshot.stage;
        self.outbox.enqueue(&self.stage.id, mutations);
        self.pole_index = None;
        self.drop_orphaned_session();
    }

    /// Übernimmt autoritative Daten ohne History und ohne Outbox.
    pub fn replace_authoritative(&mut self, replace: impl FnOnce(&mut Stage)) {
        replace(Arc::make_mut(&mut self.stage));
        if let Some(max) = self.stage.max_index() {
            self.allocator.reserve(max);
        }
        self.pole_index = None;
        self.drop_orphaned_session();
    }

    fn drop_orphaned_session(&mut self) {
        let orphaned = self
            .session
            .as_ref()
            .is_some_and(|s| !self.stage.walls.contains_key(&s.wall_index));
        if orphaned {
            log::warn!("Vertex-Bearbeitung verworfen: Wand existiert nicht mehr");
            self.session = None;
        }
    }

    /// Ob eine Vertex-Bearbeitung mit ungesicherten Änderungen läuft.
    pub fn has_unsaved_vertex_edit(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.has_changes())
    }

    /// Pole-Index, bei Bedarf neu aufgebaut.
    pub fn pole_index(&mut self) -> &PoleIndex {
        self.pole_index
            .get_or_insert_with(|| PoleIndex::from_stage(&self.stage))
    }

    /// Rastet einen Punkt gemäß Raster, Modifiern und Kontext ein.
    pub fn snap_point(&self, point: Vec2, config: SnapConfig) -> Vec2 {
        let mode = resolve_snap_mode(self.snap_modifiers, config);
        snap_with_mode(point, &self.stage.grid, mode)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
