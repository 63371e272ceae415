//! Commands: mutierende Operationen auf dem Editor-Zustand.
//!
//! Hosts können Commands als JSON schicken (`{"command": "placeWall", ...}`);
//! `StageEditor::handle_command` führt sie aus.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::mutation::{
    LightSourceUpdate, OpeningUpdate, RegionUpdate, SoundSourceUpdate, WallUpdate,
};
use crate::core::serde_point;
use crate::core::{
    FogMode, FogTool, GridConfig, LightPlacement, OpeningPlacement, RegionPlacement, RegionType,
    SegmentState, SegmentType, SoundPlacement, WallPlacement,
};

/// Alle Commands, die den Editor-Zustand verändern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditorCommand {
    // === Raster ===
    SetGridConfig {
        grid: GridConfig,
    },
    SetGridScale {
        feet_per_cell: f32,
    },
    SetSnapModifiers {
        alt: bool,
        ctrl: bool,
    },

    // === Wände ===
    PlaceWall {
        #[serde(with = "serde_point::vec")]
        poles: Vec<Vec2>,
        /// Ohne Angabe gelten die Wandvorgaben der Optionen.
        #[serde(default)]
        placement: Option<WallPlacement>,
    },
    DeleteWall {
        index: u32,
    },
    UpdateWall {
        index: u32,
        update: WallUpdate,
    },
    SetSegmentType {
        wall_index: u32,
        span: usize,
        segment_type: SegmentType,
    },
    SetSegmentState {
        wall_index: u32,
        span: usize,
        state: SegmentState,
    },

    // === Vertex-Edit ===
    BeginVertexEdit {
        wall_index: u32,
    },
    MovePole {
        pole_index: usize,
        #[serde(with = "serde_point")]
        position: Vec2,
    },
    InsertPole {
        at: usize,
        #[serde(with = "serde_point")]
        position: Vec2,
    },
    RemovePole {
        pole_index: usize,
    },
    CommitVertexEdit,
    DiscardVertexEdit,
    ConfirmPending,
    CancelPending,

    // === Öffnungen ===
    PlaceOpening {
        placement: OpeningPlacement,
    },
    UpdateOpening {
        index: u32,
        update: OpeningUpdate,
    },
    RemoveOpening {
        index: u32,
    },

    // === Regionen ===
    PlaceRegion {
        #[serde(with = "serde_point::vec")]
        vertices: Vec<Vec2>,
        placement: RegionPlacement,
    },
    /// Platziert und verschmilzt mit gleichartigen Nachbarn
    MergeRegion {
        #[serde(with = "serde_point::vec")]
        vertices: Vec<Vec2>,
        #[serde(default)]
        placement: RegionPlacement,
    },
    /// Region über die von Wänden begrenzte Fläche um `seed`
    FillRegion {
        #[serde(with = "serde_point")]
        seed: Vec2,
        #[serde(with = "serde_point")]
        stage_size: Vec2,
        #[serde(default)]
        placement: RegionPlacement,
    },
    UpdateRegion {
        index: u32,
        update: RegionUpdate,
    },
    SetRegionType {
        index: u32,
        region_type: RegionType,
    },
    SetRegionValue {
        index: u32,
        value: i32,
    },
    DeleteRegion {
        index: u32,
    },

    // === Licht & Geräusche ===
    PlaceLight {
        #[serde(with = "serde_point")]
        position: Vec2,
        #[serde(default)]
        placement: LightPlacement,
    },
    UpdateLight {
        index: u32,
        update: LightSourceUpdate,
    },
    SetLightRangeFeet {
        index: u32,
        feet: f32,
    },
    RemoveLight {
        index: u32,
    },
    PlaceSound {
        #[serde(with = "serde_point")]
        position: Vec2,
        #[serde(default)]
        placement: SoundPlacement,
    },
    UpdateSound {
        index: u32,
        update: SoundSourceUpdate,
    },
    SetSoundRadiusFeet {
        index: u32,
        feet: f32,
    },
    RemoveSound {
        index: u32,
    },

    // === Fog of War ===
    SetFogMode {
        mode: FogMode,
    },
    SetFogTool {
        tool: FogTool,
    },
    ResizeFog {
        #[serde(with = "serde_point")]
        size: Vec2,
    },
    HideAll,
    RevealAll,
    ApplyFogPolygon {
        #[serde(with = "serde_point::vec")]
        polygon: Vec<Vec2>,
    },
    BucketFillFog {
        #[serde(with = "serde_point")]
        seed: Vec2,
    },

    // === History ===
    Undo,
    Redo,
}

/// Ergebnis eines ausgeführten Commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Ausgeführt ohne Rückgabewert
    Done,
    /// Neue Entität mit diesem Index
    Created(u32),
    /// Anzahl geänderter Fog-Zellen
    CellsChanged(usize),
    /// Ungesicherte Vertex-Änderungen: Bestätigung nötig
    ConfirmationRequired,
    /// Keine Wirkung (unbekannter Index, ungültiger Zustand)
    Ignored,
}

impl CommandOutcome {
    pub(crate) fn from_flag(applied: bool) -> Self {
        if applied {
            CommandOutcome::Done
        } else {
            CommandOutcome::Ignored
        }
    }
}
