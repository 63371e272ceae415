//! VTT Stage Editor Library.
//! Stage-Geometrie und Overlay-Modell als Library exportiert für Hosts und Tests.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    CommandOutcome, EditOutcome, EditorCommand, EditorState, EntityRef, MutationOutbox,
    PendingAction, PendingMutation, StageEditor, StageMutation,
};
pub use core::{
    FogCell, FogMask, FogMode, FogTool, GridConfig, GridType, LightSource, Opening, Region,
    RegionType, Segment, SegmentState, SegmentType, SoundSource, Stage, Wall,
};
pub use shared::EditorOptions;
