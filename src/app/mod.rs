//! Application-Layer: Editor-State, Controller, Commands, History und Mutations-Outbox.

pub mod command_log;
pub mod controller;
pub mod edit_session;
pub mod events;
pub mod history;
pub mod index_allocator;
pub mod mutation;
/// Editor-Zustand
///
/// Hält die lokale Stage, History, Vertex-Session und Outbox.
pub mod state;
pub mod use_cases;

pub use command_log::{CommandLog, LoggedCommand};
pub use controller::StageEditor;
pub use edit_session::VertexEditSession;
pub use events::{CommandOutcome, EditorCommand};
pub use history::{EditHistory, Snapshot};
pub use index_allocator::IndexAllocator;
pub use mutation::{
    diff_stages, EntityRef, LightSourceUpdate, MutationOutbox, OpeningUpdate, PendingMutation,
    RegionUpdate, SoundSourceUpdate, StageMutation, WallUpdate,
};
pub use state::{EditOutcome, EditorState, PendingAction};
