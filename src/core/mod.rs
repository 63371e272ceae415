//! Core-Domänentypen: Raster, Wände, Regionen, Licht, Geräusche, Fog-Maske, Spatial-Index.

pub mod color;
pub mod flood;
pub mod fog;
pub mod geometry;
/// Raster-Koordinatensystem
///
/// Umrechnung Pixel ↔ Grid und Snapping für:
/// - Quadrat-Raster
/// - Hex-Raster (vertikal/horizontal)
/// - Isometrie-Raster
pub mod grid;
pub mod light;
pub mod opening;
pub mod region;
pub mod region_boundary;
pub mod region_merge;
pub mod segment;
pub mod serde_point;
pub mod sound;
pub mod spatial;
pub mod stage;
pub mod wall;

pub use color::{is_valid_hex_color, parse_hex_color, to_hex_color};
pub use fog::{FogCell, FogMask, FogMode, FogTool};
pub use geometry::LineSegment;
pub use grid::{
    cell_center, cell_of, grid_to_pixel, pixel_to_grid, resolve_snap_mode, snap, snap_with_mode,
    CellCoord, CellSize, GridConfig, GridCoord, GridOffset, GridType, SnapConfig, SnapMode,
    SnapModifiers, ASSET_SNAP_CONFIG, WALL_SNAP_CONFIG,
};
pub use light::{LightPlacement, LightSource, LightSourceType, DEFAULT_GRID_SCALE};
pub use opening::{
    Opening, OpeningOpacity, OpeningPlacement, OpeningPreset, OpeningState, OpeningVisibility,
    OPENING_PRESETS,
};
pub use region::{
    color_of, default_value_for_type, display_label, fill_opacity, is_valid_value, sort_regions,
    suggest_region_name, valid_values_for_type, Region, RegionColor, RegionPlacement, RegionType,
    RegionValue,
};
pub use region_boundary::{stage_rectangle, trace_region_boundary, RegionBoundary, TracedRegion};
pub use region_merge::{
    find_mergeable_regions, find_shared_edge, merge_polygons, polygons_overlap, SharedEdge,
};
pub use segment::{Segment, SegmentState, SegmentType};
pub use sound::{SoundPlacement, SoundSource};
pub use spatial::{PoleIndex, PoleMatch, PoleRef};
pub use stage::{Barrier, Indexed, Stage};
pub use wall::{Pole, Wall, WallPlacement, WallPreset, WallVisibility, WALL_PRESETS};
