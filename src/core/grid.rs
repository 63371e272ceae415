//! Raster-Koordinatensystem: Pixel ↔ Grid für Quadrat-, Hex- und Isometrie-Raster.
//!
//! Ganzzahlige Grid-Koordinaten adressieren Zellmittelpunkte; der Offset legt
//! den Mittelpunkt der Zelle (0, 0) fest. Bei Hex-Rastern sind die Koordinaten
//! axial (q = `col`, r = `row`), `cell_size` beschreibt die Bounding-Box eines Hexagons.
//!
//! Alle Funktionen sind total: degenerierte Konfigurationen (Nullgröße, negative
//! Werte) liefern deterministische, ggf. unbrauchbare Ergebnisse statt Panics.
//! Die Validierung passiert vorher über [`GridConfig::validate`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

const SQRT_3: f32 = 1.732_050_8;

/// Raster-Topologie der Stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridType {
    /// Kein Raster (Identität, kein Snapping)
    NoGrid,
    /// Quadratisches Raster
    #[default]
    Square,
    /// Hex-Raster mit senkrechten Spalten (flache Oberkante)
    HexV,
    /// Hex-Raster mit waagerechten Reihen (Spitze oben)
    HexH,
    /// Isometrisches Rauten-Raster
    Isometric,
}

/// Zellgröße in Pixeln
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

/// Raster-Verschiebung in Pixeln
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridOffset {
    pub left: f32,
    pub top: f32,
}

/// Raster-Konfiguration einer Stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Topologie
    #[serde(rename = "type")]
    pub grid_type: GridType,
    /// Zellgröße (bei Hex: Bounding-Box)
    pub cell_size: CellSize,
    /// Verschiebung des Rasters
    pub offset: GridOffset,
    /// Snapping aktiv
    pub snap: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_type: GridType::Square,
            cell_size: CellSize {
                width: 50.0,
                height: 50.0,
            },
            offset: GridOffset::default(),
            snap: true,
        }
    }
}

impl GridConfig {
    /// Erstellt eine Konfiguration mit quadratischen Zellen.
    pub fn new(grid_type: GridType, cell: f32) -> Self {
        Self {
            grid_type,
            cell_size: CellSize {
                width: cell,
                height: cell,
            },
            ..Self::default()
        }
    }

    /// Setzt den Offset (Builder).
    pub fn with_offset(mut self, left: f32, top: f32) -> Self {
        self.offset = GridOffset { left, top };
        self
    }

    /// Setzt das Snap-Flag (Builder).
    pub fn with_snap(mut self, snap: bool) -> Self {
        self.snap = snap;
        self
    }

    /// Prüft die Konfiguration vor der Übernahme in eine Stage.
    ///
    /// Zellgrößen unter `min_cell_size` sowie nicht-endliche Offsets werden abgelehnt.
    pub fn validate(&self, min_cell_size: f32) -> anyhow::Result<()> {
        let CellSize { width, height } = self.cell_size;
        if !width.is_finite() || !height.is_finite() {
            anyhow::bail!("Zellgröße ist keine endliche Zahl ({width} × {height})");
        }
        if width < min_cell_size || height < min_cell_size {
            anyhow::bail!(
                "Zellgröße {width} × {height} unterschreitet das Minimum von {min_cell_size}"
            );
        }
        if !self.offset.left.is_finite() || !self.offset.top.is_finite() {
            anyhow::bail!(
                "Raster-Offset ist keine endliche Zahl ({}, {})",
                self.offset.left,
                self.offset.top
            );
        }
        Ok(())
    }

    fn origin(&self) -> Vec2 {
        Vec2::new(self.offset.left, self.offset.top)
    }

    fn extent(&self) -> Vec2 {
        Vec2::new(self.cell_size.width, self.cell_size.height)
    }
}

/// Fraktionale Grid-Koordinate (bei Hex: axial).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridCoord {
    pub col: f32,
    pub row: f32,
}

impl GridCoord {
    pub fn new(col: f32, row: f32) -> Self {
        Self { col, row }
    }
}

/// Ganzzahlige Zellkoordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoord {
    pub col: i32,
    pub row: i32,
}

impl CellCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Rechnet einen Pixelpunkt in fraktionale Grid-Koordinaten um.
pub fn pixel_to_grid(point: Vec2, config: &GridConfig) -> GridCoord {
    let local = point - config.origin();
    let w = config.cell_size.width;
    let h = config.cell_size.height;

    match config.grid_type {
        GridType::NoGrid => GridCoord::new(point.x, point.y),
        GridType::Square => GridCoord::new(local.x / w, local.y / h),
        GridType::HexV => {
            let q = local.x / (0.75 * w);
            GridCoord::new(q, local.y / h - q * 0.5)
        }
        GridType::HexH => {
            let r = local.y / (0.75 * h);
            GridCoord::new(local.x / w - r * 0.5, r)
        }
        GridType::Isometric => {
            let a = local.x / (w * 0.5);
            let b = local.y / (h * 0.5);
            GridCoord::new((a + b) * 0.5, (b - a) * 0.5)
        }
    }
}

/// Rechnet fraktionale Grid-Koordinaten in einen Pixelpunkt um.
pub fn grid_to_pixel(coord: GridCoord, config: &GridConfig) -> Vec2 {
    let w = config.cell_size.width;
    let h = config.cell_size.height;
    let GridCoord { col, row } = coord;

    let local = match config.grid_type {
        GridType::NoGrid => return Vec2::new(col, row),
        GridType::Square => Vec2::new(col * w, row * h),
        GridType::HexV => Vec2::new(0.75 * w * col, h * (row + col * 0.5)),
        GridType::HexH => Vec2::new(w * (col + row * 0.5), 0.75 * h * row),
        GridType::Isometric => Vec2::new((col - row) * w * 0.5, (col + row) * h * 0.5),
    };
    local + config.origin()
}

/// Ermittelt die Zelle, die einen Pixelpunkt enthält.
pub fn cell_of(point: Vec2, config: &GridConfig) -> CellCoord {
    let g = pixel_to_grid(point, config);
    match config.grid_type {
        GridType::HexV | GridType::HexH => cube_round(g.col, g.row),
        _ => CellCoord::new(g.col.round() as i32, g.row.round() as i32),
    }
}

/// Pixel-Mittelpunkt einer Zelle.
pub fn cell_center(cell: CellCoord, config: &GridConfig) -> Vec2 {
    grid_to_pixel(GridCoord::new(cell.col as f32, cell.row as f32), config)
}

/// Rundet axiale Hex-Koordinaten über Cube-Koordinaten (q + r + s = 0).
fn cube_round(q: f32, r: f32) -> CellCoord {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    CellCoord::new(rq as i32, rr as i32)
}

/// Rastet einen Punkt auf den nächsten Zellmittelpunkt ein (nur wenn `config.snap`).
pub fn snap(point: Vec2, config: &GridConfig) -> Vec2 {
    snap_with_mode(point, config, SnapMode::Full)
}

/// Rastet einen Punkt im gegebenen Modus ein.
///
/// Quadrat/Isometrie: Gitter mit Schrittweite `1 / divisor` im Grid-Raum
/// (Full = Mittelpunkte, Half = + Ecken/Kantenmitten, Quarter, Micro).
/// Hex: Full = Mittelpunkt, Half = + Ecken, Quarter/Micro = + Kantenmitten.
pub fn snap_with_mode(point: Vec2, config: &GridConfig, mode: SnapMode) -> Vec2 {
    if !config.snap || mode == SnapMode::Free {
        return point;
    }

    match config.grid_type {
        GridType::NoGrid => point,
        GridType::Square | GridType::Isometric => {
            let divisor = mode.divisor();
            let g = pixel_to_grid(point, config);
            let snapped = GridCoord::new(
                (g.col * divisor).round() / divisor,
                (g.row * divisor).round() / divisor,
            );
            grid_to_pixel(snapped, config)
        }
        GridType::HexV | GridType::HexH => snap_hex(point, config, mode),
    }
}

fn snap_hex(point: Vec2, config: &GridConfig, mode: SnapMode) -> Vec2 {
    let center = cell_center(cell_of(point, config), config);
    if mode == SnapMode::Full {
        return center;
    }

    let corners = hex_corners(center, config);
    let mut best = center;
    let mut best_dist = center.distance_squared(point);
    let mut consider = |candidate: Vec2| {
        let dist = candidate.distance_squared(point);
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    };

    for (i, &corner) in corners.iter().enumerate() {
        consider(corner);
        if matches!(mode, SnapMode::Quarter | SnapMode::Micro) {
            consider((corner + corners[(i + 1) % 6]) * 0.5);
        }
    }
    best
}

/// Ecken eines Hexagons (Bounding-Box = Zellgröße).
pub fn hex_corners(center: Vec2, config: &GridConfig) -> [Vec2; 6] {
    let w = config.cell_size.width;
    let h = config.cell_size.height;
    // Einheits-Hexagon mit Radius 1, skaliert auf die Bounding-Box
    let (start_deg, scale) = match config.grid_type {
        GridType::HexH => (-30.0_f32, Vec2::new(w / SQRT_3, h * 0.5)),
        _ => (0.0_f32, Vec2::new(w * 0.5, h / SQRT_3)),
    };
    std::array::from_fn(|i| {
        let angle = (start_deg + 60.0 * i as f32).to_radians();
        center + Vec2::new(angle.cos(), angle.sin()) * scale
    })
}

// ── Snap-Modi ───────────────────────────────────────────────────────

/// Feinheit der Snap-Ziele (hierarchisch, jeder Modus enthält die Ziele des vorigen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// Kein Snapping
    Free,
    /// Nur Zellmittelpunkte
    #[default]
    Full,
    /// + Ecken und Kantenmitten
    Half,
    /// + Viertelpunkte
    Quarter,
    /// + Achtelpunkte
    Micro,
}

impl SnapMode {
    fn divisor(self) -> f32 {
        match self {
            SnapMode::Free | SnapMode::Full => 1.0,
            SnapMode::Half => 2.0,
            SnapMode::Quarter => 4.0,
            SnapMode::Micro => 8.0,
        }
    }
}

/// Zustand der Modifier-Tasten beim Platzieren/Ziehen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapModifiers {
    pub alt: bool,
    pub ctrl: bool,
}

/// Snap-Verhalten eines Kontexts (Standard vs. mit Ctrl).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapConfig {
    pub default: SnapMode,
    pub ctrl: SnapMode,
}

/// Assets/Quellen: Mittelpunkt, mit Ctrl halbe Zelle.
pub const ASSET_SNAP_CONFIG: SnapConfig = SnapConfig {
    default: SnapMode::Full,
    ctrl: SnapMode::Half,
};

/// Wände: halbe Zelle, mit Ctrl Viertel.
pub const WALL_SNAP_CONFIG: SnapConfig = SnapConfig {
    default: SnapMode::Half,
    ctrl: SnapMode::Quarter,
};

/// Löst den Snap-Modus aus den Modifiern auf. Alt bedeutet immer `Free`.
pub fn resolve_snap_mode(modifiers: SnapModifiers, config: SnapConfig) -> SnapMode {
    if modifiers.alt {
        SnapMode::Free
    } else if modifiers.ctrl {
        config.ctrl
    } else {
        config.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL_TYPES: [GridType; 5] = [
        GridType::NoGrid,
        GridType::Square,
        GridType::HexV,
        GridType::HexH,
        GridType::Isometric,
    ];

    fn sample_points() -> Vec<Vec2> {
        let mut points = Vec::new();
        for i in -5..=5 {
            for j in -5..=5 {
                points.push(Vec2::new(i as f32 * 37.3 + 0.7, j as f32 * 23.9 - 1.3));
            }
        }
        points
    }

    #[test]
    fn round_trip_fuer_alle_rastertypen() {
        for grid_type in ALL_TYPES {
            let mut config = GridConfig::new(grid_type, 50.0).with_offset(13.0, -7.5);
            config.cell_size.height = 40.0;
            config.snap = false;
            for p in sample_points() {
                let back = grid_to_pixel(pixel_to_grid(p, &config), &config);
                assert_relative_eq!(back.x, p.x, epsilon = 1e-2);
                assert_relative_eq!(back.y, p.y, epsilon = 1e-2);
            }
        }
    }

    #[test]
    fn quadrat_snap_auf_zellmittelpunkt() {
        let config = GridConfig::new(GridType::Square, 50.0).with_snap(true);
        let snapped = snap(Vec2::new(77.0, 132.0), &config);
        assert_relative_eq!(snapped.x, 100.0);
        assert_relative_eq!(snapped.y, 150.0);
    }

    #[test]
    fn snap_deaktiviert_liefert_eingabe() {
        let config = GridConfig::new(GridType::Square, 50.0).with_snap(false);
        let p = Vec2::new(77.0, 132.0);
        assert_eq!(snap(p, &config), p);
        assert_eq!(snap_with_mode(p, &config, SnapMode::Micro), p);
    }

    #[test]
    fn no_grid_ist_identitaet() {
        let config = GridConfig::new(GridType::NoGrid, 50.0).with_offset(10.0, 10.0);
        let p = Vec2::new(3.3, 4.4);
        let g = pixel_to_grid(p, &config);
        assert_eq!((g.col, g.row), (3.3, 4.4));
        assert_eq!(snap(p, &config), p);
    }

    #[test]
    fn half_mode_rastet_auf_zellecke() {
        let config = GridConfig::new(GridType::Square, 50.0);
        let snapped = snap_with_mode(Vec2::new(24.0, 26.0), &config, SnapMode::Half);
        assert_relative_eq!(snapped.x, 25.0);
        assert_relative_eq!(snapped.y, 25.0);
        let quarter = snap_with_mode(Vec2::new(14.0, 11.0), &config, SnapMode::Quarter);
        assert_relative_eq!(quarter.x, 12.5);
        assert_relative_eq!(quarter.y, 12.5);
    }

    #[test]
    fn hex_zellmittelpunkte_sind_stabil() {
        for grid_type in [GridType::HexV, GridType::HexH] {
            let config = GridConfig::new(grid_type, 60.0).with_offset(5.0, 5.0);
            for col in -4..=4 {
                for row in -4..=4 {
                    let cell = CellCoord::new(col, row);
                    let center = cell_center(cell, &config);
                    assert_eq!(cell_of(center, &config), cell);
                    // Leicht versetzt bleibt in derselben Zelle
                    assert_eq!(cell_of(center + Vec2::new(3.0, -2.0), &config), cell);
                    assert_eq!(snap(center + Vec2::new(4.0, 4.0), &config), center);
                }
            }
        }
    }

    #[test]
    fn hex_half_mode_rastet_auf_ecke() {
        let config = GridConfig::new(GridType::HexH, 60.0);
        let center = cell_center(CellCoord::new(0, 0), &config);
        let corner = hex_corners(center, &config)[0];
        let near_corner = corner + (center - corner) * 0.1;
        let snapped = snap_with_mode(near_corner, &config, SnapMode::Half);
        assert_relative_eq!(snapped.x, corner.x, epsilon = 1e-3);
        assert_relative_eq!(snapped.y, corner.y, epsilon = 1e-3);
    }

    #[test]
    fn isometrie_zellen() {
        let config = GridConfig::new(GridType::Isometric, 64.0);
        let center = cell_center(CellCoord::new(2, 1), &config);
        assert_relative_eq!(center.x, 32.0);
        assert_relative_eq!(center.y, 96.0);
        assert_eq!(cell_of(center + Vec2::new(5.0, 2.0), &config), CellCoord::new(2, 1));
    }

    #[test]
    fn degenerierte_konfiguration_panict_nicht() {
        let mut config = GridConfig::new(GridType::Square, 0.0);
        let _ = snap(Vec2::new(10.0, 10.0), &config);
        let _ = cell_of(Vec2::new(10.0, 10.0), &config);
        config.cell_size.width = -50.0;
        let p = snap(Vec2::new(77.0, 132.0), &config);
        assert!(p.y.is_finite());
    }

    #[test]
    fn validierung_lehnt_kleine_zellen_und_nan_ab() {
        assert!(GridConfig::new(GridType::Square, 50.0).validate(10.0).is_ok());
        assert!(GridConfig::new(GridType::Square, 9.0).validate(10.0).is_err());
        assert!(GridConfig::new(GridType::HexV, f32::NAN).validate(10.0).is_err());
        let bad_offset = GridConfig::new(GridType::Square, 50.0).with_offset(f32::NAN, 0.0);
        assert!(bad_offset.validate(10.0).is_err());
    }

    #[test]
    fn snap_modus_aus_modifiern() {
        let none = SnapModifiers::default();
        let ctrl = SnapModifiers {
            ctrl: true,
            ..Default::default()
        };
        let alt_ctrl = SnapModifiers {
            alt: true,
            ctrl: true,
        };
        assert_eq!(resolve_snap_mode(none, WALL_SNAP_CONFIG), SnapMode::Half);
        assert_eq!(resolve_snap_mode(ctrl, WALL_SNAP_CONFIG), SnapMode::Quarter);
        assert_eq!(resolve_snap_mode(ctrl, ASSET_SNAP_CONFIG), SnapMode::Half);
        assert_eq!(resolve_snap_mode(alt_ctrl, ASSET_SNAP_CONFIG), SnapMode::Free);
    }
}
