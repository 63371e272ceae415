//! Fog-of-War-Maske: Zellraster mit verdeckten/aufgedeckten Zellen.
//!
//! Polygon- und Füll-Operationen sind Mengen-Operationen auf der bestehenden
//! Maske (idempotent); nur `hide_all`/`reveal_all` überschreiben alles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::flood::{flood_fill, BarrierSet, CellRaster};
use super::geometry::{point_in_polygon, polygon_bounds, LineSegment};
use super::serde_point;

/// Zustand einer Maskenzelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FogCell {
    Hidden,
    Revealed,
}

/// Bearbeitungsmodus: `Add` verdeckt, `Subtract` deckt auf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FogMode {
    #[default]
    Add,
    Subtract,
}

impl FogMode {
    /// Zielzustand der bearbeiteten Zellen.
    pub fn target(self) -> FogCell {
        match self {
            FogMode::Add => FogCell::Hidden,
            FogMode::Subtract => FogCell::Revealed,
        }
    }
}

/// Aktives Fog-Werkzeug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FogTool {
    #[default]
    Polygon,
    BucketFill,
}

/// Sichtbarkeitsraster einer Stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FogMask {
    /// Obere linke Ecke in Pixeln
    #[serde(with = "serde_point")]
    pub origin: Vec2,
    /// Kantenlänge einer Maskenzelle in Pixeln
    pub cell_size: f32,
    pub cols: usize,
    pub rows: usize,
    #[serde(default)]
    cells: Vec<FogCell>,
}

/// Obergrenze der Zellanzahl einer Maske (entspricht 4000 × 4000 Zellen).
pub const MAX_FOG_CELLS: usize = 16_000_000;

fn checked_cell_count(cols: usize, rows: usize) -> anyhow::Result<usize> {
    cols.checked_mul(rows)
        .filter(|&count| count <= MAX_FOG_CELLS)
        .ok_or_else(|| {
            anyhow::anyhow!("Fog-Maske zu groß: {cols} × {rows} Zellen (max. {MAX_FOG_CELLS})")
        })
}

impl Default for FogMask {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            cell_size: 50.0,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
        }
    }
}

impl FogMask {
    /// Erstellt eine vollständig aufgedeckte Maske.
    pub fn new(origin: Vec2, cell_size: f32, cols: usize, rows: usize) -> anyhow::Result<Self> {
        let count = checked_cell_count(cols, rows)?;
        Ok(Self {
            origin,
            cell_size,
            cols,
            rows,
            cells: vec![FogCell::Revealed; count],
        })
    }

    /// Erstellt eine Maske, die eine Fläche von `size` Pixeln abdeckt.
    pub fn covering(origin: Vec2, size: Vec2, cell_size: f32) -> anyhow::Result<Self> {
        let count = |extent: f32| {
            if cell_size > 0.0 && extent > 0.0 {
                (extent / cell_size).ceil() as usize
            } else {
                0
            }
        };
        Self::new(origin, cell_size, count(size.x), count(size.y))
    }

    /// Prüft die Rastergröße persistierter oder gelieferter Daten.
    pub fn validate(&self) -> anyhow::Result<()> {
        checked_cell_count(self.cols, self.rows).map(|_| ())
    }

    /// Passt die Zellliste an `cols × rows` an (nach Deserialisierung).
    ///
    /// Ein unzulässiges Raster wird zu einer leeren Maske.
    pub fn normalize(&mut self) {
        match checked_cell_count(self.cols, self.rows) {
            Ok(count) => self.cells.resize(count, FogCell::Revealed),
            Err(err) => {
                log::warn!("{err}: Maske wird geleert");
                self.cols = 0;
                self.rows = 0;
                self.cells.clear();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Zustand einer Zelle (`None` außerhalb).
    pub fn get(&self, col: usize, row: usize) -> Option<FogCell> {
        self.linear(col, row).map(|i| self.cells[i])
    }

    fn linear(&self, col: usize, row: usize) -> Option<usize> {
        self.raster().linear(col, row)
    }

    /// Rastergeometrie der Maske.
    pub fn raster(&self) -> CellRaster {
        CellRaster {
            origin: self.origin,
            cell_size: self.cell_size,
            cols: self.cols,
            rows: self.rows,
        }
    }

    /// Pixel-Mittelpunkt einer Zelle.
    pub fn cell_center(&self, col: usize, row: usize) -> Vec2 {
        self.raster().cell_center(col, row)
    }

    /// Zelle unter einem Pixelpunkt.
    pub fn cell_at(&self, point: Vec2) -> Option<(usize, usize)> {
        self.raster().cell_at(point)
    }

    pub fn hidden_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == FogCell::Hidden).count()
    }

    /// Anteil verdeckter Zellen (0.0 bei leerer Maske).
    pub fn coverage(&self) -> f32 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.hidden_count() as f32 / self.cells.len() as f32
        }
    }

    pub fn hide_all(&mut self) {
        self.cells.fill(FogCell::Hidden);
    }

    pub fn reveal_all(&mut self) {
        self.cells.fill(FogCell::Revealed);
    }

    /// Setzt alle Zellen, deren Mittelpunkt im Polygon liegt, auf den Zielzustand.
    ///
    /// Gibt die Anzahl geänderter Zellen zurück. Polygone mit weniger als drei
    /// Punkten ändern nichts.
    pub fn apply_polygon(&mut self, polygon: &[Vec2], mode: FogMode) -> usize {
        if polygon.len() < 3 || self.cells.is_empty() || self.cell_size <= 0.0 {
            return 0;
        }
        let Some((min, max)) = polygon_bounds(polygon) else {
            return 0;
        };

        let col_range = self.index_range(min.x - self.origin.x, max.x - self.origin.x, self.cols);
        let row_range = self.index_range(min.y - self.origin.y, max.y - self.origin.y, self.rows);
        let target = mode.target();

        let mut changed = 0;
        for row in row_range {
            for col in col_range.clone() {
                let i = row * self.cols + col;
                if self.cells[i] != target && point_in_polygon(self.cell_center(col, row), polygon) {
                    self.cells[i] = target;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Zellindizes, deren Mittelpunkt im Pixelintervall `lo..=hi` liegen kann.
    fn index_range(&self, lo: f32, hi: f32, count: usize) -> std::ops::Range<usize> {
        let first = (lo / self.cell_size - 0.5).floor().max(0.0);
        let last = (hi / self.cell_size - 0.5).ceil() + 1.0;
        if !first.is_finite() || !last.is_finite() || last <= 0.0 {
            return 0..0;
        }
        let first = (first as usize).min(count);
        let last = (last as usize).min(count);
        first..last.max(first)
    }

    /// Flutfüllung ab `seed` über 4-Nachbarn mit gleichem Ausgangszustand.
    ///
    /// Übergänge, deren Verbindungslinie zwischen den Zellmittelpunkten eine
    /// Barriere schneidet, sind gesperrt. Die Füllung bleibt immer auf das
    /// endliche Raster beschränkt. Gibt die Anzahl geänderter Zellen zurück.
    pub fn bucket_fill(&mut self, seed: Vec2, mode: FogMode, barriers: &[LineSegment]) -> usize {
        let Some((seed_col, seed_row)) = self.cell_at(seed) else {
            return 0;
        };
        let target = mode.target();
        let source = self.cells[seed_row * self.cols + seed_col];
        if source == target {
            return 0;
        }

        let raster = self.raster();
        let barriers = BarrierSet::new(barriers);
        let cells = &self.cells;
        let reached = flood_fill(&raster, (seed_col, seed_row), &barriers, |i, _| {
            cells[i] == source
        });
        for &(col, row) in &reached {
            self.cells[row * self.cols + col] = target;
        }
        reached.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_room(min: f32, max: f32) -> Vec<LineSegment> {
        let corners = [
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ];
        (0..4)
            .map(|i| LineSegment::new(corners[i], corners[(i + 1) % 4]))
            .collect()
    }

    #[test]
    fn polygon_add_ist_idempotent() {
        let mut mask = FogMask::new(Vec2::ZERO, 10.0, 20, 20).expect("gültige Maske");
        let poly = vec![
            Vec2::new(12.0, 8.0),
            Vec2::new(140.0, 30.0),
            Vec2::new(90.0, 170.0),
        ];
        let first = mask.apply_polygon(&poly, FogMode::Add);
        let after_once = mask.clone();
        let second = mask.apply_polygon(&poly, FogMode::Add);
        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(mask, after_once);
    }

    #[test]
    fn polygon_subtract_erhaelt_uebrige_zellen() {
        let mut mask = FogMask::new(Vec2::ZERO, 10.0, 10, 10).expect("gültige Maske");
        mask.hide_all();
        let hole = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(30.0, 30.0),
            Vec2::new(0.0, 30.0),
        ];
        assert_eq!(mask.apply_polygon(&hole, FogMode::Subtract), 9);
        assert_eq!(mask.hidden_count(), 91);
        assert_eq!(mask.get(5, 5), Some(FogCell::Hidden));
    }

    #[test]
    fn zu_kurzes_polygon_aendert_nichts() {
        let mut mask = FogMask::new(Vec2::ZERO, 10.0, 5, 5).expect("gültige Maske");
        let line = vec![Vec2::ZERO, Vec2::new(50.0, 50.0)];
        assert_eq!(mask.apply_polygon(&line, FogMode::Add), 0);
    }

    #[test]
    fn fuellung_stoppt_an_umschliessenden_waenden() {
        let mut mask = FogMask::new(Vec2::ZERO, 10.0, 10, 10).expect("gültige Maske");
        let walls = square_room(20.0, 80.0);
        let changed = mask.bucket_fill(Vec2::new(45.0, 45.0), FogMode::Add, &walls);
        assert_eq!(changed, 36);
        assert_eq!(mask.get(2, 2), Some(FogCell::Hidden));
        assert_eq!(mask.get(7, 7), Some(FogCell::Hidden));
        assert_eq!(mask.get(1, 1), Some(FogCell::Revealed));
        assert_eq!(mask.get(8, 4), Some(FogCell::Revealed));
    }

    #[test]
    fn fuellung_ohne_waende_terminiert_am_rand() {
        let mut mask = FogMask::new(Vec2::ZERO, 10.0, 30, 20).expect("gültige Maske");
        let changed = mask.bucket_fill(Vec2::new(5.0, 5.0), FogMode::Add, &[]);
        assert_eq!(changed, 600);
        // Zweiter Durchlauf: Saat hat bereits den Zielzustand
        assert_eq!(mask.bucket_fill(Vec2::new(5.0, 5.0), FogMode::Add, &[]), 0);
    }

    #[test]
    fn fuellung_folgt_nur_gleichem_zustand() {
        let mut mask = FogMask::new(Vec2::ZERO, 10.0, 10, 1).expect("gültige Maske");
        let wall = vec![
            Vec2::new(40.0, -1.0),
            Vec2::new(60.0, -1.0),
            Vec2::new(60.0, 11.0),
            Vec2::new(40.0, 11.0),
        ];
        mask.apply_polygon(&wall, FogMode::Add);
        let changed = mask.bucket_fill(Vec2::new(5.0, 5.0), FogMode::Add, &[]);
        assert_eq!(changed, 4);
        assert_eq!(mask.get(9, 0), Some(FogCell::Revealed));
    }

    #[test]
    fn saat_ausserhalb_ist_noop() {
        let mut mask = FogMask::new(Vec2::ZERO, 10.0, 4, 4).expect("gültige Maske");
        assert_eq!(mask.bucket_fill(Vec2::new(-5.0, 5.0), FogMode::Add, &[]), 0);
        assert_eq!(mask.bucket_fill(Vec2::new(45.0, 5.0), FogMode::Add, &[]), 0);
    }

    #[test]
    fn abdeckung() {
        let mut mask =
            FogMask::covering(Vec2::ZERO, Vec2::new(95.0, 40.0), 10.0).expect("gültige Maske");
        assert_eq!((mask.cols, mask.rows), (10, 4));
        assert_eq!(mask.coverage(), 0.0);
        mask.hide_all();
        assert_eq!(mask.coverage(), 1.0);
        mask.reveal_all();
        assert_eq!(mask.hidden_count(), 0);
    }

    #[test]
    fn uebergrosses_raster_wird_abgelehnt() {
        assert!(FogMask::new(Vec2::ZERO, 10.0, usize::MAX, 2).is_err());
        assert!(FogMask::covering(Vec2::ZERO, Vec2::splat(1.0e9), 1.0).is_err());

        let mut mask = FogMask {
            cols: usize::MAX / 2,
            rows: 3,
            ..FogMask::default()
        };
        assert!(mask.validate().is_err());
        mask.normalize();
        assert_eq!((mask.cols, mask.rows, mask.len()), (0, 0, 0));
    }
}
