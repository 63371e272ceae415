//! Barrierenbewusste Flutfüllung über ein achsenparalleles Zellraster.
//!
//! Gemeinsame Grundlage für die Fog-Füllung und die Regionsfüllung an Wänden.

use std::collections::VecDeque;

use glam::Vec2;

use super::geometry::LineSegment;

/// Zellraster in Pixelkoordinaten: Zelle (col, row) beginnt bei
/// `origin + (col, row) * cell_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRaster {
    pub origin: Vec2,
    pub cell_size: f32,
    pub cols: usize,
    pub rows: usize,
}

impl CellRaster {
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    /// Linearer Index einer Zelle (`None` außerhalb).
    pub fn linear(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    /// Pixel-Mittelpunkt einer Zelle.
    pub fn cell_center(&self, col: usize, row: usize) -> Vec2 {
        self.origin + (Vec2::new(col as f32, row as f32) + 0.5) * self.cell_size
    }

    /// Zelle unter einem Pixelpunkt.
    pub fn cell_at(&self, point: Vec2) -> Option<(usize, usize)> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let local = (point - self.origin) / self.cell_size;
        if !local.x.is_finite() || !local.y.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (col, row) = (local.x.floor() as usize, local.y.floor() as usize);
        self.linear(col, row).map(|_| (col, row))
    }

    /// Liegt die Zelle in der äußersten Zeile oder Spalte?
    pub fn is_border(&self, col: usize, row: usize) -> bool {
        col == 0 || row == 0 || col + 1 == self.cols || row + 1 == self.rows
    }

    /// 4-Nachbarn innerhalb des Rasters.
    pub fn neighbors(&self, col: usize, row: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        [
            (col.checked_sub(1), Some(row)),
            (Some(col + 1), Some(row)),
            (Some(col), row.checked_sub(1)),
            (Some(col), Some(row + 1)),
        ]
        .into_iter()
        .filter_map(move |(c, r)| {
            let (c, r) = (c?, r?);
            self.linear(c, r).map(|_| (c, r))
        })
    }
}

/// Blockierende Linien mit vorberechneten Bounding-Boxen.
pub struct BarrierSet<'a> {
    lines: &'a [LineSegment],
    boxes: Vec<(Vec2, Vec2)>,
}

impl<'a> BarrierSet<'a> {
    pub fn new(lines: &'a [LineSegment]) -> Self {
        Self {
            lines,
            boxes: lines.iter().map(LineSegment::bounds).collect(),
        }
    }

    /// Schneidet die Verbindung `from`–`to` eine Barriere?
    pub fn blocks(&self, from: Vec2, to: Vec2) -> bool {
        let step = LineSegment::new(from, to);
        let (lo, hi) = step.bounds();
        self.lines
            .iter()
            .zip(&self.boxes)
            .any(|(barrier, (b_lo, b_hi))| {
                b_lo.x <= hi.x
                    && b_hi.x >= lo.x
                    && b_lo.y <= hi.y
                    && b_hi.y >= lo.y
                    && barrier.intersects(&step)
            })
    }
}

/// Breitensuche ab `seed` über 4-Nachbarn.
///
/// Ein Übergang ist gesperrt, wenn die Verbindung der Zellmittelpunkte eine
/// Barriere schneidet. `accept` entscheidet für jede erreichte Nachbarzelle
/// (linearer Index, Koordinate), ob sie betreten wird. Die Saat selbst wird
/// immer betreten. Liefert die besuchten Zellen in Besuchsreihenfolge.
pub fn flood_fill(
    raster: &CellRaster,
    seed: (usize, usize),
    barriers: &BarrierSet<'_>,
    mut accept: impl FnMut(usize, (usize, usize)) -> bool,
) -> Vec<(usize, usize)> {
    let Some(seed_index) = raster.linear(seed.0, seed.1) else {
        return Vec::new();
    };
    let mut visited = vec![false; raster.len()];
    let mut queue = VecDeque::new();
    let mut reached = Vec::new();
    visited[seed_index] = true;
    queue.push_back(seed);

    while let Some((col, row)) = queue.pop_front() {
        reached.push((col, row));
        let here = raster.cell_center(col, row);
        for (n_col, n_row) in raster.neighbors(col, row) {
            let i = n_row * raster.cols + n_col;
            if visited[i] {
                continue;
            }
            if barriers.blocks(here, raster.cell_center(n_col, n_row)) {
                continue;
            }
            if !accept(i, (n_col, n_row)) {
                continue;
            }
            visited[i] = true;
            queue.push_back((n_col, n_row));
        }
    }
    reached
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(cols: usize, rows: usize) -> CellRaster {
        CellRaster {
            origin: Vec2::ZERO,
            cell_size: 10.0,
            cols,
            rows,
        }
    }

    #[test]
    fn wand_teilt_das_raster() {
        let raster = raster(6, 4);
        let wall = [LineSegment::new(Vec2::new(30.0, -5.0), Vec2::new(30.0, 45.0))];
        let barriers = BarrierSet::new(&wall);
        let reached = flood_fill(&raster, (0, 0), &barriers, |_, _| true);
        assert_eq!(reached.len(), 12);
        assert!(reached.iter().all(|(col, _)| *col < 3));
    }

    #[test]
    fn abgelehnte_zellen_werden_nicht_betreten() {
        let raster = raster(5, 1);
        let barriers = BarrierSet::new(&[]);
        let reached = flood_fill(&raster, (0, 0), &barriers, |_, (col, _)| col != 3);
        assert_eq!(reached, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn randzellen_und_nachbarn() {
        let raster = raster(3, 3);
        assert!(raster.is_border(0, 1));
        assert!(raster.is_border(2, 2));
        assert!(!raster.is_border(1, 1));
        assert_eq!(raster.neighbors(0, 0).count(), 2);
        assert_eq!(raster.neighbors(1, 1).count(), 4);
        assert_eq!(raster.cell_at(Vec2::new(25.0, 5.0)), Some((2, 0)));
        assert_eq!(raster.cell_at(Vec2::new(35.0, 5.0)), None);
    }
}
