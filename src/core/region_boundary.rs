//! Regionsfüllung: Umriss der von Wänden begrenzten Fläche um einen Klickpunkt.
//!
//! Die Fläche wird auf einem feinen Zellraster geflutet (gleiche Sperrregel wie
//! die Fog-Füllung), danach wird der Rand der gefüllten Zellen zu einem Polygon
//! zusammengesetzt.

use std::collections::{BTreeSet, HashMap};

use glam::Vec2;

use super::flood::{flood_fill, BarrierSet, CellRaster};
use super::fog::MAX_FOG_CELLS;
use super::geometry::{signed_area, LineSegment};
use super::stage::Barrier;

/// Zusätzliche Zellen um Stage und Wände, damit offene Flächen den Rand erreichen.
const PADDING_CELLS: f32 = 5.0;

/// Ergebnis einer Regionsfüllung.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionBoundary {
    /// Keine blockierenden Wände: die Region deckt die ganze Stage ab
    FullStage,
    /// Saat außerhalb des Rasters oder auf dessen Rand
    NotFound,
    Traced(TracedRegion),
}

/// Umriss einer gefüllten Fläche.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedRegion {
    /// Außenumriss; bei `reached_stage_edge` das Stage-Rechteck
    pub outline: Vec<Vec2>,
    /// Vollständig umschlossene, nicht gefüllte Inseln
    pub holes: Vec<Vec<Vec2>>,
    /// Wände, an denen die Füllung endet (aufsteigend)
    pub bounding_walls: Vec<u32>,
    /// Die Füllung ist über die Stage hinaus ausgelaufen
    pub reached_stage_edge: bool,
}

/// Rechteck `(0,0)`–`size` im Uhrzeigersinn (y nach unten).
pub fn stage_rectangle(size: Vec2) -> Vec<Vec2> {
    vec![
        Vec2::ZERO,
        Vec2::new(size.x, 0.0),
        size,
        Vec2::new(0.0, size.y),
    ]
}

/// Ermittelt die von Wänden begrenzte Fläche um `seed`.
///
/// Das Raster umfasst Stage und alle Wände plus einen Rand von fünf Zellen.
/// Wird die Zellanzahl zu groß, wächst die Zellgröße, bis das Raster unter
/// [`MAX_FOG_CELLS`] bleibt.
pub fn trace_region_boundary(
    seed: Vec2,
    barriers: &[Barrier],
    stage_size: Vec2,
    cell_size: f32,
) -> RegionBoundary {
    if barriers.is_empty() {
        return RegionBoundary::FullStage;
    }
    let Some(raster) = fill_raster(barriers, stage_size, cell_size) else {
        return RegionBoundary::NotFound;
    };
    let Some(seed_cell) = raster.cell_at(seed) else {
        return RegionBoundary::NotFound;
    };
    if raster.is_border(seed_cell.0, seed_cell.1) {
        return RegionBoundary::NotFound;
    }

    let lines: Vec<LineSegment> = barriers.iter().map(|b| b.line).collect();
    let blocking = BarrierSet::new(&lines);
    let mut reached_edge = false;
    let reached = flood_fill(&raster, seed_cell, &blocking, |_, (col, row)| {
        if raster.is_border(col, row) {
            reached_edge = true;
            false
        } else {
            true
        }
    });

    let mut filled = vec![false; raster.len()];
    for &(col, row) in &reached {
        filled[row * raster.cols + col] = true;
    }

    let holes = enclosed_holes(&raster, &filled);
    let bounding_walls = bounding_walls(&raster, &filled, barriers);

    let outline = if reached_edge {
        stage_rectangle(stage_size)
    } else {
        let rings = trace_rings(&raster, &reached, |col, row| filled[row * raster.cols + col]);
        match rings
            .into_iter()
            .max_by(|a, b| signed_area(a).abs().total_cmp(&signed_area(b).abs()))
        {
            Some(ring) if ring.len() >= 3 => ring,
            _ => return RegionBoundary::FullStage,
        }
    };

    RegionBoundary::Traced(TracedRegion {
        outline,
        holes,
        bounding_walls,
        reached_stage_edge: reached_edge,
    })
}

/// Raster über Stage und Wände mit Rand.
fn fill_raster(barriers: &[Barrier], stage_size: Vec2, cell_size: f32) -> Option<CellRaster> {
    if !(cell_size > 0.0 && cell_size.is_finite()) || !stage_size.is_finite() {
        return None;
    }
    let (mut lo, mut hi) = (Vec2::ZERO, stage_size.max(Vec2::ZERO));
    for barrier in barriers {
        let (b_lo, b_hi) = barrier.line.bounds();
        lo = lo.min(b_lo);
        hi = hi.max(b_hi);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }

    let extent = hi - lo;
    let needed = ((extent.x as f64 * extent.y as f64) / MAX_FOG_CELLS as f64).sqrt() as f32;
    // 10 % Reserve für Rand und Aufrundung
    let cell_size = cell_size.max(needed * 1.1);
    let padding = cell_size * PADDING_CELLS;
    let cols = ((extent.x + 2.0 * padding) / cell_size).ceil() as usize + 1;
    let rows = ((extent.y + 2.0 * padding) / cell_size).ceil() as usize + 1;
    if cols.checked_mul(rows)? > MAX_FOG_CELLS {
        return None;
    }
    Some(CellRaster {
        origin: lo - padding,
        cell_size,
        cols,
        rows,
    })
}

/// Nicht gefüllte Zusammenhangskomponenten ohne Kontakt zum Rasterrand.
fn enclosed_holes(raster: &CellRaster, filled: &[bool]) -> Vec<Vec<Vec2>> {
    let open = BarrierSet::new(&[]);
    let mut seen = filled.to_vec();
    let mut member = vec![false; raster.len()];
    let mut holes = Vec::new();
    for row in 0..raster.rows {
        for col in 0..raster.cols {
            if seen[row * raster.cols + col] {
                continue;
            }
            let component = flood_fill(raster, (col, row), &open, |j, _| !filled[j]);
            for &(c, r) in &component {
                seen[r * raster.cols + c] = true;
            }
            if component.iter().any(|&(c, r)| raster.is_border(c, r)) {
                continue;
            }
            for &(c, r) in &component {
                member[r * raster.cols + c] = true;
            }
            let ring = trace_rings(raster, &component, |c, r| member[r * raster.cols + c])
                .into_iter()
                .max_by(|a, b| signed_area(a).abs().total_cmp(&signed_area(b).abs()));
            for &(c, r) in &component {
                member[r * raster.cols + c] = false;
            }
            if let Some(ring) = ring {
                holes.push(ring);
            }
        }
    }
    holes
}

/// Wände, entlang derer gefüllte und nicht gefüllte Zellen aneinandergrenzen.
fn bounding_walls(raster: &CellRaster, filled: &[bool], barriers: &[Barrier]) -> Vec<u32> {
    let is_filled = |col: usize, row: usize| {
        raster
            .linear(col, row)
            .map(|i| filled[i])
            .unwrap_or(false)
    };
    let step = raster.cell_size * 0.5;
    let mut walls = BTreeSet::new();
    for barrier in barriers {
        if walls.contains(&barrier.wall_index) {
            continue;
        }
        let LineSegment { start, end } = barrier.line;
        let samples = ((end - start).length() / step).ceil().max(1.0) as usize;
        let touches = (0..=samples).any(|s| {
            let point = start.lerp(end, s as f32 / samples as f32);
            let Some((col, row)) = raster.cell_at(point) else {
                return false;
            };
            let mut any_filled = is_filled(col, row);
            let mut any_open = !any_filled;
            for (n_col, n_row) in raster.neighbors(col, row) {
                if is_filled(n_col, n_row) {
                    any_filled = true;
                } else {
                    any_open = true;
                }
            }
            any_filled && any_open
        });
        if touches {
            walls.insert(barrier.wall_index);
        }
    }
    walls.into_iter().collect()
}

type Corner = (usize, usize);

/// Setzt die Randkanten einer Zellmenge zu geschlossenen Ringen zusammen.
///
/// Jede Zelle trägt ihre freien Seiten im Uhrzeigersinn bei (y nach unten),
/// die Menge liegt damit immer rechts der Kante. An Berührpunkten zweier Ecken
/// wird zuerst rechts abgebogen, so bleiben diagonal verbundene Teile getrennt.
fn trace_rings(
    raster: &CellRaster,
    cells: &[(usize, usize)],
    inside: impl Fn(usize, usize) -> bool,
) -> Vec<Vec<Vec2>> {
    let is_inside = |col: Option<usize>, row: Option<usize>| match (col, row) {
        (Some(c), Some(r)) if c < raster.cols && r < raster.rows => inside(c, r),
        _ => false,
    };

    let mut edges: Vec<(Corner, Corner)> = Vec::new();
    for &(c, r) in cells {
        if !is_inside(Some(c), r.checked_sub(1)) {
            edges.push(((c, r), (c + 1, r)));
        }
        if !is_inside(Some(c + 1), Some(r)) {
            edges.push(((c + 1, r), (c + 1, r + 1)));
        }
        if !is_inside(Some(c), Some(r + 1)) {
            edges.push(((c + 1, r + 1), (c, r + 1)));
        }
        if !is_inside(c.checked_sub(1), Some(r)) {
            edges.push(((c, r + 1), (c, r)));
        }
    }

    let mut outgoing: HashMap<Corner, Vec<usize>> = HashMap::new();
    for (i, (from, _)) in edges.iter().enumerate() {
        outgoing.entry(*from).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        let start = edges[first].0;
        let mut corners = vec![start];
        let mut current = first;
        loop {
            used[current] = true;
            let (from, to) = edges[current];
            if to == start {
                break;
            }
            corners.push(to);
            let direction = step_direction(from, to);
            let next = outgoing.get(&to).and_then(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .filter(|&e| !used[e])
                    .min_by_key(|&e| turn_rank(direction, step_direction(edges[e].0, edges[e].1)))
            });
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
        let corners = drop_straight_corners(&corners);
        if corners.len() >= 3 {
            rings.push(
                corners
                    .into_iter()
                    .map(|(c, r)| raster.origin + Vec2::new(c as f32, r as f32) * raster.cell_size)
                    .collect(),
            );
        }
    }
    rings
}

fn step_direction(from: Corner, to: Corner) -> (i64, i64) {
    (
        to.0 as i64 - from.0 as i64,
        to.1 as i64 - from.1 as i64,
    )
}

/// 0 = rechts, 1 = geradeaus, 2 = links, 3 = zurück (y nach unten).
fn turn_rank(incoming: (i64, i64), outgoing: (i64, i64)) -> u8 {
    let right = (-incoming.1, incoming.0);
    if outgoing == right {
        0
    } else if outgoing == incoming {
        1
    } else if outgoing == (-right.0, -right.1) {
        2
    } else {
        3
    }
}

fn drop_straight_corners(corners: &[Corner]) -> Vec<Corner> {
    let n = corners.len();
    (0..n)
        .filter(|&i| {
            let prev = corners[(i + n - 1) % n];
            let next = corners[(i + 1) % n];
            step_direction(prev, corners[i]) != step_direction(corners[i], next)
        })
        .map(|i| corners[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn room(wall_index: u32, min: Vec2, max: Vec2) -> Vec<Barrier> {
        let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
        (0..4)
            .map(|i| Barrier {
                wall_index,
                line: LineSegment::new(corners[i], corners[(i + 1) % 4]),
            })
            .collect()
    }

    fn traced(boundary: RegionBoundary) -> TracedRegion {
        match boundary {
            RegionBoundary::Traced(region) => region,
            other => panic!("Umriss erwartet, erhalten: {other:?}"),
        }
    }

    #[test]
    fn ohne_waende_ganze_stage() {
        let boundary = trace_region_boundary(Vec2::splat(50.0), &[], Vec2::splat(500.0), 5.0);
        assert_eq!(boundary, RegionBoundary::FullStage);
    }

    #[test]
    fn geschlossener_raum_liefert_seinen_umriss() {
        let walls = room(7, Vec2::new(100.0, 100.0), Vec2::new(300.0, 200.0));
        let region = traced(trace_region_boundary(
            Vec2::new(150.0, 150.0),
            &walls,
            Vec2::new(500.0, 400.0),
            5.0,
        ));
        assert!(!region.reached_stage_edge);
        assert_eq!(region.bounding_walls, vec![7]);
        assert_eq!(region.outline.len(), 4);
        assert!(region.holes.is_empty());
        // Zellränder liegen höchstens eine Zelle von der Wand entfernt
        let area = signed_area(&region.outline).abs();
        assert!(area > 190.0 * 90.0 && area <= 200.0 * 100.0, "Fläche {area}");
        assert!(region
            .outline
            .iter()
            .all(|p| p.x >= 100.0 && p.x <= 300.0 && p.y >= 100.0 && p.y <= 200.0));
    }

    #[test]
    fn offener_raum_laeuft_bis_zum_stagerand() {
        let mut walls = room(3, Vec2::new(100.0, 100.0), Vec2::new(300.0, 200.0));
        walls.remove(2);
        let region = traced(trace_region_boundary(
            Vec2::new(150.0, 150.0),
            &walls,
            Vec2::new(500.0, 400.0),
            5.0,
        ));
        assert!(region.reached_stage_edge);
        assert_eq!(region.outline, stage_rectangle(Vec2::new(500.0, 400.0)));
    }

    #[test]
    fn innerer_raum_wird_zum_loch() {
        let mut walls = room(1, Vec2::new(50.0, 50.0), Vec2::new(450.0, 350.0));
        walls.extend(room(2, Vec2::new(200.0, 150.0), Vec2::new(300.0, 250.0)));
        let region = traced(trace_region_boundary(
            Vec2::new(100.0, 100.0),
            &walls,
            Vec2::new(500.0, 400.0),
            5.0,
        ));
        assert!(!region.reached_stage_edge);
        assert_eq!(region.holes.len(), 1);
        assert_eq!(region.bounding_walls, vec![1, 2]);
        let hole_area = signed_area(&region.holes[0]).abs();
        assert!(hole_area > 90.0 * 90.0 && hole_area < 110.0 * 110.0, "Loch {hole_area}");
    }

    #[test]
    fn saat_ausserhalb_des_rasters() {
        let walls = room(1, Vec2::ZERO, Vec2::splat(100.0));
        let boundary =
            trace_region_boundary(Vec2::splat(-1000.0), &walls, Vec2::splat(100.0), 5.0);
        assert_eq!(boundary, RegionBoundary::NotFound);
    }

    #[test]
    fn riesige_stage_vergroebert_das_raster() {
        let walls = room(1, Vec2::splat(1000.0), Vec2::splat(200_000.0));
        let raster = fill_raster(&walls, Vec2::splat(200_000.0), 5.0).expect("Raster");
        assert!(raster.len() <= MAX_FOG_CELLS);
        assert!(raster.cell_size > 5.0);
        let small = fill_raster(&walls[..1], Vec2::splat(100.0), 5.0).expect("Raster");
        assert_relative_eq!(small.cell_size, 5.0);
    }
}
