//! Zusammenführen gleichartiger Regionen.
//!
//! Zwei Regionen gleicher Art (Typ und Wert) verschmelzen, wenn sie eine Kante
//! teilen oder sich flächig überlappen. Die Vereinigung arbeitet auf den
//! Kanten: jede Kante wird an allen Schnittpunkten mit fremden Kanten
//! geteilt, innenliegende Teilkanten fallen weg, der Rest wird zu Ringen
//! verkettet.

use std::collections::HashMap;

use glam::{DVec2, Vec2};

use super::geometry::polygon_bounds;
use super::region::{Region, RegionType};

/// Toleranz für gleiche Punkte und Kollinearität in Pixeln.
const MERGE_TOLERANCE: f64 = 1e-3;

/// Gemeinsame Kante zweier Polygone (Kantenindex i = Punkt i → i+1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedEdge {
    pub first: usize,
    pub second: usize,
    /// Die Kante läuft im zweiten Polygon in Gegenrichtung
    pub reversed: bool,
}

fn points_equal(a: Vec2, b: Vec2) -> bool {
    a.as_dvec2().distance(b.as_dvec2()) <= MERGE_TOLERANCE
}

/// Sucht eine Kante, deren Endpunkte in beiden Polygonen übereinstimmen.
pub fn find_shared_edge(first: &[Vec2], second: &[Vec2]) -> Option<SharedEdge> {
    for i in 0..first.len() {
        let (a1, a2) = (first[i], first[(i + 1) % first.len()]);
        for j in 0..second.len() {
            let (b1, b2) = (second[j], second[(j + 1) % second.len()]);
            if points_equal(a1, b1) && points_equal(a2, b2) {
                return Some(SharedEdge {
                    first: i,
                    second: j,
                    reversed: false,
                });
            }
            if points_equal(a1, b2) && points_equal(a2, b1) {
                return Some(SharedEdge {
                    first: i,
                    second: j,
                    reversed: true,
                });
            }
        }
    }
    None
}

/// Überlappen sich zwei Polygone mit positiver Fläche?
///
/// Reine Berührung an Kanten oder Ecken zählt nicht als Überlappung.
pub fn polygons_overlap(first: &[Vec2], second: &[Vec2]) -> bool {
    let (Some((a_lo, a_hi)), Some((b_lo, b_hi))) = (polygon_bounds(first), polygon_bounds(second))
    else {
        return false;
    };
    if a_lo.x > b_hi.x || b_lo.x > a_hi.x || a_lo.y > b_hi.y || b_lo.y > a_hi.y {
        return false;
    }
    let (Some(a), Some(b)) = (prepare(first), prepare(second)) else {
        return false;
    };
    let separate = ring_area(&a) + ring_area(&b);
    let united: f64 = union_rings(&[a, b]).iter().map(|r| ring_area(r)).sum();
    separate - united > 1e-6 * separate.max(1.0)
}

/// Regionen, mit denen ein neues Polygon gleicher Art verschmelzen würde.
///
/// Ergebnis aufsteigend nach Index.
pub fn find_mergeable_regions<'a>(
    regions: impl IntoIterator<Item = &'a Region>,
    vertices: &[Vec2],
    region_type: RegionType,
    value: i32,
) -> Vec<&'a Region> {
    let mut mergeable: Vec<&Region> = regions
        .into_iter()
        .filter(|r| r.region_type == region_type && r.value == value)
        .filter(|r| {
            find_shared_edge(&r.vertices, vertices).is_some()
                || polygons_overlap(&r.vertices, vertices)
        })
        .collect();
    mergeable.sort_by_key(|r| r.index);
    mergeable
}

/// Vereinigt Polygone und liefert den Außenumriss der größten Teilfläche.
///
/// Innenliegende Löcher gehen verloren. Bei entarteter Eingabe bleibt das
/// erste Polygon unverändert.
pub fn merge_polygons(polygons: &[Vec<Vec2>]) -> Vec<Vec2> {
    match polygons {
        [] => return Vec::new(),
        [single] => return single.clone(),
        _ => {}
    }
    let prepared: Vec<Vec<DVec2>> = polygons.iter().filter_map(|p| prepare(p)).collect();
    let outer = union_rings(&prepared)
        .into_iter()
        .filter(|ring| ring_area(ring) > 0.0)
        .max_by(|a, b| ring_area(a).total_cmp(&ring_area(b)));
    match outer {
        Some(ring) => ring.into_iter().map(|p| p.as_vec2()).collect(),
        None => polygons[0].clone(),
    }
}

/// Bereinigt ein Polygon und richtet es gegen den Uhrzeigersinn aus (positive Fläche).
fn prepare(polygon: &[Vec2]) -> Option<Vec<DVec2>> {
    let ring = clean_ring(polygon.iter().map(|p| p.as_dvec2()).collect());
    let area = ring_area(&ring);
    if ring.len() < 3 || area.abs() <= MERGE_TOLERANCE {
        return None;
    }
    Some(if area < 0.0 {
        ring.into_iter().rev().collect()
    } else {
        ring
    })
}

fn ring_area(ring: &[DVec2]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    (0..n).map(|i| ring[i].perp_dot(ring[(i + 1) % n])).sum::<f64>() * 0.5
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Strenger Inneren-Test (Ray-Casting); Randpunkte prüft der Aufrufer vorher.
fn strictly_inside(p: DVec2, ring: &[DVec2]) -> bool {
    let mut inside = false;
    let mut previous = ring[ring.len() - 1];
    for &current in ring {
        if (current.y > p.y) != (previous.y > p.y) {
            let x = (previous.x - current.x) * (p.y - current.y) / (previous.y - current.y)
                + current.x;
            if p.x < x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    polygon: usize,
    a: DVec2,
    b: DVec2,
}

/// Gemeinsame Punkte zweier Kanten: Schnittpunkt oder Überlappungsenden.
fn contact_points(e: &Edge, f: &Edge) -> Vec<DVec2> {
    let r = e.b - e.a;
    let s = f.b - f.a;
    let (r_len, s_len) = (r.length(), s.length());
    if r_len == 0.0 || s_len == 0.0 {
        return Vec::new();
    }
    let denom = r.perp_dot(s);
    if denom.abs() > 1e-12 * r_len * s_len {
        let t = (f.a - e.a).perp_dot(s) / denom;
        let u = (f.a - e.a).perp_dot(r) / denom;
        let (t_tol, u_tol) = (MERGE_TOLERANCE / r_len, MERGE_TOLERANCE / s_len);
        if t < -t_tol || t > 1.0 + t_tol || u < -u_tol || u > 1.0 + u_tol {
            return Vec::new();
        }
        let hit = e.a + r * t;
        // Endpunkte exakt übernehmen, damit Teilkanten bitgleich zusammenpassen
        let exact = [e.a, e.b, f.a, f.b]
            .into_iter()
            .find(|p| p.distance(hit) <= MERGE_TOLERANCE)
            .unwrap_or(hit);
        return vec![exact];
    }
    if distance_to_segment(f.a, e.a, e.b) > MERGE_TOLERANCE
        && distance_to_segment(f.b, e.a, e.b) > MERGE_TOLERANCE
        && distance_to_segment(e.a, f.a, f.b) > MERGE_TOLERANCE
    {
        return Vec::new();
    }
    let mut points = Vec::new();
    for p in [f.a, f.b] {
        if distance_to_segment(p, e.a, e.b) <= MERGE_TOLERANCE {
            points.push(p);
        }
    }
    for p in [e.a, e.b] {
        if distance_to_segment(p, f.a, f.b) <= MERGE_TOLERANCE {
            points.push(p);
        }
    }
    points
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryContact {
    Same,
    Opposite,
}

/// Liegt `mid` auf dem Rand von `ring`? Dann mit der Laufrichtung der Randkante.
fn boundary_contact(mid: DVec2, direction: DVec2, ring: &[DVec2]) -> Option<BoundaryContact> {
    let n = ring.len();
    (0..n).find_map(|i| {
        let (c, d) = (ring[i], ring[(i + 1) % n]);
        (distance_to_segment(mid, c, d) <= MERGE_TOLERANCE).then(|| {
            if direction.dot(d - c) > 0.0 {
                BoundaryContact::Same
            } else {
                BoundaryContact::Opposite
            }
        })
    })
}

type PointKey = (i64, i64);

fn point_key(p: DVec2) -> PointKey {
    (
        (p.x / MERGE_TOLERANCE).round() as i64,
        (p.y / MERGE_TOLERANCE).round() as i64,
    )
}

/// Randringe der Vereinigung gegen den Uhrzeigersinn ausgerichteter Polygone.
///
/// Außenringe haben positive, Lochringe negative Fläche.
fn union_rings(polygons: &[Vec<DVec2>]) -> Vec<Vec<DVec2>> {
    let edges: Vec<Edge> = polygons
        .iter()
        .enumerate()
        .flat_map(|(polygon, ring)| {
            let n = ring.len();
            (0..n).map(move |i| Edge {
                polygon,
                a: ring[i],
                b: ring[(i + 1) % n],
            })
        })
        .collect();

    let mut splits: Vec<Vec<DVec2>> = edges.iter().map(|e| vec![e.a, e.b]).collect();
    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            if edges[i].polygon == edges[j].polygon {
                continue;
            }
            for point in contact_points(&edges[i], &edges[j]) {
                splits[i].push(point);
                splits[j].push(point);
            }
        }
    }

    let mut kept: Vec<(DVec2, DVec2)> = Vec::new();
    for (edge, points) in edges.iter().zip(splits.iter_mut()) {
        let direction = edge.b - edge.a;
        points.sort_by(|p, q| {
            (*p - edge.a)
                .dot(direction)
                .total_cmp(&(*q - edge.a).dot(direction))
        });
        points.dedup_by(|p, q| p.distance(*q) <= MERGE_TOLERANCE);

        for pair in points.windows(2) {
            let (p, q) = (pair[0], pair[1]);
            let mid = (p + q) * 0.5;
            let keep = polygons.iter().enumerate().all(|(other, ring)| {
                if other == edge.polygon {
                    return true;
                }
                match boundary_contact(mid, q - p, ring) {
                    Some(BoundaryContact::Same) => edge.polygon < other,
                    Some(BoundaryContact::Opposite) => false,
                    None => !strictly_inside(mid, ring),
                }
            });
            if keep {
                kept.push((p, q));
            }
        }
    }

    stitch_rings(&kept)
}

/// Verkettet gerichtete Kanten zu geschlossenen Ringen.
///
/// An Verzweigungen wird die Kante mit der stärksten Linksdrehung gewählt, so
/// bleiben Flächen, die sich nur in einer Ecke berühren, getrennte Ringe.
/// Offene Ketten werden verworfen.
fn stitch_rings(edges: &[(DVec2, DVec2)]) -> Vec<Vec<DVec2>> {
    let mut outgoing: HashMap<PointKey, Vec<usize>> = HashMap::new();
    for (i, (from, _)) in edges.iter().enumerate() {
        outgoing.entry(point_key(*from)).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        let start = point_key(edges[first].0);
        let mut ring = vec![edges[first].0];
        let mut current = first;
        let closed = loop {
            used[current] = true;
            let (from, to) = edges[current];
            if point_key(to) == start {
                break true;
            }
            ring.push(to);
            let incoming = to - from;
            let next = outgoing.get(&point_key(to)).and_then(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .filter(|&e| !used[e])
                    .max_by(|&x, &y| {
                        turn_angle(incoming, edges[x].1 - edges[x].0)
                            .total_cmp(&turn_angle(incoming, edges[y].1 - edges[y].0))
                    })
            });
            match next {
                Some(next) => current = next,
                None => break false,
            }
        };
        if closed {
            let ring = clean_ring(ring);
            if ring.len() >= 3 {
                rings.push(ring);
            }
        }
    }
    rings
}

/// Vorzeichenbehafteter Drehwinkel von `incoming` nach `outgoing` (positiv = links).
fn turn_angle(incoming: DVec2, outgoing: DVec2) -> f64 {
    incoming.perp_dot(outgoing).atan2(incoming.dot(outgoing))
}

/// Entfernt doppelte und kollineare Eckpunkte eines geschlossenen Rings.
fn clean_ring(mut ring: Vec<DVec2>) -> Vec<DVec2> {
    loop {
        let n = ring.len();
        if n < 3 {
            return ring;
        }
        let redundant = (0..n).find(|&i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let current = ring[i];
            current.distance(prev) <= MERGE_TOLERANCE
                || (distance_to_segment(current, prev, next) <= MERGE_TOLERANCE
                    && (current - prev).dot(next - current) >= 0.0)
        });
        match redundant {
            Some(i) => {
                ring.remove(i);
            }
            None => return ring,
        }
    }
}
