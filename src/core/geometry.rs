//! Geometrie-Hilfen: Punkt-in-Polygon, Segment-Schnitt, Bounding-Boxen.

use glam::Vec2;

/// Toleranz für Kollinearitäts-Tests (Pixel-Einheiten).
const COLLINEAR_EPSILON: f32 = 1e-4;

/// Gerichtetes Liniensegment in Pixel-Koordinaten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Startpunkt
    pub start: Vec2,
    /// Endpunkt
    pub end: Vec2,
}

impl LineSegment {
    /// Erstellt ein neues Segment.
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Achsen-alignierte Bounding-Box (min, max).
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.start.min(self.end), self.start.max(self.end))
    }

    /// Prüft ob sich zwei Segmente schneiden (Berührung zählt als Schnitt).
    pub fn intersects(&self, other: &LineSegment) -> bool {
        segments_intersect(self.start, self.end, other.start, other.end)
    }
}

/// Vorzeichen des Kreuzprodukts (b - a) × (c - a) mit Toleranz.
fn orientation(a: Vec2, b: Vec2, c: Vec2) -> i8 {
    let cross = (b - a).perp_dot(c - a);
    if cross.abs() <= COLLINEAR_EPSILON {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

/// Prüft ob `point` auf dem Segment a–b liegt.
pub fn point_on_segment(point: Vec2, a: Vec2, b: Vec2) -> bool {
    let ab = b - a;
    let ap = point - a;
    let cross = ab.perp_dot(ap).abs();
    if cross > COLLINEAR_EPSILON {
        return false;
    }

    let dot = ap.dot(ab);
    if dot < 0.0 {
        return false;
    }

    dot <= ab.length_squared()
}

/// Schnitt-Test für zwei Segmente p1–p2 und q1–q2 (inklusive Endpunkte).
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && point_on_segment(q1, p1, p2))
        || (o2 == 0 && point_on_segment(q2, p1, p2))
        || (o3 == 0 && point_on_segment(p1, q1, q2))
        || (o4 == 0 && point_on_segment(p2, q1, q2))
}

/// Prüft ob ein Punkt innerhalb eines Polygons liegt (Ray-Casting, Rand zählt als innen).
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = last;

    for &current in polygon {
        if point_on_segment(point, previous, current) {
            return true;
        }

        let intersect = ((current.y > point.y) != (previous.y > point.y))
            && (point.x
                < (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y)
                    + current.x);

        if intersect {
            inside = !inside;
        }

        previous = current;
    }

    inside
}

/// Achsen-alignierte Bounding-Box eines Punktzugs. `None` bei leerer Eingabe.
pub fn polygon_bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let (&first, rest) = points.split_first()?;
    Some(
        rest.iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
    )
}

/// Vorzeichenbehaftete Fläche (Shoelace). Positiv bei Gegen-Uhrzeigersinn (y nach oben).
pub fn signed_area(polygon: &[Vec2]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        area += a.perp_dot(b);
    }
    area * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
        ]
    }

    #[test]
    fn point_in_polygon_erkennt_innen_aussen_und_rand() {
        let poly = square(0.0, 10.0);
        assert!(point_in_polygon(Vec2::new(5.0, 5.0), &poly));
        assert!(point_in_polygon(Vec2::new(10.0, 5.0), &poly));
        assert!(!point_in_polygon(Vec2::new(10.5, 5.0), &poly));
        assert!(!point_in_polygon(Vec2::new(-1.0, -1.0), &poly));
    }

    #[test]
    fn degenerate_polygon_enthaelt_nichts() {
        let line = vec![Vec2::ZERO, Vec2::new(10.0, 0.0)];
        assert!(!point_in_polygon(Vec2::new(5.0, 0.0), &line));
        assert!(!point_in_polygon(Vec2::ZERO, &[]));
    }

    #[test]
    fn segments_intersect_kreuzung_und_beruehrung() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
        // T-Berührung am Endpunkt
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(5.0, 5.0),
        ));
        // Parallel, kein Kontakt
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        ));
        // Kollinear, disjunkt
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn bounds_und_flaeche() {
        let poly = square(-2.0, 3.0);
        let (min, max) = polygon_bounds(&poly).unwrap();
        assert_eq!(min, Vec2::new(-2.0, -2.0));
        assert_eq!(max, Vec2::new(3.0, 3.0));
        assert_relative_eq!(signed_area(&poly).abs(), 25.0);
        assert!(polygon_bounds(&[]).is_none());
    }
}
