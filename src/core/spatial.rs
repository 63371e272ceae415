//! Spatial-Index (KD-Tree) über alle Wand-Poles einer Stage.

use glam::Vec2;
use kiddo::{KdTree, SquaredEuclidean};

use super::stage::Stage;

/// Referenz auf einen Pole: (Wand-Index, Pole-Position in der Wand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoleRef {
    pub wall_index: u32,
    pub pole_index: usize,
}

/// Treffer einer Pole-Abfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoleMatch {
    pub pole: PoleRef,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f32,
}

/// Read-only Index; wird nach jeder Wandänderung neu gebaut.
#[derive(Debug, Clone)]
pub struct PoleIndex {
    tree: KdTree<f64, 2>,
    poles: Vec<PoleRef>,
}

impl PoleIndex {
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            poles: Vec::new(),
        }
    }

    /// Baut den Index aus allen Wänden der Stage.
    pub fn from_stage(stage: &Stage) -> Self {
        let mut poles = Vec::new();
        let mut entries: Vec<[f64; 2]> = Vec::new();
        for wall in stage.walls.values() {
            for (pole_index, pole) in wall.poles.iter().enumerate() {
                poles.push(PoleRef {
                    wall_index: wall.index,
                    pole_index,
                });
                entries.push([pole.x as f64, pole.y as f64]);
            }
        }
        let tree: KdTree<f64, 2> = (&entries).into();
        Self { tree, poles }
    }

    pub fn len(&self) -> usize {
        self.poles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poles.is_empty()
    }

    /// Nächster Pole zum Suchpunkt.
    pub fn nearest(&self, query: Vec2) -> Option<PoleMatch> {
        if self.is_empty() {
            return None;
        }
        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x as f64, query.y as f64]);
        let pole = *self.poles.get(result.item as usize)?;
        Some(PoleMatch {
            pole,
            distance: (result.distance as f32).sqrt(),
        })
    }

    /// Nächster Pole innerhalb des Pick-Radius.
    pub fn pick(&self, query: Vec2, radius: f32) -> Option<PoleMatch> {
        self.nearest(query).filter(|m| m.distance <= radius)
    }

    /// Alle Poles im Radius, aufsteigend nach Distanz.
    pub fn within_radius(&self, query: Vec2, radius: f32) -> Vec<PoleMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }
        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x as f64, query.y as f64], (radius * radius) as f64)
            .into_iter()
            .filter_map(|entry| {
                let pole = *self.poles.get(entry.item as usize)?;
                Some(PoleMatch {
                    pole,
                    distance: (entry.distance as f32).sqrt(),
                })
            })
            .collect::<Vec<_>>();
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }
}
