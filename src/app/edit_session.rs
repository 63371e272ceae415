//! Vertex-Edit-Session: lokaler Entwurf der Poles einer Wand.
//!
//! Die Session hält den Stand beim Start (`original`) und den aktuellen Entwurf.
//! Erst `commit` überträgt den Entwurf in die Stage; bis dahin bleibt die Stage
//! unverändert.

use glam::Vec2;

use crate::core::{Pole, Wall};

/// Laufende Bearbeitung der Poles einer Wand.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexEditSession {
    pub wall_index: u32,
    original: Wall,
    draft: Wall,
}

impl VertexEditSession {
    /// Startet eine Session auf einer Kopie der Wand.
    pub fn begin(wall: &Wall) -> Self {
        Self {
            wall_index: wall.index,
            original: wall.clone(),
            draft: wall.clone(),
        }
    }

    pub fn original(&self) -> &Wall {
        &self.original
    }

    pub fn draft(&self) -> &Wall {
        &self.draft
    }

    /// Ob sich der Entwurf vom Ausgangsstand unterscheidet.
    pub fn has_changes(&self) -> bool {
        self.original.poles != self.draft.poles || self.original.segments != self.draft.segments
    }

    pub fn move_pole(&mut self, pole_index: usize, position: Vec2) -> bool {
        self.draft.move_pole(pole_index, position)
    }

    /// Fügt einen Pole ein; die Höhe wird vom Vorgänger übernommen.
    pub fn insert_pole(&mut self, at: usize, position: Vec2, default_height: f32) {
        let h = at
            .checked_sub(1)
            .and_then(|i| self.draft.poles.get(i))
            .map_or(default_height, |p| p.h);
        self.draft.insert_pole(at, Pole::at(position, h));
    }

    /// Entfernt einen Pole; mindestens zwei Poles bleiben erhalten.
    pub fn remove_pole(&mut self, at: usize) -> Option<Pole> {
        if self.draft.poles.len() <= 2 {
            return None;
        }
        self.draft.remove_pole(at)
    }

    /// Beendet die Session und liefert den Entwurf.
    pub fn into_draft(self) -> Wall {
        self.draft
    }
}
