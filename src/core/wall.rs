//! Wände: Pole-Polylinien mit typisierten Abschnitten.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::LineSegment;
use super::segment::{Segment, SegmentState, SegmentType};

/// Wandpunkt mit Höhe (in Fuß)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pole {
    pub x: f32,
    pub y: f32,
    pub h: f32,
}

impl Pole {
    pub fn new(x: f32, y: f32, h: f32) -> Self {
        Self { x, y, h }
    }

    /// Erstellt einen Pole an einer Pixelposition.
    pub fn at(position: Vec2, h: f32) -> Self {
        Self::new(position.x, position.y, h)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Sichtbarkeit einer Wand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WallVisibility {
    #[default]
    Normal,
    Fence,
    Invisible,
    Veil,
}

impl WallVisibility {
    /// Persistierter Zahlencode
    pub fn code(self) -> u8 {
        match self {
            WallVisibility::Normal => 0,
            WallVisibility::Fence => 1,
            WallVisibility::Invisible => 2,
            WallVisibility::Veil => 3,
        }
    }

    /// Unsichtbare Wände stoppen weder Sicht noch Fog-Füllung.
    pub fn blocks(self) -> bool {
        self != WallVisibility::Invisible
    }
}

/// Eine Wand innerhalb einer Stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub index: u32,
    pub name: String,
    pub poles: Vec<Pole>,
    pub visibility: WallVisibility,
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Explizit typisierte Abschnitte; fehlende Spannen gelten als sichtbare Wand.
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Wall {
    /// Anzahl der Spannen (inkl. Schluss-Spanne bei geschlossenen Wänden).
    pub fn span_count(&self) -> usize {
        let n = self.poles.len();
        if n < 2 {
            0
        } else if self.is_closed && n >= 3 {
            n
        } else {
            n - 1
        }
    }

    /// Endpunkte einer Spanne.
    pub fn span(&self, span: usize) -> Option<LineSegment> {
        if span >= self.span_count() {
            return None;
        }
        let a = self.poles.get(span)?;
        let b = self.poles.get((span + 1) % self.poles.len())?;
        Some(LineSegment::new(a.position(), b.position()))
    }

    /// Alle Spannen in Reihenfolge.
    pub fn spans(&self) -> impl Iterator<Item = (usize, LineSegment)> + '_ {
        (0..self.span_count()).filter_map(|i| self.span(i).map(|line| (i, line)))
    }

    /// Abschnitt einer Spanne; ohne Eintrag eine sichtbare Wand.
    pub fn segment_at(&self, span: usize) -> Segment {
        self.segments
            .iter()
            .find(|s| s.index == span)
            .copied()
            .unwrap_or_else(|| Segment::new(span, SegmentType::Wall, SegmentState::Visible))
    }

    fn segment_mut(&mut self, span: usize) -> &mut Segment {
        let pos = match self.segments.iter().position(|s| s.index == span) {
            Some(pos) => pos,
            None => {
                self.segments.push(Segment::with_type(span, SegmentType::Wall));
                self.segments.len() - 1
            }
        };
        &mut self.segments[pos]
    }

    /// Setzt den Typ einer Spanne (Zustand wird normalisiert).
    ///
    /// Gibt `false` zurück, wenn die Spanne nicht existiert.
    pub fn set_segment_type(&mut self, span: usize, segment_type: SegmentType) -> bool {
        if span >= self.span_count() {
            return false;
        }
        self.segment_mut(span).set_type(segment_type);
        self.sort_segments();
        true
    }

    /// Setzt den Zustand einer Spanne (ungültige Werte fallen auf den Standard).
    pub fn set_segment_state(&mut self, span: usize, state: SegmentState) -> bool {
        if span >= self.span_count() {
            return false;
        }
        self.segment_mut(span).set_state(state);
        self.sort_segments();
        true
    }

    fn sort_segments(&mut self) {
        self.segments.sort_by_key(|s| s.index);
    }

    /// Normalisiert alle Abschnitte und verwirft solche ohne gültige Spanne.
    pub fn normalize_segments(&mut self) {
        let span_count = self.span_count();
        self.segments.retain(|s| s.index < span_count);
        for segment in &mut self.segments {
            *segment = segment.normalized();
        }
        self.sort_segments();
        self.segments.dedup_by_key(|s| s.index);
    }

    /// Fügt einen Pole an Position `at` ein; die geteilte Spanne vererbt ihren Abschnitt.
    pub fn insert_pole(&mut self, at: usize, pole: Pole) {
        let at = at.min(self.poles.len());
        let split = at.checked_sub(1);
        let mut inherited = None;
        for segment in &mut self.segments {
            if Some(segment.index) == split {
                inherited = Some(segment.segment_type);
            }
            if segment.index >= at {
                segment.index += 1;
            }
        }
        self.poles.insert(at, pole);
        if let (Some(split), Some(segment_type)) = (split, inherited) {
            let original = self.segment_at(split);
            self.segments.push(Segment::new(at, segment_type, original.state));
        }
        self.normalize_segments();
    }

    /// Entfernt den Pole `at`; die angrenzenden Abschnitte entfallen.
    pub fn remove_pole(&mut self, at: usize) -> Option<Pole> {
        if at >= self.poles.len() {
            return None;
        }
        let previous = match at.checked_sub(1) {
            None if self.is_closed => self.span_count().checked_sub(1),
            other => other,
        };
        let removed = self.poles.remove(at);
        self.segments
            .retain(|s| s.index != at && Some(s.index) != previous);
        for segment in &mut self.segments {
            if segment.index > at {
                segment.index -= 1;
            }
        }
        self.normalize_segments();
        Some(removed)
    }

    /// Verschiebt einen Pole.
    pub fn move_pole(&mut self, at: usize, position: Vec2) -> bool {
        match self.poles.get_mut(at) {
            Some(pole) => {
                pole.x = position.x;
                pole.y = position.y;
                true
            }
            None => false,
        }
    }
}

/// Eigenschaften beim Platzieren einer neuen Wand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WallPlacement {
    pub name: Option<String>,
    pub visibility: WallVisibility,
    pub is_closed: bool,
    pub material: Option<String>,
    pub default_height: f32,
    pub color: Option<String>,
}

impl Default for WallPlacement {
    fn default() -> Self {
        Self {
            name: None,
            visibility: WallVisibility::Normal,
            is_closed: false,
            material: Some("Stone".to_string()),
            default_height: 10.0,
            color: Some("#808080".to_string()),
        }
    }
}

/// Vordefinierte Wand-Vorlage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPreset {
    pub name: &'static str,
    pub visibility: WallVisibility,
    pub is_closed: bool,
    pub material: &'static str,
}

impl WallPreset {
    /// Erstellt Platzierungs-Eigenschaften aus der Vorlage.
    pub fn placement(&self, default_height: f32, color: &str) -> WallPlacement {
        WallPlacement {
            name: None,
            visibility: self.visibility,
            is_closed: self.is_closed,
            material: Some(self.material.to_string()),
            default_height,
            color: Some(color.to_string()),
        }
    }
}

/// Standard-Vorlagen für Wände.
pub const WALL_PRESETS: [WallPreset; 4] = [
    WallPreset {
        name: "Normal",
        visibility: WallVisibility::Normal,
        is_closed: false,
        material: "Stone",
    },
    WallPreset {
        name: "Fence",
        visibility: WallVisibility::Fence,
        is_closed: false,
        material: "Wood",
    },
    WallPreset {
        name: "Invisible",
        visibility: WallVisibility::Invisible,
        is_closed: false,
        material: "Magic",
    },
    WallPreset {
        name: "Veil",
        visibility: WallVisibility::Veil,
        is_closed: false,
        material: "Fabric",
    },
];
