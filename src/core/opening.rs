//! Öffnungen (Türen, Fenster, Durchgänge), verankert an einer Wandspanne.

use serde::{Deserialize, Serialize};

use super::wall::Wall;

/// Sichtbarkeit einer Öffnung für Spieler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpeningVisibility {
    #[default]
    Visible,
    Secret,
    Concealed,
}

/// Zustand einer Öffnung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpeningState {
    Open,
    #[default]
    Closed,
    Locked,
    Barred,
    Destroyed,
    Jammed,
}

impl OpeningState {
    /// Offene oder zerstörte Öffnungen lassen Bewegung und Sicht durch.
    pub fn is_passable(self) -> bool {
        matches!(self, OpeningState::Open | OpeningState::Destroyed)
    }
}

/// Lichtdurchlässigkeit einer Öffnung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpeningOpacity {
    #[default]
    Opaque,
    Translucent,
    Transparent,
    Ethereal,
}

/// Eine Öffnung innerhalb einer Wand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    pub index: u32,
    pub name: String,
    /// Freitext-Typ ("Door", "Window", ...)
    #[serde(rename = "type")]
    pub opening_type: String,
    /// Breite in Fuß
    pub width: f32,
    /// Höhe in Fuß
    pub height: f32,
    pub wall_index: u32,
    pub start_pole_index: usize,
    pub end_pole_index: usize,
    pub visibility: OpeningVisibility,
    pub state: OpeningState,
    pub opacity: OpeningOpacity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Opening {
    /// Prüft die Pole-Indizes gegen die Trägerwand.
    pub fn validate_against(&self, wall: &Wall) -> anyhow::Result<()> {
        if self.wall_index != wall.index {
            anyhow::bail!(
                "Öffnung {} gehört zu Wand {}, nicht zu Wand {}",
                self.index,
                self.wall_index,
                wall.index
            );
        }
        if self.start_pole_index >= self.end_pole_index {
            anyhow::bail!(
                "Öffnung {}: Start-Pole {} muss vor End-Pole {} liegen",
                self.index,
                self.start_pole_index,
                self.end_pole_index
            );
        }
        if self.end_pole_index > wall.poles.len() {
            anyhow::bail!(
                "Öffnung {}: End-Pole {} außerhalb der Wand ({} Poles)",
                self.index,
                self.end_pole_index,
                wall.poles.len()
            );
        }
        Ok(())
    }

    /// Ob die Öffnung die Spanne `span` überdeckt.
    pub fn covers_span(&self, span: usize) -> bool {
        span >= self.start_pole_index && span < self.end_pole_index
    }
}

/// Eigenschaften beim Platzieren einer Öffnung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningPlacement {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub opening_type: String,
    pub width: f32,
    pub height: f32,
    pub wall_index: u32,
    pub start_pole_index: usize,
    pub end_pole_index: usize,
    pub visibility: OpeningVisibility,
    pub state: OpeningState,
    pub opacity: OpeningOpacity,
    pub material: Option<String>,
    pub color: Option<String>,
}

/// Vordefinierte Öffnungs-Vorlage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningPreset {
    pub name: &'static str,
    pub opening_type: &'static str,
    pub visibility: OpeningVisibility,
    pub state: OpeningState,
    pub opacity: OpeningOpacity,
    pub material: &'static str,
}

pub const DEFAULT_OPENING_WIDTH: f32 = 5.0;
pub const DEFAULT_OPENING_HEIGHT: f32 = 8.0;
pub const DEFAULT_OPENING_COLOR: &str = "#8B4513";

impl OpeningPreset {
    /// Platzierung dieser Vorlage auf der Spanne `start..end` einer Wand.
    pub fn placement(&self, wall_index: u32, start: usize, end: usize) -> OpeningPlacement {
        OpeningPlacement {
            name: None,
            opening_type: self.opening_type.to_string(),
            width: DEFAULT_OPENING_WIDTH,
            height: DEFAULT_OPENING_HEIGHT,
            wall_index,
            start_pole_index: start,
            end_pole_index: end,
            visibility: self.visibility,
            state: self.state,
            opacity: self.opacity,
            material: Some(self.material.to_string()),
            color: Some(DEFAULT_OPENING_COLOR.to_string()),
        }
    }
}

pub const OPENING_PRESETS: [OpeningPreset; 4] = [
    OpeningPreset {
        name: "Door",
        opening_type: "Door",
        visibility: OpeningVisibility::Visible,
        state: OpeningState::Closed,
        opacity: OpeningOpacity::Opaque,
        material: "Wood",
    },
    OpeningPreset {
        name: "Secret Door",
        opening_type: "Door",
        visibility: OpeningVisibility::Secret,
        state: OpeningState::Closed,
        opacity: OpeningOpacity::Opaque,
        material: "Stone",
    },
    OpeningPreset {
        name: "Window",
        opening_type: "Window",
        visibility: OpeningVisibility::Visible,
        state: OpeningState::Closed,
        opacity: OpeningOpacity::Transparent,
        material: "Glass",
    },
    OpeningPreset {
        name: "Archway",
        opening_type: "Archway",
        visibility: OpeningVisibility::Visible,
        state: OpeningState::Open,
        opacity: OpeningOpacity::Transparent,
        material: "Stone",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wall::{Pole, WallVisibility};

    fn wall_with_poles(n: usize) -> Wall {
        Wall {
            index: 7,
            name: "Wall 7".into(),
            poles: (0..n).map(|i| Pole::new(i as f32, 0.0, 10.0)).collect(),
            visibility: WallVisibility::Normal,
            is_closed: false,
            material: None,
            color: None,
            segments: Vec::new(),
        }
    }

    fn opening(start: usize, end: usize) -> Opening {
        let p = OPENING_PRESETS[0].placement(7, start, end);
        Opening {
            index: 1,
            name: "Door 1".into(),
            opening_type: p.opening_type,
            width: p.width,
            height: p.height,
            wall_index: p.wall_index,
            start_pole_index: p.start_pole_index,
            end_pole_index: p.end_pole_index,
            visibility: p.visibility,
            state: p.state,
            opacity: p.opacity,
            material: p.material,
            color: p.color,
        }
    }

    #[test]
    fn spannen_validierung() {
        let wall = wall_with_poles(4);
        assert!(opening(1, 2).validate_against(&wall).is_ok());
        assert!(opening(2, 2).validate_against(&wall).is_err());
        assert!(opening(3, 5).validate_against(&wall).is_err());
    }

    #[test]
    fn ueberdeckte_spannen() {
        let o = opening(1, 3);
        assert!(!o.covers_span(0));
        assert!(o.covers_span(1));
        assert!(o.covers_span(2));
        assert!(!o.covers_span(3));
    }

    #[test]
    fn vorlagen_standardwerte() {
        let p = OPENING_PRESETS[3].placement(0, 0, 1);
        assert_eq!(p.width, 5.0);
        assert_eq!(p.height, 8.0);
        assert!(p.state.is_passable());
        assert_eq!(p.color.as_deref(), Some("#8B4513"));
    }
}
