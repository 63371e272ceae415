//! Geräuschquellen (analog zu Lichtquellen, ohne Richtung).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::light::effective_range_feet;
use super::serde_point;

/// Eine Geräuschquelle innerhalb einer Stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSource {
    pub index: u32,
    pub name: String,
    /// Referenz auf das Audio-Asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(with = "serde_point")]
    pub position: Vec2,
    /// Radius in Rasterzellen
    pub radius: f32,
    pub is_playing: bool,
}

impl SoundSource {
    pub fn effective_radius_feet(&self, grid_scale: f32) -> f32 {
        effective_range_feet(self.radius, grid_scale)
    }
}

/// Eigenschaften beim Platzieren einer Geräuschquelle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SoundPlacement {
    pub name: Option<String>,
    pub resource_id: Option<String>,
    pub radius: f32,
    pub is_playing: bool,
}

impl Default for SoundPlacement {
    fn default() -> Self {
        Self {
            name: None,
            resource_id: None,
            radius: 4.0,
            is_playing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn radius_in_fuss() {
        let sound = SoundSource {
            index: 2,
            name: "Brook".into(),
            resource_id: Some("res-1".into()),
            position: Vec2::new(50.0, 50.0),
            radius: 3.0,
            is_playing: true,
        };
        assert_relative_eq!(sound.effective_radius_feet(5.0), 15.0);
    }
}
