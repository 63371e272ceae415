//! Lichtquellen: omnidirektional ("Spot") oder gerichtet mit Öffnungswinkel ("Beam").

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::serde_point;

/// Standard-Rasterskala (Fuß pro Zelle)
pub const DEFAULT_GRID_SCALE: f32 = 5.0;

/// Herkunft einer Lichtquelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LightSourceType {
    #[default]
    Natural,
    Artificial,
    Supernatural,
}

impl LightSourceType {
    /// Palettenfarbe, solange keine explizite Farbe gesetzt ist.
    pub fn default_color(self) -> &'static str {
        match self {
            LightSourceType::Natural => "#FF9900",
            LightSourceType::Artificial => "#FFFFFF",
            LightSourceType::Supernatural => "#9370DB",
        }
    }
}

/// Eine Lichtquelle innerhalb einer Stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSource {
    pub index: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub light_type: LightSourceType,
    #[serde(with = "serde_point")]
    pub position: Vec2,
    /// Reichweite in Rasterzellen
    pub range: f32,
    pub is_on: bool,
    /// Blickrichtung in Grad
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<f32>,
    /// Öffnungswinkel in Grad
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<f32>,
    /// Explizite Farbe; `None` heißt Palettenfarbe des Typs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LightSource {
    /// Gerichtet genau dann, wenn Richtung und Winkel gesetzt sind.
    pub fn is_directional(&self) -> bool {
        is_directional(self.direction, self.arc)
    }

    /// Entfernt halbe Richtungsangaben (nur Richtung oder nur Winkel).
    pub fn normalize_direction(&mut self) {
        if !self.is_directional() {
            self.direction = None;
            self.arc = None;
        }
    }

    pub fn effective_color(&self) -> &str {
        self.color
            .as_deref()
            .unwrap_or_else(|| self.light_type.default_color())
    }

    pub fn effective_range_feet(&self, grid_scale: f32) -> f32 {
        effective_range_feet(self.range, grid_scale)
    }

    pub fn mode_label(&self) -> &'static str {
        if self.is_directional() {
            "Beam"
        } else {
            "Spot"
        }
    }
}

/// Zentrale Ableitung der Gerichtetheit.
pub fn is_directional(direction: Option<f32>, arc: Option<f32>) -> bool {
    direction.is_some() && arc.is_some()
}

/// Reichweite (Zellen) in Fuß.
pub fn effective_range_feet(range_cells: f32, grid_scale: f32) -> f32 {
    range_cells * grid_scale
}

/// Rechnet eine in Fuß eingegebene Reichweite in Zellen zurück.
///
/// Negative oder nicht-endliche Eingaben sowie eine ungültige Skala ergeben `None`.
pub fn range_cells_from_feet(feet: f32, grid_scale: f32) -> Option<f32> {
    if !feet.is_finite() || feet < 0.0 || !grid_scale.is_finite() || grid_scale <= 0.0 {
        return None;
    }
    Some(feet / grid_scale)
}

/// Eigenschaften beim Platzieren einer Lichtquelle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightPlacement {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub light_type: LightSourceType,
    pub range: f32,
    pub is_on: bool,
    pub direction: Option<f32>,
    pub arc: Option<f32>,
    pub color: Option<String>,
}

impl Default for LightPlacement {
    fn default() -> Self {
        Self {
            name: None,
            light_type: LightSourceType::Natural,
            range: 6.0,
            is_on: true,
            direction: None,
            arc: None,
            color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn torch() -> LightSource {
        LightSource {
            index: 0,
            name: "Torch".into(),
            light_type: LightSourceType::Artificial,
            position: Vec2::ZERO,
            range: 4.0,
            is_on: true,
            direction: None,
            arc: None,
            color: None,
        }
    }

    #[test]
    fn reichweite_in_fuss() {
        let light = torch();
        assert_relative_eq!(light.effective_range_feet(DEFAULT_GRID_SCALE), 20.0);
        assert_eq!(range_cells_from_feet(30.0, 5.0), Some(6.0));
        assert_eq!(range_cells_from_feet(-5.0, 5.0), None);
        assert_eq!(range_cells_from_feet(f32::NAN, 5.0), None);
    }

    #[test]
    fn gerichtet_nur_mit_richtung_und_winkel() {
        let mut light = torch();
        light.direction = Some(90.0);
        assert!(!light.is_directional());
        assert_eq!(light.mode_label(), "Spot");
        light.arc = Some(60.0);
        assert!(light.is_directional());
        assert_eq!(light.mode_label(), "Beam");
    }

    #[test]
    fn halbe_richtung_wird_entfernt() {
        let mut light = torch();
        light.arc = Some(45.0);
        light.normalize_direction();
        assert_eq!(light.arc, None);
    }

    #[test]
    fn explizite_farbe_gleich_standard_bleibt_erhalten() {
        let mut light = torch();
        assert_eq!(light.effective_color(), "#FFFFFF");
        light.color = Some("#FFFFFF".into());
        light.light_type = LightSourceType::Natural;
        assert_eq!(light.effective_color(), "#FFFFFF");
        light.color = None;
        assert_eq!(light.effective_color(), "#FF9900");
    }
}
