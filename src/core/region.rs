//! Regionen: typisierte Polygone (Höhe, Gelände, Beleuchtung) und deren Darstellungsregeln.
//!
//! Überlappungen werden nie geometrisch aufgelöst. Reihenfolge und Farbe hängen
//! ausschließlich von Typ, Index und Wert ab, damit alle Clients dieselbe
//! Darstellung erhalten.

use std::sync::LazyLock;

use glam::Vec2;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::color::{parse_hex_color, shade};
use super::serde_point;

/// Art einer Region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RegionType {
    #[default]
    Elevation,
    Terrain,
    Illumination,
}

impl RegionType {
    pub const ALL: [RegionType; 3] = [
        RegionType::Elevation,
        RegionType::Terrain,
        RegionType::Illumination,
    ];

    /// Feste Zeichenreihenfolge (niedrig zuerst). Darf sich nie ändern.
    pub fn precedence(self) -> u8 {
        match self {
            RegionType::Elevation => 0,
            RegionType::Terrain => 1,
            RegionType::Illumination => 2,
        }
    }

    /// Palettenanker des Typs
    pub fn anchor_color(self) -> &'static str {
        match self {
            RegionType::Elevation => "#ed6c02",
            RegionType::Terrain => "#4caf50",
            RegionType::Illumination => "#ffc107",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RegionType::Elevation => "Elevation",
            RegionType::Terrain => "Terrain",
            RegionType::Illumination => "Illumination",
        }
    }
}

/// Wert mit Anzeigename aus einer Wertetabelle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionValue {
    pub value: i32,
    pub label: &'static str,
}

const TERRAIN_VALUES: &[RegionValue] = &[
    RegionValue {
        value: 0,
        label: "Normal",
    },
    RegionValue {
        value: 1,
        label: "Difficult",
    },
    RegionValue {
        value: 2,
        label: "Impassable",
    },
];

const ILLUMINATION_VALUES: &[RegionValue] = &[
    RegionValue {
        value: -2,
        label: "Darkness",
    },
    RegionValue {
        value: -1,
        label: "Dim",
    },
    RegionValue {
        value: 0,
        label: "Normal",
    },
    RegionValue {
        value: 1,
        label: "Bright",
    },
];

pub const TERRAIN_DIFFICULT: i32 = 1;
pub const TERRAIN_IMPASSABLE: i32 = 2;
pub const ILLUMINATION_DARKNESS: i32 = -2;
pub const ILLUMINATION_DIM: i32 = -1;
pub const ILLUMINATION_BRIGHT: i32 = 1;

/// Aufzählbare Werte eines Typs; Elevation ist frei und liefert eine leere Tabelle.
pub fn valid_values_for_type(region_type: RegionType) -> &'static [RegionValue] {
    match region_type {
        RegionType::Elevation => &[],
        RegionType::Terrain => TERRAIN_VALUES,
        RegionType::Illumination => ILLUMINATION_VALUES,
    }
}

/// Standardwert eines Typs (immer der neutrale Wert).
pub fn default_value_for_type(_region_type: RegionType) -> i32 {
    0
}

/// Eine Region innerhalb einer Stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub index: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub region_type: RegionType,
    #[serde(with = "serde_point::vec")]
    pub vertices: Vec<Vec2>,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Region {
    /// Wechselt den Typ; der Wert wird immer auf den Standard des neuen Typs gesetzt.
    pub fn set_type(&mut self, region_type: RegionType) {
        self.region_type = region_type;
        self.value = default_value_for_type(region_type);
    }
}

/// Eigenschaften beim Platzieren einer Region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegionPlacement {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub region_type: RegionType,
    /// Startwert; ohne Angabe der Standard des Typs
    pub value: Option<i32>,
    pub color: Option<String>,
}

/// Ob `value` für den Typ zulässig ist (Elevation: jeder Wert).
pub fn is_valid_value(region_type: RegionType, value: i32) -> bool {
    let table = valid_values_for_type(region_type);
    table.is_empty() || table.iter().any(|v| v.value == value)
}

/// Sortiert Regionen deterministisch nach (Typ-Rang, Index).
pub fn sort_regions(regions: &[Region]) -> Vec<&Region> {
    let mut ordered: Vec<&Region> = regions.iter().collect();
    ordered.sort_by_key(|r| (r.region_type.precedence(), r.index));
    ordered
}

/// Anzeigename des Regionswerts.
pub fn display_label(region: &Region) -> String {
    match region.region_type {
        RegionType::Elevation if region.value == 0 => "0 ft".to_string(),
        RegionType::Elevation => format!("{:+} ft", region.value),
        other => valid_values_for_type(other)
            .iter()
            .find(|v| v.value == region.value)
            .map(|v| v.label.to_string())
            .unwrap_or_else(|| region.value.to_string()),
    }
}

/// Füll-Deckkraft einer Region (0.0 = unsichtbar).
pub fn fill_opacity(region: &Region) -> f32 {
    match region.region_type {
        RegionType::Elevation => {
            if region.value == 0 {
                0.0
            } else {
                0.15 + 0.35 * (region.value.unsigned_abs() as f32 / 30.0).min(1.0)
            }
        }
        RegionType::Terrain => match region.value {
            0 => 0.0,
            TERRAIN_DIFFICULT => 0.3,
            TERRAIN_IMPASSABLE => 0.5,
            _ => 0.3,
        },
        RegionType::Illumination => match region.value {
            ILLUMINATION_DARKNESS => 0.8,
            ILLUMINATION_DIM => 0.5,
            0 => 0.0,
            ILLUMINATION_BRIGHT => 0.3,
            _ => 0.3,
        },
    }
}

/// Aufgelöste Darstellungsfarbe einer Region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionColor {
    Transparent,
    /// RGBA, Komponenten in 0.0..=1.0
    Fill([f32; 4]),
}

impl RegionColor {
    pub fn is_transparent(&self) -> bool {
        matches!(self, RegionColor::Transparent)
    }
}

/// Ermittelt die Füllfarbe einer Region im Kontext aller Regionen der Stage.
///
/// Höhen werden relativ zu den übrigen Höhenregionen schattiert (höher = heller).
pub fn color_of(region: &Region, all: &[Region]) -> RegionColor {
    let opacity = fill_opacity(region);
    if (opacity * 100.0).round() == 0.0 {
        return RegionColor::Transparent;
    }

    let anchor = region
        .color
        .as_deref()
        .and_then(parse_hex_color)
        .or_else(|| parse_hex_color(region.region_type.anchor_color()))
        .unwrap_or([0.5, 0.5, 0.5]);

    let rgb = match region.region_type {
        RegionType::Elevation => {
            let (min, max) = elevation_range(all).unwrap_or((region.value, region.value));
            // i64: Höhen sind freie Werte, die Differenz passt nicht immer in i32
            let t = if max > min {
                let offset = i64::from(region.value) - i64::from(min);
                let span = i64::from(max) - i64::from(min);
                (offset as f64 / span as f64) as f32
            } else {
                1.0
            };
            shade(anchor, 0.5 + 0.5 * t.clamp(0.0, 1.0))
        }
        RegionType::Illumination
            if region.value == ILLUMINATION_DARKNESS || region.value == ILLUMINATION_DIM =>
        {
            shade(anchor, 0.1)
        }
        RegionType::Terrain if region.value == TERRAIN_IMPASSABLE => shade(anchor, 0.5),
        _ => anchor,
    };
    RegionColor::Fill([rgb[0], rgb[1], rgb[2], opacity])
}

fn elevation_range(all: &[Region]) -> Option<(i32, i32)> {
    let mut values = all
        .iter()
        .filter(|r| r.region_type == RegionType::Elevation)
        .map(|r| r.value);
    let first = values.next()?;
    Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

static REGION_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^Region (\d+)$").ok());

/// Schlägt den nächsten freien Namen "Region N" vor.
pub fn suggest_region_name<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let highest = REGION_NAME.as_ref().map_or(0, |re| {
        names
            .into_iter()
            .filter_map(|name| re.captures(name))
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    });
    format!("Region {}", highest.saturating_add(1))
}
