//! Farbwerte: Validierung und Umrechnung von `#RRGGBB`-Strings in RGBA.

use regex::Regex;
use std::sync::LazyLock;

static HEX_COLOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").ok());

/// Prüft ob ein String eine gültige `#RRGGBB`-Farbe ist.
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(color))
}

/// Parst `#RRGGBB` in RGB-Komponenten (0.0–1.0).
pub fn parse_hex_color(color: &str) -> Option<[f32; 3]> {
    if !is_valid_hex_color(color) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&color[range], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some([channel(1..3)?, channel(3..5)?, channel(5..7)?])
}

/// Formatiert RGB-Komponenten (0.0–1.0) als `#RRGGBB`.
pub fn to_hex_color(rgb: [f32; 3]) -> String {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02X}{:02X}{:02X}", byte(rgb[0]), byte(rgb[1]), byte(rgb[2]))
}

/// Skaliert eine RGB-Farbe (Abdunkeln bei `factor < 1`).
pub fn shade(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    [
        (rgb[0] * factor).clamp(0.0, 1.0),
        (rgb[1] * factor).clamp(0.0, 1.0),
        (rgb[2] * factor).clamp(0.0, 1.0),
    ]
}
