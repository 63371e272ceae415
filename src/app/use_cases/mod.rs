//! Use-Cases der Application-Layer-Orchestrierung.
//!
//! Jede Funktion arbeitet direkt auf dem `EditorState`; Stage-Änderungen laufen
//! ausschließlich über `EditorState::mutate_stage` (Snapshot + Outbox).

pub mod fog;
pub mod grid;
pub mod history;
pub mod openings;
pub mod regions;
pub mod sources;
pub mod walls;

use crate::core::is_valid_hex_color;

/// Lehnt Farben ab, die nicht dem Format `#RRGGBB` entsprechen.
fn ensure_color(color: Option<&str>) -> anyhow::Result<()> {
    match color {
        Some(color) if !is_valid_hex_color(color) => {
            anyhow::bail!("Ungültige Farbe '{color}' (erwartet #RRGGBB)")
        }
        _ => Ok(()),
    }
}

/// Wie [`ensure_color`], lässt aber den leeren String als bewusstes
/// "keine Farbe" zu (ersetzt die Typ-Standardfarbe nicht).
fn ensure_override_color(color: Option<&str>) -> anyhow::Result<()> {
    match color {
        Some("") => Ok(()),
        other => ensure_color(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farbpruefung() {
        assert!(ensure_color(None).is_ok());
        assert!(ensure_color(Some("#A1b2C3")).is_ok());
        assert!(ensure_color(Some("red")).is_err());
        assert!(ensure_color(Some("")).is_err());
        assert!(ensure_override_color(Some("")).is_ok());
        assert!(ensure_override_color(Some("#12345")).is_err());
    }
}
