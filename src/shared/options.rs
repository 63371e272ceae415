//! Zentrale Konfiguration für den Stage-Editor.
//!
//! `EditorOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

use crate::core::{SnapConfig, WallPlacement, ASSET_SNAP_CONFIG, WALL_SNAP_CONFIG};

// ── Raster ──────────────────────────────────────────────────────────

/// Kleinste zulässige Zellgröße in Pixeln.
pub const MIN_CELL_SIZE: f32 = 10.0;

// ── History ─────────────────────────────────────────────────────────

/// Maximale Undo-Tiefe.
pub const HISTORY_DEPTH: usize = 100;

// ── Wände ───────────────────────────────────────────────────────────

/// Standard-Pole-Höhe in Fuß.
pub const WALL_DEFAULT_HEIGHT: f32 = 10.0;
/// Standard-Wandfarbe.
pub const WALL_DEFAULT_COLOR: &str = "#808080";
/// Standard-Wandmaterial.
pub const WALL_DEFAULT_MATERIAL: &str = "Stone";
/// Pick-Radius für Poles in Pixeln.
pub const POLE_PICK_RADIUS_PX: f32 = 12.0;

// ── Fog ─────────────────────────────────────────────────────────────

/// Kantenlänge einer Fog-Zelle in Pixeln.
pub const FOG_CELL_SIZE: f32 = 10.0;

// ── Regionen ────────────────────────────────────────────────────────

/// Rasterweite der Regionsfüllung an Wänden in Pixeln.
pub const REGION_FILL_CELL_SIZE: f32 = 5.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Editor-Optionen.
/// Wird als `vtt_stage_editor.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorOptions {
    // ── Raster ──────────────────────────────────────────────────
    /// Untergrenze für Zellgrößen bei der Rasterkonfiguration
    pub min_cell_size: f32,

    // ── History ─────────────────────────────────────────────────
    pub history_depth: usize,

    // ── Wände ───────────────────────────────────────────────────
    pub wall_default_height: f32,
    pub wall_default_color: String,
    pub wall_default_material: String,
    /// Pick-Radius für Poles in Pixeln
    #[serde(default = "default_pole_pick_radius")]
    pub pole_pick_radius_px: f32,

    // ── Fog ─────────────────────────────────────────────────────
    pub fog_cell_size: f32,

    // ── Regionen ────────────────────────────────────────────────
    /// Rasterweite der Regionsfüllung an Wänden
    #[serde(default = "default_region_fill_cell_size")]
    pub region_fill_cell_size: f32,

    // ── Snapping ────────────────────────────────────────────────
    /// Snap-Verhalten beim Setzen von Wand-Poles
    #[serde(default = "default_wall_snap")]
    pub wall_snap: SnapConfig,
    /// Snap-Verhalten beim Platzieren von Licht-/Geräuschquellen
    #[serde(default = "default_asset_snap")]
    pub asset_snap: SnapConfig,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            min_cell_size: MIN_CELL_SIZE,

            history_depth: HISTORY_DEPTH,

            wall_default_height: WALL_DEFAULT_HEIGHT,
            wall_default_color: WALL_DEFAULT_COLOR.to_string(),
            wall_default_material: WALL_DEFAULT_MATERIAL.to_string(),
            pole_pick_radius_px: POLE_PICK_RADIUS_PX,

            fog_cell_size: FOG_CELL_SIZE,

            region_fill_cell_size: REGION_FILL_CELL_SIZE,

            wall_snap: WALL_SNAP_CONFIG,
            asset_snap: ASSET_SNAP_CONFIG,
        }
    }
}

/// Serde-Default für `pole_pick_radius_px` (Abwärtskompatibilität).
fn default_pole_pick_radius() -> f32 {
    POLE_PICK_RADIUS_PX
}

fn default_region_fill_cell_size() -> f32 {
    REGION_FILL_CELL_SIZE
}

fn default_wall_snap() -> SnapConfig {
    WALL_SNAP_CONFIG
}

fn default_asset_snap() -> SnapConfig {
    ASSET_SNAP_CONFIG
}

impl EditorOptions {
    /// Platzierungs-Eigenschaften für Wände ohne explizite Angaben.
    pub fn wall_placement(&self) -> WallPlacement {
        WallPlacement {
            material: Some(self.wall_default_material.clone()),
            default_height: self.wall_default_height,
            color: Some(self.wall_default_color.clone()),
            ..WallPlacement::default()
        }
    }

    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("vtt-stage-editor"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("vtt_stage_editor.toml")
    }
}
