//! VTT Stage Editor (headless).
//!
//! Lädt eine Stage, spielt optional Commands ab und gibt eine Übersicht
//! des aufgelösten Overlays aus.

use std::path::PathBuf;

use anyhow::Context;
use vtt_stage_editor::core::{color_of, display_label, sort_regions, RegionColor};
use vtt_stage_editor::{EditorCommand, EditorOptions, Stage, StageEditor};

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("VTT Stage Editor v{} startet...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let Some(stage_path) = args.next().map(PathBuf::from) else {
        anyhow::bail!("Aufruf: vtt-stage-editor <stage.json> [commands.json]");
    };
    let commands_path = args.next().map(PathBuf::from);

    let options = EditorOptions::load_from_file(&EditorOptions::config_path());
    let json = std::fs::read_to_string(&stage_path)
        .with_context(|| format!("Stage-Datei nicht lesbar: {}", stage_path.display()))?;
    let stage = Stage::from_json(&json)
        .with_context(|| format!("Stage-Datei ungültig: {}", stage_path.display()))?;
    log::info!(
        "Stage '{}' geladen: {} Wände, {} Öffnungen, {} Regionen, {} Lichter, {} Geräusche",
        stage.id,
        stage.walls.len(),
        stage.openings.len(),
        stage.regions.len(),
        stage.lights.len(),
        stage.sounds.len()
    );

    let mut editor = StageEditor::new(stage, options);

    if let Some(path) = commands_path {
        replay_commands(&mut editor, &path)?;
    }

    log_summary(editor.stage());
    Ok(())
}

/// Spielt eine JSON-Liste von Commands ab und gibt die erzeugten Mutationen aus.
fn replay_commands(editor: &mut StageEditor, path: &std::path::Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Command-Datei nicht lesbar: {}", path.display()))?;
    let commands: Vec<EditorCommand> = serde_json::from_str(&json)
        .with_context(|| format!("Command-Datei ungültig: {}", path.display()))?;

    for command in commands {
        match editor.handle_command(command) {
            Ok(outcome) => log::info!("Command ausgeführt: {outcome:?}"),
            Err(e) => log::warn!("Command abgelehnt: {e:#}"),
        }
    }
    for mutation in editor.drain_mutations() {
        log::info!("Mutation: {}", mutation.to_json()?);
    }
    Ok(())
}

fn log_summary(stage: &Stage) {
    let regions = stage.region_list();
    for region in sort_regions(&regions) {
        let color = match color_of(region, &regions) {
            RegionColor::Transparent => "transparent".to_string(),
            RegionColor::Fill([r, g, b, a]) => format!("rgba({r:.2}, {g:.2}, {b:.2}, {a:.2})"),
        };
        log::info!(
            "Region {} '{}' ({}): {} → {}",
            region.index,
            region.name,
            region.region_type.label(),
            display_label(region),
            color
        );
    }
    for light in stage.lights.values() {
        log::info!(
            "Licht {} '{}': {} {:.1} ft, {}{}",
            light.index,
            light.name,
            light.mode_label(),
            light.effective_range_feet(stage.grid_scale),
            light.effective_color(),
            if light.is_on { "" } else { " (aus)" }
        );
    }
    log::info!(
        "Fog: {} × {} Zellen, {:.0}% verdeckt",
        stage.fog.cols,
        stage.fog.rows,
        stage.fog.coverage() * 100.0
    );
}
