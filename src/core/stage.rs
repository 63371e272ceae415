//! Stage-Aggregat: Raster, Wände, Öffnungen, Regionen, Licht, Geräusche und Fog-Maske.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::fog::FogMask;
use super::geometry::LineSegment;
use super::grid::GridConfig;
use super::light::{LightSource, DEFAULT_GRID_SCALE};
use super::opening::Opening;
use super::region::Region;
use super::sound::SoundSource;
use super::wall::Wall;

/// Entitäten, die über einen stage-weiten Index adressiert werden.
pub trait Indexed {
    fn index(&self) -> u32;
}

macro_rules! impl_indexed {
    ($($ty:ty),*) => {
        $(impl Indexed for $ty {
            fn index(&self) -> u32 {
                self.index
            }
        })*
    };
}

impl_indexed!(Wall, Opening, Region, LightSource, SoundSource);

/// (De-)Serialisiert eine Index-Map als Liste (persistiertes Layout).
mod indexed_list {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Indexed;

    pub fn serialize<T, S>(map: &IndexMap<u32, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<IndexMap<u32, T>, D::Error>
    where
        T: Deserialize<'de> + Indexed,
        D: Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|item| (item.index(), item)).collect())
    }
}

/// Blockierende Wandspanne
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barrier {
    pub wall_index: u32,
    pub line: LineSegment,
}

/// Eine Stage (Encounter/Battle-Map).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grid: GridConfig,
    /// Fuß pro Rasterzelle
    #[serde(default = "default_grid_scale")]
    pub grid_scale: f32,
    #[serde(default, with = "indexed_list")]
    pub walls: IndexMap<u32, Wall>,
    #[serde(default, with = "indexed_list")]
    pub openings: IndexMap<u32, Opening>,
    #[serde(default, with = "indexed_list")]
    pub regions: IndexMap<u32, Region>,
    #[serde(default, with = "indexed_list")]
    pub lights: IndexMap<u32, LightSource>,
    #[serde(default, with = "indexed_list")]
    pub sounds: IndexMap<u32, SoundSource>,
    #[serde(default)]
    pub fog: FogMask,
}

fn default_grid_scale() -> f32 {
    DEFAULT_GRID_SCALE
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            grid: GridConfig::default(),
            grid_scale: DEFAULT_GRID_SCALE,
            walls: IndexMap::new(),
            openings: IndexMap::new(),
            regions: IndexMap::new(),
            lights: IndexMap::new(),
            sounds: IndexMap::new(),
            fog: FogMask::default(),
        }
    }
}

impl Stage {
    /// Erstellt eine leere Stage mit gegebener ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Lädt eine Stage aus JSON und stellt die Abschnitts-Invarianten wieder her.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut stage: Stage = serde_json::from_str(json)?;
        stage.fog.validate()?;
        stage.normalize();
        Ok(stage)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Normalisiert persistierte Daten (Abschnittszustände, Lichtrichtungen, Fog-Raster).
    pub fn normalize(&mut self) {
        for wall in self.walls.values_mut() {
            wall.normalize_segments();
        }
        for light in self.lights.values_mut() {
            light.normalize_direction();
        }
        self.fog.normalize();
    }

    /// Höchster vergebener Index über alle Entitätsarten.
    pub fn max_index(&self) -> Option<u32> {
        self.walls
            .keys()
            .chain(self.openings.keys())
            .chain(self.regions.keys())
            .chain(self.lights.keys())
            .chain(self.sounds.keys())
            .copied()
            .max()
    }

    /// Regionen als Slice-kompatible Liste (für die Farbauflösung).
    pub fn region_list(&self) -> Vec<Region> {
        self.regions.values().cloned().collect()
    }

    /// Alle Wandspannen, die Sicht und Fog-Füllung blockieren.
    pub fn barrier_lines(&self) -> Vec<LineSegment> {
        self.barriers().into_iter().map(|b| b.line).collect()
    }

    /// Blockierende Wandspannen mit ihrer Wand.
    ///
    /// Eine Spanne blockiert, wenn die Wand nicht unsichtbar ist, ihr Abschnitt
    /// blockiert und keine offene/zerstörte Öffnung sie überdeckt.
    pub fn barriers(&self) -> Vec<Barrier> {
        let mut barriers = Vec::new();
        for wall in self.walls.values() {
            if !wall.visibility.blocks() {
                continue;
            }
            let passable: Vec<&Opening> = self
                .openings
                .values()
                .filter(|o| o.wall_index == wall.index && o.state.is_passable())
                .collect();
            for (span, line) in wall.spans() {
                if !wall.segment_at(span).blocks_passage() {
                    continue;
                }
                if passable.iter().any(|o| o.covers_span(span)) {
                    continue;
                }
                barriers.push(Barrier {
                    wall_index: wall.index,
                    line,
                });
            }
        }
        barriers
    }
}
