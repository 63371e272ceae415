//! Mutations-Outbox: Partial-Updates je Entität, berechnet aus Vorher/Nachher-Diffs.
//!
//! Der Editor führt jede Änderung lokal (optimistisch) aus und legt die
//! resultierenden Partial-Updates in die Outbox. Der Host holt sie über
//! `drain` ab, schickt sie an die Stage-API und meldet Erfolg/Fehler zurück.
//! Fehler werden geloggt und markieren die Entität als veraltet; lokal wird
//! nichts zurückgerollt.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{
    FogMask, GridConfig, LightSource, LightSourceType, Opening, OpeningOpacity, OpeningState,
    OpeningVisibility, Pole, Region, RegionType, Segment, SoundSource, Stage, Wall,
    WallVisibility,
};

/// Serde-Adapter für löschbare Felder (`Option<Option<T>>`):
/// fehlendes Feld = keine Änderung, `null` = Wert entfernen.
mod present {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        T::deserialize(deserializer).map(Some)
    }
}

/// Erzeugt ein Partial-Update mit `between` (Diff) und `apply_to`.
macro_rules! partial_update {
    (
        $(#[$meta:meta])*
        $name:ident for $entity:ty {
            $($(#[$fmeta:meta])* $field:ident: $ty:ty $(=> $with:literal)?),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                $(#[serde(with = $with)])?
                pub $field: Option<$ty>,
            )*
        }

        impl $name {
            /// Geänderte Felder von `old` nach `new`; `None` ohne Änderung.
            pub fn between(old: &$entity, new: &$entity) -> Option<Self> {
                let update = Self {
                    $($field: (old.$field != new.$field).then(|| new.$field.clone()),)*
                };
                (!update.is_empty()).then_some(update)
            }

            pub fn is_empty(&self) -> bool {
                $(self.$field.is_none())&&*
            }

            /// Überträgt alle gesetzten Felder auf die Entität.
            pub fn apply_to(&self, target: &mut $entity) {
                $(
                    if let Some(value) = &self.$field {
                        target.$field = value.clone();
                    }
                )*
            }
        }
    };
}

partial_update! {
    /// Partial-Update einer Wand
    WallUpdate for Wall {
        name: String,
        poles: Vec<Pole>,
        visibility: WallVisibility,
        is_closed: bool,
        material: Option<String> => "present",
        color: Option<String> => "present",
        segments: Vec<Segment>,
    }
}

partial_update! {
    /// Partial-Update einer Öffnung
    OpeningUpdate for Opening {
        name: String,
        #[serde(rename = "type")]
        opening_type: String,
        width: f32,
        height: f32,
        wall_index: u32,
        start_pole_index: usize,
        end_pole_index: usize,
        visibility: OpeningVisibility,
        state: OpeningState,
        opacity: OpeningOpacity,
        material: Option<String> => "present",
        color: Option<String> => "present",
    }
}

partial_update! {
    /// Partial-Update einer Region
    RegionUpdate for Region {
        name: String,
        #[serde(rename = "type")]
        region_type: RegionType,
        vertices: Vec<Vec2> => "crate::core::serde_point::option_vec",
        value: i32,
        color: Option<String> => "present",
    }
}

partial_update! {
    /// Partial-Update einer Lichtquelle
    LightSourceUpdate for LightSource {
        name: String,
        #[serde(rename = "type")]
        light_type: LightSourceType,
        position: Vec2 => "crate::core::serde_point::option",
        range: f32,
        is_on: bool,
        direction: Option<f32> => "present",
        arc: Option<f32> => "present",
        color: Option<String> => "present",
    }
}

partial_update! {
    /// Partial-Update einer Geräuschquelle
    SoundSourceUpdate for SoundSource {
        name: String,
        resource_id: Option<String> => "present",
        position: Vec2 => "crate::core::serde_point::option",
        radius: f32,
        is_playing: bool,
    }
}

impl LightSourceUpdate {
    /// Richtung und Winkel werden immer gemeinsam übertragen.
    fn pair_direction(mut self, light: &LightSource) -> Self {
        if self.direction.is_some() || self.arc.is_some() {
            self.direction = Some(light.direction);
            self.arc = Some(light.arc);
        }
        self
    }
}

/// Eine Änderung an der persistierten Stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StageMutation {
    SetGrid { grid: GridConfig, grid_scale: f32 },
    AddWall { wall: Wall },
    UpdateWall { index: u32, update: WallUpdate },
    RemoveWall { index: u32 },
    AddOpening { opening: Opening },
    UpdateOpening { index: u32, update: OpeningUpdate },
    RemoveOpening { index: u32 },
    AddRegion { region: Region },
    UpdateRegion { index: u32, update: RegionUpdate },
    RemoveRegion { index: u32 },
    AddLightSource { light: LightSource },
    UpdateLightSource { index: u32, update: LightSourceUpdate },
    RemoveLightSource { index: u32 },
    AddSoundSource { sound: SoundSource },
    UpdateSoundSource { index: u32, update: SoundSourceUpdate },
    RemoveSoundSource { index: u32 },
    UpdateFogOfWar { fog: FogMask },
}

/// Betroffene Entität einer Mutation (für Stale-Tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Grid,
    Wall(u32),
    Opening(u32),
    Region(u32),
    LightSource(u32),
    SoundSource(u32),
    Fog,
}

impl StageMutation {
    pub fn entity(&self) -> EntityRef {
        match self {
            StageMutation::SetGrid { .. } => EntityRef::Grid,
            StageMutation::AddWall { wall } => EntityRef::Wall(wall.index),
            StageMutation::UpdateWall { index, .. } | StageMutation::RemoveWall { index } => {
                EntityRef::Wall(*index)
            }
            StageMutation::AddOpening { opening } => EntityRef::Opening(opening.index),
            StageMutation::UpdateOpening { index, .. } | StageMutation::RemoveOpening { index } => {
                EntityRef::Opening(*index)
            }
            StageMutation::AddRegion { region } => EntityRef::Region(region.index),
            StageMutation::UpdateRegion { index, .. } | StageMutation::RemoveRegion { index } => {
                EntityRef::Region(*index)
            }
            StageMutation::AddLightSource { light } => EntityRef::LightSource(light.index),
            StageMutation::UpdateLightSource { index, .. }
            | StageMutation::RemoveLightSource { index } => EntityRef::LightSource(*index),
            StageMutation::AddSoundSource { sound } => EntityRef::SoundSource(sound.index),
            StageMutation::UpdateSoundSource { index, .. }
            | StageMutation::RemoveSoundSource { index } => EntityRef::SoundSource(*index),
            StageMutation::UpdateFogOfWar { .. } => EntityRef::Fog,
        }
    }
}

fn removed_keys<'a, T>(
    before: &'a IndexMap<u32, T>,
    after: &'a IndexMap<u32, T>,
) -> impl Iterator<Item = u32> + 'a {
    before.keys().copied().filter(|k| !after.contains_key(k))
}

/// Neue und geänderte Entitäten einer Art, in der Reihenfolge von `after`.
fn added_or_changed<'a, T: PartialEq>(
    before: &'a IndexMap<u32, T>,
    after: &'a IndexMap<u32, T>,
) -> impl Iterator<Item = (u32, Option<&'a T>, &'a T)> + 'a {
    after.iter().filter_map(move |(key, new)| match before.get(key) {
        None => Some((*key, None, new)),
        Some(old) if old != new => Some((*key, Some(old), new)),
        Some(_) => None,
    })
}

/// Berechnet alle Mutationen von `before` nach `after`.
///
/// Entfernungen kommen zuerst (abhängige Entitäten vor ihren Wänden),
/// danach Hinzufügungen und Änderungen (Wände vor ihren Öffnungen).
pub fn diff_stages(before: &Stage, after: &Stage) -> Vec<StageMutation> {
    let mut out = Vec::new();

    out.extend(
        removed_keys(&before.sounds, &after.sounds)
            .map(|index| StageMutation::RemoveSoundSource { index }),
    );
    out.extend(
        removed_keys(&before.lights, &after.lights)
            .map(|index| StageMutation::RemoveLightSource { index }),
    );
    out.extend(
        removed_keys(&before.regions, &after.regions)
            .map(|index| StageMutation::RemoveRegion { index }),
    );
    out.extend(
        removed_keys(&before.openings, &after.openings)
            .map(|index| StageMutation::RemoveOpening { index }),
    );
    out.extend(
        removed_keys(&before.walls, &after.walls)
            .map(|index| StageMutation::RemoveWall { index }),
    );

    if before.grid != after.grid || before.grid_scale != after.grid_scale {
        out.push(StageMutation::SetGrid {
            grid: after.grid,
            grid_scale: after.grid_scale,
        });
    }

    for (index, old, new) in added_or_changed(&before.walls, &after.walls) {
        match old {
            None => out.push(StageMutation::AddWall { wall: new.clone() }),
            Some(old) => out.extend(
                WallUpdate::between(old, new)
                    .map(|update| StageMutation::UpdateWall { index, update }),
            ),
        }
    }
    for (index, old, new) in added_or_changed(&before.openings, &after.openings) {
        match old {
            None => out.push(StageMutation::AddOpening {
                opening: new.clone(),
            }),
            Some(old) => out.extend(
                OpeningUpdate::between(old, new)
                    .map(|update| StageMutation::UpdateOpening { index, update }),
            ),
        }
    }
    for (index, old, new) in added_or_changed(&before.regions, &after.regions) {
        match old {
            None => out.push(StageMutation::AddRegion {
                region: new.clone(),
            }),
            Some(old) => out.extend(
                RegionUpdate::between(old, new)
                    .map(|update| StageMutation::UpdateRegion { index, update }),
            ),
        }
    }
    for (index, old, new) in added_or_changed(&before.lights, &after.lights) {
        match old {
            None => out.push(StageMutation::AddLightSource { light: new.clone() }),
            Some(old) => out.extend(LightSourceUpdate::between(old, new).map(|update| {
                StageMutation::UpdateLightSource {
                    index,
                    update: update.pair_direction(new),
                }
            })),
        }
    }
    for (index, old, new) in added_or_changed(&before.sounds, &after.sounds) {
        match old {
            None => out.push(StageMutation::AddSoundSource { sound: new.clone() }),
            Some(old) => out.extend(
                SoundSourceUpdate::between(old, new)
                    .map(|update| StageMutation::UpdateSoundSource { index, update }),
            ),
        }
    }

    if before.fog != after.fog {
        out.push(StageMutation::UpdateFogOfWar {
            fog: after.fog.clone(),
        });
    }
    out
}

/// Mutation mit Outbox-ID, adressiert an eine Stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMutation {
    pub id: u64,
    pub stage_id: String,
    #[serde(flatten)]
    pub mutation: StageMutation,
}

impl PendingMutation {
    /// JSON-Payload für die Stage-API.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn entity(&self) -> EntityRef {
        self.mutation.entity()
    }
}

/// Warteschlange ausstehender und laufender Mutationen.
#[derive(Debug, Default)]
pub struct MutationOutbox {
    next_id: u64,
    queued: Vec<PendingMutation>,
    in_flight: HashMap<u64, PendingMutation>,
    stale: HashSet<EntityRef>,
}

impl MutationOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reiht Mutationen für eine Stage ein.
    pub fn enqueue(&mut self, stage_id: &str, mutations: Vec<StageMutation>) {
        for mutation in mutations {
            self.next_id += 1;
            log::debug!("Mutation {} eingereiht: {:?}", self.next_id, mutation.entity());
            self.queued.push(PendingMutation {
                id: self.next_id,
                stage_id: stage_id.to_string(),
                mutation,
            });
        }
    }

    /// Übergibt alle eingereihten Mutationen an den Host (danach "in flight").
    pub fn drain(&mut self) -> Vec<PendingMutation> {
        let drained: Vec<PendingMutation> = self.queued.drain(..).collect();
        for pending in &drained {
            self.in_flight.insert(pending.id, pending.clone());
        }
        drained
    }

    /// Bestätigt eine Mutation. Gibt `false` für unbekannte IDs zurück.
    pub fn report_success(&mut self, id: u64) -> bool {
        self.in_flight.remove(&id).is_some()
    }

    /// Meldet einen Fehlschlag: loggen und Entität als veraltet markieren.
    pub fn report_failure(&mut self, id: u64, reason: &str) -> Option<EntityRef> {
        let Some(pending) = self.in_flight.remove(&id) else {
            log::warn!("Fehlermeldung für unbekannte Mutation {}: {}", id, reason);
            return None;
        };
        let entity = pending.entity();
        log::error!(
            "Mutation {} auf Stage '{}' fehlgeschlagen ({:?}): {}",
            id,
            pending.stage_id,
            entity,
            reason
        );
        self.stale.insert(entity);
        Some(entity)
    }

    pub fn is_stale(&self, entity: EntityRef) -> bool {
        self.stale.contains(&entity)
    }

    /// Alle veralteten Entitäten (für ein Re-Fetch durch den Host).
    pub fn stale_entities(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.stale.iter().copied()
    }

    pub fn clear_stale(&mut self, entity: EntityRef) {
        self.stale.remove(&entity);
    }

    pub fn clear_all_stale(&mut self) {
        self.stale.clear();
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Pole, SegmentType};

    fn wall(index: u32) -> Wall {
        Wall {
            index,
            name: format!("Wall {index}"),
            poles: vec![Pole::new(0.0, 0.0, 10.0), Pole::new(50.0, 0.0, 10.0)],
            visibility: WallVisibility::Normal,
            is_closed: false,
            material: Some("Stone".into()),
            color: None,
            segments: Vec::new(),
        }
    }

    fn light(index: u32) -> LightSource {
        LightSource {
            index,
            name: "Lantern".into(),
            light_type: LightSourceType::Artificial,
            position: Vec2::new(10.0, 20.0),
            range: 6.0,
            is_on: true,
            direction: None,
            arc: None,
            color: None,
        }
    }

    #[test]
    fn update_enthaelt_nur_geaenderte_felder() {
        let old = wall(1);
        let mut new = old.clone();
        new.material = None;
        new.set_segment_type(0, SegmentType::Door);

        let update = WallUpdate::between(&old, &new).expect("Änderung erwartet");
        assert_eq!(update.material, Some(None));
        assert!(update.name.is_none());
        assert!(update.segments.is_some());

        let json = serde_json::to_value(&update).expect("JSON");
        assert!(json.get("name").is_none());
        assert!(json["material"].is_null());
        assert_eq!(json["segments"][0]["type"], "Door");

        let mut target = old.clone();
        update.apply_to(&mut target);
        assert_eq!(target, new);
    }

    #[test]
    fn keine_aenderung_kein_update() {
        assert!(WallUpdate::between(&wall(1), &wall(1)).is_none());
    }

    #[test]
    fn licht_richtung_und_winkel_gemeinsam() {
        let old = light(3);
        let mut new = old.clone();
        new.direction = Some(90.0);
        new.arc = Some(60.0);
        let mut before = Stage::new("s");
        before.lights.insert(3, old);
        let mut after = before.clone();
        after.lights.insert(3, new);

        let mutations = diff_stages(&before, &after);
        let [StageMutation::UpdateLightSource { index, update }] = mutations.as_slice() else {
            panic!("genau ein Licht-Update erwartet: {mutations:?}");
        };
        assert_eq!(*index, 3);
        assert_eq!(update.direction, Some(Some(90.0)));
        assert_eq!(update.arc, Some(Some(60.0)));
        assert!(update.range.is_none());
    }

    #[test]
    fn diff_reihenfolge_entfernen_zuerst() {
        let mut before = Stage::new("s");
        before.walls.insert(1, wall(1));
        let mut after = Stage::new("s");
        after.walls.insert(2, wall(2));
        after.lights.insert(3, light(3));

        let mutations = diff_stages(&before, &after);
        assert!(matches!(mutations[0], StageMutation::RemoveWall { index: 1 }));
        assert!(matches!(mutations[1], StageMutation::AddWall { .. }));
        assert!(matches!(mutations[2], StageMutation::AddLightSource { .. }));
    }

    #[test]
    fn payload_format() {
        let pending = PendingMutation {
            id: 7,
            stage_id: "stage-1".into(),
            mutation: StageMutation::RemoveLightSource { index: 4 },
        };
        let json: serde_json::Value =
            serde_json::from_str(&pending.to_json().expect("JSON")).expect("parse");
        assert_eq!(json["op"], "removeLightSource");
        assert_eq!(json["stageId"], "stage-1");
        assert_eq!(json["index"], 4);
    }

    #[test]
    fn partial_update_aus_json() {
        let update: LightSourceUpdate =
            serde_json::from_str(r#"{"range": 8.0, "color": null, "position": {"x": 1.0, "y": 2.0}}"#)
                .expect("JSON");
        assert_eq!(update.range, Some(8.0));
        assert_eq!(update.color, Some(None));
        assert_eq!(update.position, Some(Vec2::new(1.0, 2.0)));
        assert!(update.direction.is_none());
    }

    #[test]
    fn fehlschlag_markiert_entitaet_als_veraltet() {
        let mut outbox = MutationOutbox::new();
        outbox.enqueue("s", vec![StageMutation::RemoveRegion { index: 5 }]);
        let drained = outbox.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(outbox.in_flight_len(), 1);

        let entity = outbox.report_failure(drained[0].id, "503");
        assert_eq!(entity, Some(EntityRef::Region(5)));
        assert!(outbox.is_stale(EntityRef::Region(5)));
        assert_eq!(outbox.in_flight_len(), 0);
        assert!(!outbox.report_success(drained[0].id));
    }
}
