//! Serde-Adapter: `glam::Vec2` als `{x, y}`-Objekt wie im persistierten Stage-Layout.
//!
//! Verwendung: `#[serde(with = "crate::core::serde_point")]` bzw. `::vec`, `::option`, `::option_vec`.

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
struct PointRepr {
    x: f32,
    y: f32,
}

impl From<Vec2> for PointRepr {
    fn from(p: Vec2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

pub fn serialize<S: Serializer>(point: &Vec2, serializer: S) -> Result<S::Ok, S::Error> {
    PointRepr::from(*point).serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec2, D::Error> {
    let p = PointRepr::deserialize(deserializer)?;
    Ok(Vec2::new(p.x, p.y))
}

/// Punktlisten (Polygon-Vertices).
pub mod vec {
    use super::PointRepr;
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Vec2], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().map(|p| PointRepr::from(*p)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec2>, D::Error> {
        let raw = Vec::<PointRepr>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|p| Vec2::new(p.x, p.y)).collect())
    }
}

/// Optionale Punkte in Partial-Updates: fehlendes Feld = keine Änderung.
pub mod option {
    use super::PointRepr;
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Option<Vec2>, serializer: S) -> Result<S::Ok, S::Error> {
        point.map(PointRepr::from).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec2>, D::Error> {
        let p = PointRepr::deserialize(deserializer)?;
        Ok(Some(Vec2::new(p.x, p.y)))
    }
}

/// Optionale Punktlisten in Partial-Updates.
pub mod option_vec {
    use super::PointRepr;
    use glam::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        points: &Option<Vec<Vec2>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        points
            .as_ref()
            .map(|list| list.iter().copied().map(PointRepr::from).collect::<Vec<_>>())
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Vec2>>, D::Error> {
        super::vec::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Holder {
        #[serde(with = "super")]
        point: Vec2,
        #[serde(with = "super::vec")]
        points: Vec<Vec2>,
    }

    #[test]
    fn punkte_werden_als_xy_objekte_serialisiert() {
        let holder = Holder {
            point: Vec2::new(1.5, -2.0),
            points: vec![Vec2::new(0.0, 1.0)],
        };
        let json = serde_json::to_value(&holder).unwrap();
        assert_eq!(json["point"]["x"], 1.5);
        assert_eq!(json["points"][0]["y"], 1.0);

        let back: Holder = serde_json::from_value(json).unwrap();
        assert_eq!(back, holder);
    }
}
