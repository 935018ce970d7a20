//! GeoJSON wire format for track updates.
//!
//! Upstream sends one `FeatureCollection` per tick; a bare `Feature` is also
//! accepted. Field types are read leniently: a property of the wrong type is
//! treated as absent rather than failing the whole message.

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::{Coord, TrackUpdate};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Collection(FeatureCollection),
    Feature(Feature),
}

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub serial: Option<Value>,
    #[serde(default)]
    pub registration: Option<Value>,
    #[serde(default, rename = "Name")]
    pub name: Option<Value>,
    #[serde(default)]
    pub pilot: Option<Value>,
    #[serde(default)]
    pub organization: Option<Value>,
    #[serde(default)]
    pub altitude: Option<Value>,
    #[serde(default)]
    pub yaw: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Option<Value>,
}

impl Message {
    pub fn into_updates(self) -> Vec<TrackUpdate> {
        match self {
            Message::Collection(fc) => fc.features.into_iter().map(Feature::into_update).collect(),
            Message::Feature(f) => vec![f.into_update()],
        }
    }
}

impl Feature {
    pub fn into_update(self) -> TrackUpdate {
        let p = self.properties.unwrap_or_default();
        TrackUpdate {
            serial: text(p.serial),
            registration: text(p.registration),
            name: text(p.name),
            pilot: text(p.pilot),
            organization: text(p.organization),
            altitude: number(p.altitude.as_ref()),
            yaw: number(p.yaw.as_ref()),
            coord: self.geometry.and_then(|g| coord(g.coordinates)),
        }
    }
}

/// Decode one feed message into updates, in feature order.
pub fn decode(text: &str) -> Result<Vec<TrackUpdate>> {
    let msg: Message = serde_json::from_str(text)?;
    Ok(msg.into_updates())
}

/// Non-empty strings pass through; numbers are stringified; anything else is absent.
fn text(v: Option<Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite numbers only; `"NaN"` and `"inf"` strings count as absent.
fn number(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n: &f64| n.is_finite())
}

/// First two numeric components; extras such as altitude are ignored.
fn coord(v: Option<Value>) -> Option<Coord> {
    match v? {
        Value::Array(items) if items.len() >= 2 => {
            Some([number(items.first())?, number(items.get(1))?])
        }
        _ => None,
    }
}
