//! Conversion of classified documents into polygon features with raw coordinates.

use serde_json::Value;
use thiserror::Error;

use crate::data::{Feature, FeatureCollection, Point, Polygon, Properties, Ring};
use crate::detect::ClassifiedInput;

/// An entry that could not be turned into a polygon feature. The entry is
/// dropped and the rest of the document is still converted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("feature {index}: {reason}")]
pub struct AdaptationError {
    pub index: usize,
    pub reason: String,
}

impl AdaptationError {
    fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Adapted {
    /// Features in input order, coordinates not yet projected.
    pub collection: FeatureCollection,
    /// Number of entries the input document declared.
    pub input_features: usize,
    pub dropped: Vec<AdaptationError>,
    /// Rings that were not arrays and were replaced by an empty ring.
    pub replaced_rings: usize,
}

pub fn adapt(classified: ClassifiedInput<'_>) -> Adapted {
    match classified {
        ClassifiedInput::CanonicalGeoJson(raw) => {
            let Some(features) = raw.get("features").and_then(Value::as_array) else {
                log::warn!("FeatureCollection without a features array, treating it as empty");
                return Adapted::default();
            };
            let mut adapted = collect(features, geojson_feature);
            adapted.collection.extra = members_except(raw, &["type", "features"]);
            adapted
        }
        ClassifiedInput::LegacyFeatureArray(entries) => collect(entries, legacy_feature),
        ClassifiedInput::RawRingArray(ring) => {
            let ring: Ring = ring.iter().map(parse_point).collect();
            Adapted {
                collection: FeatureCollection::new(vec![Feature::new(
                    Polygon::new(vec![ring]),
                    Properties::new(),
                )]),
                input_features: 1,
                ..Default::default()
            }
        }
    }
}

/// A converted entry and the number of its rings that had to be replaced.
type Converted = (Feature, usize);

fn collect<F>(entries: &[Value], convert: F) -> Adapted
where
    F: Fn(&Value) -> Result<Converted, String>,
{
    let mut adapted = Adapted {
        input_features: entries.len(),
        ..Default::default()
    };
    adapted.collection.features.reserve(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match convert(entry) {
            Ok((feature, replaced_rings)) => {
                if replaced_rings > 0 {
                    log::warn!(
                        "Feature {}: {} invalid rings replaced by empty rings",
                        index,
                        replaced_rings
                    );
                }
                adapted.replaced_rings += replaced_rings;
                adapted.collection.features.push(feature);
            }
            Err(reason) => {
                let err = AdaptationError::new(index, reason);
                log::warn!("Skipping invalid feature: {}", err);
                adapted.dropped.push(err);
            }
        }
    }
    adapted
}

fn geojson_feature(entry: &Value) -> Result<Converted, String> {
    if !entry.is_object() {
        return Err("not an object".to_string());
    }
    let geometry = match entry.get("geometry") {
        None | Some(Value::Null) => return Err("missing geometry".to_string()),
        Some(geometry) => geometry,
    };
    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") | None => {}
        Some(other) => return Err(format!("unsupported geometry type {:?}", other)),
    }
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| "missing geometry.coordinates".to_string())?;
    let (rings, replaced_rings) = parse_rings(coordinates)?;

    let feature = Feature {
        id: entry.get("id").filter(|id| !id.is_null()).cloned(),
        geometry: Polygon {
            coordinates: rings,
            extra: members_except(geometry, &["type", "coordinates"]),
        },
        properties: parse_properties(entry.get("properties"), "properties")?,
        extra: members_except(entry, &["type", "id", "geometry", "properties"]),
    };
    Ok((feature, replaced_rings))
}

fn legacy_feature(entry: &Value) -> Result<Converted, String> {
    let rings = entry
        .get("geometry")
        .and_then(|geometry| geometry.get("rings"))
        .filter(|rings| rings.is_array())
        .ok_or_else(|| "missing geometry.rings".to_string())?;
    let (rings, replaced_rings) = parse_rings(rings)?;

    let feature = Feature::new(
        Polygon::new(rings),
        parse_properties(entry.get("attributes"), "attributes")?,
    );
    Ok((feature, replaced_rings))
}

/// Object members other than `handled`, kept so they can be written back.
fn members_except(value: &Value, handled: &[&str]) -> Properties {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter(|(key, _)| !handled.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_properties(value: Option<&Value>, field: &str) -> Result<Properties, String> {
    match value {
        None | Some(Value::Null) => Ok(Properties::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(format!("{} is not an object", field)),
    }
}

/// A ring that is not an array becomes an empty ring; the other rings of the
/// polygon are kept.
fn parse_rings(value: &Value) -> Result<(Vec<Ring>, usize), String> {
    let rings = value
        .as_array()
        .ok_or_else(|| "coordinates are not an array".to_string())?;
    let mut replaced = 0;
    let rings = rings
        .iter()
        .map(|ring| match ring.as_array() {
            Some(points) => points.iter().map(parse_point).collect(),
            None => {
                replaced += 1;
                Ring::new()
            }
        })
        .collect();
    Ok((rings, replaced))
}

/// Anything that is not `[number, number, ...]` becomes NaN so the projector
/// replaces it with the fallback point and the ring keeps its length.
fn parse_point(value: &Value) -> Point {
    match value.as_array() {
        Some(pair) if pair.len() >= 2 => [
            pair[0].as_f64().unwrap_or(f64::NAN),
            pair[1].as_f64().unwrap_or(f64::NAN),
        ],
        _ => [f64::NAN, f64::NAN],
    }
}
