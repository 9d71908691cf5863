//! Classification of raw overlay documents.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("empty input")]
    Empty,
    #[error("unsupported data format")]
    Unsupported,
}

/// The three document shapes the normalizer accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifiedInput<'a> {
    /// `{"type": "FeatureCollection", "features": [...]}`
    CanonicalGeoJson(&'a Value),
    /// `{"features": [{"geometry": {"rings": ...}, "attributes": {...}}], "geometryType": ...}`
    LegacyFeatureArray(&'a [Value]),
    /// A bare `[[x, y], ...]` outer ring.
    RawRingArray(&'a [Value]),
}

impl ClassifiedInput<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifiedInput::CanonicalGeoJson(_) => "GeoJSON",
            ClassifiedInput::LegacyFeatureArray(_) => "legacy feature array",
            ClassifiedInput::RawRingArray(_) => "raw ring array",
        }
    }
}

pub fn detect(raw: &Value) -> Result<ClassifiedInput<'_>, DetectionError> {
    if raw.is_null() {
        return Err(DetectionError::Empty);
    }
    // A FeatureCollection also has a `features` array, so its tag is checked first.
    if raw.get("type").and_then(Value::as_str) == Some("FeatureCollection") {
        return Ok(ClassifiedInput::CanonicalGeoJson(raw));
    }
    if let Some(features) = raw.get("features").and_then(Value::as_array) {
        if raw.get("geometryType").is_some_and(|t| !t.is_null()) {
            return Ok(ClassifiedInput::LegacyFeatureArray(features));
        }
    }
    match raw.as_array() {
        Some(ring) => Ok(ClassifiedInput::RawRingArray(ring)),
        None => Err(DetectionError::Unsupported),
    }
}
