//! Region-specific constants for the coordinate projector.
//!
//! The projector only understands coordinates near one deployment region. All
//! numbers it depends on live in [`RegionConfig`] so another region can be
//! configured without touching the projection code.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::Point;
use crate::normalize::Error;

/// Reference town center of 茶江, also used as the fallback point.
pub const CHAJIANG_CENTER: Point = [110.8279, 24.8333];
/// Grid coordinate of the legacy system known to correspond to [`CHAJIANG_CENTER`].
pub const CHAJIANG_GRID_ANCHOR: Point = [36_785_000.0, 2_748_500.0];
/// Eastings above this value are taken to be in the legacy large-grid system.
pub const LEGACY_GRID_THRESHOLD: f64 = 36_000_000.0;
pub const CHAJIANG_METERS_PER_DEGREE_LNG: f64 = 102_834.74;
pub const CHAJIANG_METERS_PER_DEGREE_LAT: f64 = 111_132.92;

/// Inclusive lng/lat window that a normalized coordinate must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_lng: 100.0,
            max_lng: 120.0,
            min_lat: 20.0,
            max_lat: 30.0,
        }
    }
}

impl Bounds {
    pub fn contains(&self, [lng, lat]: Point) -> bool {
        (self.min_lng..=self.max_lng).contains(&lng)
            && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Substituted for any point that cannot be converted.
    pub fallback_center: Point,
    pub bounds: Bounds,
    pub grid_threshold: f64,
    pub grid_anchor: Point,
    /// Geographic position of `grid_anchor`.
    pub geo_anchor: Point,
    pub meters_per_degree_lng: f64,
    pub meters_per_degree_lat: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self::chajiang()
    }
}

impl RegionConfig {
    pub fn chajiang() -> Self {
        Self {
            fallback_center: CHAJIANG_CENTER,
            bounds: Bounds::default(),
            grid_threshold: LEGACY_GRID_THRESHOLD,
            grid_anchor: CHAJIANG_GRID_ANCHOR,
            geo_anchor: CHAJIANG_CENTER,
            meters_per_degree_lng: CHAJIANG_METERS_PER_DEGREE_LNG,
            meters_per_degree_lat: CHAJIANG_METERS_PER_DEGREE_LAT,
        }
    }

    pub fn preset(name: &str) -> Option<RegionConfig> {
        match name {
            "chajiang" => Some(Self::chajiang()),
            _ => None,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }

    /// Reads a JSON region description. Absent fields keep their defaults.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let config: RegionConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.meters_per_degree_lng.is_normal() && self.meters_per_degree_lat.is_normal()) {
            return Err(Error::InvalidConfig(
                "meters per degree must be non-zero finite numbers".to_string(),
            ));
        }
        let b = &self.bounds;
        if !(b.min_lng <= b.max_lng && b.min_lat <= b.max_lat) {
            return Err(Error::InvalidConfig(format!(
                "empty bounds: lng {}..{}, lat {}..{}",
                b.min_lng, b.max_lng, b.min_lat, b.max_lat
            )));
        }
        if !self.bounds.contains(self.fallback_center) {
            return Err(Error::InvalidConfig(format!(
                "fallback center {:?} is outside the bounds",
                self.fallback_center
            )));
        }
        if !self.grid_anchor.iter().chain(&self.geo_anchor).all(|v| v.is_finite()) {
            return Err(Error::InvalidConfig("anchors must be finite".to_string()));
        }
        Ok(())
    }
}
