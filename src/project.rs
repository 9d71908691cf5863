//! Point-by-point conversion of raw coordinates to WGS84 longitude/latitude.
//!
//! The source coordinate system is not tagged in the input, so it is guessed
//! for every point:
//!
//! 1. non-finite values fall back to the region center,
//! 2. values already inside the region's lng/lat window are kept,
//! 3. eastings above the legacy grid threshold are converted with a planar
//!    offset from a known anchor; a result outside the region falls back,
//! 4. anything else falls back to the region center.
//!
//! Step 3 is a local linear approximation. It is only meaningful close to the
//! anchor and is not a geodetic inverse projection of the legacy grid.

use crate::data::Point;
use crate::region::RegionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NonFinite,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Already WGS84 degrees within the region.
    Degrees(Point),
    /// Converted from the legacy large-grid system.
    LegacyGrid(Point),
    /// Not convertible; the region's fallback center.
    Fallback { point: Point, reason: FallbackReason },
}

impl Projection {
    pub fn point(&self) -> Point {
        match *self {
            Projection::Degrees(point)
            | Projection::LegacyGrid(point)
            | Projection::Fallback { point, .. } => point,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Projection::Fallback { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Projector {
    region: RegionConfig,
}

impl Projector {
    pub fn new(region: RegionConfig) -> Self {
        Self { region }
    }

    pub fn region(&self) -> &RegionConfig {
        &self.region
    }

    pub fn project(&self, x: f64, y: f64) -> Projection {
        let region = &self.region;

        if !(x.is_finite() && y.is_finite()) {
            log::warn!("Invalid coordinate value: ({}, {})", x, y);
            return Projection::Fallback {
                point: region.fallback_center,
                reason: FallbackReason::NonFinite,
            };
        }

        if region.contains([x, y]) {
            return Projection::Degrees([x, y]);
        }

        if x > region.grid_threshold {
            let delta_x = x - region.grid_anchor[0];
            let delta_y = y - region.grid_anchor[1];
            let lng = region.geo_anchor[0] + delta_x / region.meters_per_degree_lng;
            let lat = region.geo_anchor[1] + delta_y / region.meters_per_degree_lat;
            if region.contains([lng, lat]) {
                log::trace!("Legacy grid ({}, {}) -> ({}, {})", x, y, lng, lat);
                return Projection::LegacyGrid([lng, lat]);
            }
            log::warn!(
                "Legacy grid coordinate ({}, {}) converts outside the region: ({}, {})",
                x,
                y,
                lng,
                lat
            );
            return Projection::Fallback {
                point: region.fallback_center,
                reason: FallbackReason::OutOfRange,
            };
        }

        log::warn!("Coordinate out of known range: ({}, {})", x, y);
        Projection::Fallback {
            point: region.fallback_center,
            reason: FallbackReason::OutOfRange,
        }
    }
}

/// Projects with the default region.
pub fn project(x: f64, y: f64) -> Point {
    Projector::default().project(x, y).point()
}
