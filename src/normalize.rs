use serde_json::Value;
use thiserror::Error;

use crate::adapt::{AdaptationError, Adapted, adapt};
use crate::data::{Feature, FeatureCollection, refresh_bbox};
use crate::project::Projection;
use crate::detect::{DetectionError, detect};
use crate::project::Projector;
use crate::region::RegionConfig;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid data format: {0}")]
    Detection(#[from] DetectionError),
    #[error("Invalid region config: {0}")]
    InvalidConfig(String),
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
    #[cfg(feature = "fetch")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizeReport {
    /// Entries found in the input document.
    pub input_features: usize,
    /// Entries left out of the output, in input order.
    pub dropped: Vec<AdaptationError>,
    pub points: usize,
    /// Points replaced by the fallback center.
    pub fallback_points: usize,
    /// Rings that were not arrays and were emptied.
    pub replaced_rings: usize,
}

impl NormalizeReport {
    pub fn output_features(&self) -> usize {
        self.input_features - self.dropped.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub collection: FeatureCollection,
    pub report: NormalizeReport,
}

/// Turns an overlay document into a `FeatureCollection` of WGS84 polygons.
///
/// Only an unrecognized document shape fails the call. Malformed entries are
/// dropped and unconvertible points are replaced, both reported in
/// [`NormalizeReport`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    projector: Projector,
}

impl Normalizer {
    pub fn new(region: RegionConfig) -> Self {
        Self {
            projector: Projector::new(region),
        }
    }

    pub fn region(&self) -> &RegionConfig {
        self.projector.region()
    }

    pub fn normalize(&self, raw: &Value) -> Result<Normalized, Error> {
        let classified = detect(raw)?;
        log::info!("Detected {} input", classified.kind());

        let Adapted {
            collection,
            input_features,
            dropped,
            replaced_rings,
        } = adapt(classified);

        let (features, counts) = self.project_features(collection.features);
        let mut output = FeatureCollection {
            features,
            extra: collection.extra,
        };
        if counts.moved_points > 0 {
            let bbox = output.bbox();
            refresh_bbox(&mut output.extra, bbox);
        }

        let report = NormalizeReport {
            input_features,
            dropped,
            points: output.num_points(),
            fallback_points: counts.fallback_points,
            replaced_rings,
        };

        log::info!(
            "Normalized {} of {} features ({} points, {} dropped, {} fallback points)",
            report.output_features(),
            report.input_features,
            report.points,
            report.dropped.len(),
            report.fallback_points,
        );

        Ok(Normalized {
            collection: output,
            report,
        })
    }

    #[cfg(feature = "rayon")]
    fn project_features(&self, features: Vec<Feature>) -> (Vec<Feature>, PointCounts) {
        use rayon::prelude::*;

        // `collect` on an indexed parallel iterator keeps input order.
        let projected: Vec<(Feature, PointCounts)> = features
            .into_par_iter()
            .enumerate()
            .map(|(index, feature)| self.project_feature(index, feature))
            .collect();
        unzip_counts(projected)
    }

    #[cfg(not(feature = "rayon"))]
    fn project_features(&self, features: Vec<Feature>) -> (Vec<Feature>, PointCounts) {
        let projected = features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| self.project_feature(index, feature))
            .collect();
        unzip_counts(projected)
    }

    fn project_feature(&self, index: usize, mut feature: Feature) -> (Feature, PointCounts) {
        let mut counts = PointCounts::default();
        let mut geometry = feature.geometry.map_points(|[x, y]| {
            let projection = self.projector.project(x, y);
            match projection {
                Projection::Degrees(_) => {}
                Projection::LegacyGrid(_) => counts.moved_points += 1,
                Projection::Fallback { .. } => {
                    counts.moved_points += 1;
                    counts.fallback_points += 1;
                }
            }
            projection.point()
        });
        if counts.moved_points > 0 {
            let bbox = geometry.bbox();
            refresh_bbox(&mut feature.extra, bbox);
            refresh_bbox(&mut geometry.extra, bbox);
        }
        if counts.fallback_points > 0 {
            log::warn!(
                "Feature {}: {} of {} points replaced by the fallback center",
                index,
                counts.fallback_points,
                geometry.num_points(),
            );
        } else {
            log::debug!(
                "Feature {}: {} rings, {} points",
                index,
                geometry.coordinates.len(),
                geometry.num_points(),
            );
        }
        (
            Feature {
                geometry,
                ..feature
            },
            counts,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PointCounts {
    /// Points whose output differs from the input.
    moved_points: usize,
    fallback_points: usize,
}

fn unzip_counts(projected: Vec<(Feature, PointCounts)>) -> (Vec<Feature>, PointCounts) {
    let mut total = PointCounts::default();
    let features = projected
        .into_iter()
        .map(|(feature, counts)| {
            total.moved_points += counts.moved_points;
            total.fallback_points += counts.fallback_points;
            feature
        })
        .collect();
    (features, total)
}

/// Normalizes with the default region and discards the report.
pub fn normalize(raw: &Value) -> Result<FeatureCollection, Error> {
    Ok(Normalizer::default().normalize(raw)?.collection)
}
