use serde::Serialize;
use serde_json::{Map, Value};

/// `[x, y]` before projection, `[lng, lat]` after.
pub type Point = [f64; 2];

pub type Ring = Vec<Point>;

pub type Properties = Map<String, Value>;

/// `[min_x, min_y, max_x, max_y]`
pub type BBox = [f64; 4];

// Members the source document carries besides the ones modelled here
// (`bbox`, `crs`, `name`, ...) are kept in `extra` and written back as-is.

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "Polygon")]
pub struct Polygon {
    /// Exterior ring first, then holes. Ring and point order encode winding.
    pub coordinates: Vec<Ring>,
    #[serde(flatten)]
    pub extra: Properties,
}

impl Polygon {
    pub fn new(coordinates: Vec<Ring>) -> Self {
        Self {
            coordinates,
            extra: Properties::new(),
        }
    }

    pub fn num_points(&self) -> usize {
        self.coordinates.iter().map(Vec::len).sum()
    }

    pub fn bbox(&self) -> Option<BBox> {
        bbox_of(self.coordinates.iter().flatten())
    }

    /// Applies `f` to every point, keeping ring and point order.
    pub fn map_points<F>(&self, mut f: F) -> Polygon
    where
        F: FnMut(Point) -> Point,
    {
        Polygon {
            coordinates: self
                .coordinates
                .iter()
                .map(|ring| ring.iter().map(|&point| f(point)).collect())
                .collect(),
            extra: self.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Polygon,
    pub properties: Properties,
    #[serde(flatten)]
    pub extra: Properties,
}

impl Feature {
    pub fn new(geometry: Polygon, properties: Properties) -> Self {
        Self {
            id: None,
            geometry,
            properties,
            extra: Properties::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub extra: Properties,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            extra: Properties::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn num_points(&self) -> usize {
        self.features.iter().map(|f| f.geometry.num_points()).sum()
    }

    pub fn bbox(&self) -> Option<BBox> {
        bbox_of(
            self.features
                .iter()
                .flat_map(|f| f.geometry.coordinates.iter().flatten()),
        )
    }

    #[cfg(feature = "geo")]
    pub fn to_geo(&self) -> geo::geometry::MultiPolygon<f64> {
        self.features
            .iter()
            .map(|feature| geo::geometry::Polygon::from(&feature.geometry))
            .collect()
    }
}

fn bbox_of<'a>(points: impl Iterator<Item = &'a Point>) -> Option<BBox> {
    points.fold(None, |acc, &[x, y]| {
        Some(match acc {
            None => [x, y, x, y],
            Some([min_x, min_y, max_x, max_y]) => {
                [min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y)]
            }
        })
    })
}

/// Rewrites an existing `bbox` member after the coordinates it describes moved.
pub(crate) fn refresh_bbox(extra: &mut Properties, bbox: Option<BBox>) {
    if !extra.contains_key("bbox") {
        return;
    }
    match bbox {
        Some(bbox) => {
            extra.insert("bbox".to_string(), Value::from(bbox.to_vec()));
        }
        None => {
            extra.remove("bbox");
        }
    }
}

#[cfg(feature = "geo")]
fn ring_to_geo_linestring(ring: &[Point]) -> geo::geometry::LineString<f64> {
    ring.iter()
        .map(|point| geo::Coord {
            x: point[0],
            y: point[1],
        })
        .collect()
}

#[cfg(feature = "geo")]
impl From<&Polygon> for geo::geometry::Polygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        let Some((exterior, interiors)) = polygon.coordinates.split_first() else {
            return geo::geometry::Polygon::new(geo::geometry::LineString::new(vec![]), vec![]);
        };
        geo::geometry::Polygon::new(
            ring_to_geo_linestring(exterior),
            interiors
                .iter()
                .map(|ring| ring_to_geo_linestring(ring))
                .collect(),
        )
    }
}
