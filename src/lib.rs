pub mod adapt;
pub mod data;
pub mod detect;
pub mod layer;
pub mod load;
pub mod normalize;
pub mod project;
pub mod region;

pub use data::{Feature, FeatureCollection, Point, Polygon, Properties};
pub use normalize::{Error, NormalizeReport, Normalized, Normalizer, normalize};
pub use project::{Projection, Projector, project};
pub use region::RegionConfig;
