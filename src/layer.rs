//! Named map overlay layers and their display styles.
//!
//! The catalog only describes layers; drawing them is up to the map client.
//! A layer with a `source` points at an overlay document that can be fed
//! through the normalizer.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::normalize::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Base,
    Planning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    /// Stroke and fill color, e.g. `#4a90e2`.
    pub color: String,
    pub fill_opacity: f64,
    /// Stroke width in pixels.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub visible: bool,
    pub style: LayerStyle,
    /// Path or URL of the overlay document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Layer {
    fn builtin(
        id: &str,
        name: &str,
        kind: LayerKind,
        visible: bool,
        color: &str,
        fill_opacity: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            visible,
            style: LayerStyle {
                color: color.to_string(),
                fill_opacity,
                weight: 1.0,
            },
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerCatalog {
    layers: Vec<Layer>,
}

impl Default for LayerCatalog {
    fn default() -> Self {
        Self {
            layers: vec![
                Layer::builtin("terrain", "地形图层", LayerKind::Base, true, "#a1a1a1", 0.5),
                Layer::builtin("hydrology", "水系图层", LayerKind::Base, true, "#4a90e2", 0.6),
                Layer::builtin(
                    "current-land-use",
                    "现状用地",
                    LayerKind::Planning,
                    false,
                    "#82c91e",
                    0.7,
                ),
                Layer::builtin(
                    "planning-land-use",
                    "规划用地",
                    LayerKind::Planning,
                    false,
                    "#f59f00",
                    0.7,
                ),
            ],
        }
    }
}

impl LayerCatalog {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Reads a JSON array of layers.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn of_kind(&self, kind: LayerKind) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(move |layer| layer.kind == kind)
    }

    pub fn visible(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|layer| layer.visible)
    }

    /// Returns `false` when no layer has this id.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.layers.iter_mut().find(|layer| layer.id == id) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        match self.layers.iter_mut().find(|layer| layer.id == id) {
            Some(layer) => {
                layer.visible = !layer.visible;
                true
            }
            None => false,
        }
    }
}
