//! # Geographic features
//!
//! Named polygons with string attributes, loaded from line-delimited
//! polygon files (see [`bna_reader`]). A [`GeoFeatureSet`] is an
//! ordered, enumeration-only store; consumers walk it and keep
//! [`Arc<GeoFeature>`] handles to the features they care about.

pub mod bna_reader;

use std::collections::HashMap;
use std::sync::Arc;

use camino::Utf8Path;

use crate::constants::Degree;
use crate::hypodepth_errors::HypodepthError;

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: Degree,
    pub longitude: Degree,
}

impl GeoCoordinate {
    pub fn new(latitude: Degree, longitude: Degree) -> Self {
        GeoCoordinate {
            latitude,
            longitude,
        }
    }
}

/// A named polygon with key-value attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    name: String,
    rank: u32,
    attributes: HashMap<String, String>,
    vertices: Vec<GeoCoordinate>,
}

impl GeoFeature {
    pub fn new(
        name: impl Into<String>,
        rank: u32,
        attributes: HashMap<String, String>,
        vertices: Vec<GeoCoordinate>,
    ) -> Self {
        GeoFeature {
            name: name.into(),
            rank,
            attributes,
            vertices,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn vertices(&self) -> &[GeoCoordinate] {
        &self.vertices
    }

    /// Whether the polygon contains `point`.
    ///
    /// Even-odd ray crossing on the lon/lat plane: works for clockwise
    /// and counter-clockwise rings, the closing edge is implied, and a
    /// repeated closing vertex is harmless (its edge has zero length).
    pub fn contains(&self, point: &GeoCoordinate) -> bool {
        let vertices = &self.vertices;
        if vertices.len() < 3 {
            return false;
        }

        let px = point.longitude;
        let py = point.latitude;

        let mut inside = false;
        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (xi, yi) = (vertices[i].longitude, vertices[i].latitude);
            let (xj, yj) = (vertices[j].longitude, vertices[j].latitude);

            if (yi > py) != (yj > py) {
                let x_cross = xj + (py - yj) * (xi - xj) / (yi - yj);
                if px < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }

        inside
    }
}

/// Ordered collection of geographic features.
#[derive(Debug, Clone, Default)]
pub struct GeoFeatureSet {
    features: Vec<Arc<GeoFeature>>,
}

impl GeoFeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feature(&mut self, feature: GeoFeature) {
        self.features.push(Arc::new(feature));
    }

    /// Features in insertion order.
    pub fn features(&self) -> &[Arc<GeoFeature>] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Parse polygons from line-delimited polygon text.
    pub fn from_bna_str(content: &str) -> Result<Self, HypodepthError> {
        let mut set = GeoFeatureSet::new();
        for feature in bna_reader::parse_bna(content)? {
            set.add_feature(feature);
        }
        Ok(set)
    }

    /// Load polygons from one file.
    pub fn from_bna_file(path: &Utf8Path) -> Result<Self, HypodepthError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_bna_str(&content)
    }

    /// Load every `.bna` file of a directory, in file-name order.
    pub fn from_bna_dir(dir: &Utf8Path) -> Result<Self, HypodepthError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("bna"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut set = GeoFeatureSet::new();
        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            for feature in bna_reader::parse_bna(&content)? {
                set.add_feature(feature);
            }
        }
        Ok(set)
    }
}
