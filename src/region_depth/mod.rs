//! # Region-based depth constraints
//!
//! Geographic polygons can carry depth priors that a locator applies
//! when the data alone cannot resolve depth: a stable craton caps
//! depths at a few tens of km, a subduction zone allows 700 km, a
//! volcanic field pins the default to something very shallow.
//!
//! [`RegionDepthLookup`] resolves a configured list of region names
//! against a [`GeoFeatureSet`] once, then answers point queries by
//! walking the retained polygons in configured order: the first one
//! containing the query point wins, and its `defaultDepth`/`maxDepth`
//! attributes override the global defaults.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hypodepth::geo::GeoFeatureSet;
//! use hypodepth::region_depth::{RegionDepthConfig, RegionDepthLookup};
//!
//! # let features = GeoFeatureSet::new();
//! let mut lookup = RegionDepthLookup::new();
//! lookup.set_config(RegionDepthConfig {
//!     enabled: true,
//!     regions: vec!["stable_craton".into(), "subduction_zone".into()],
//!     ..Default::default()
//! });
//! lookup.init(&features);
//!
//! let constraints = lookup.get_constraints(37.5, -97.5);
//! if constraints.matched {
//!     println!("{}: max {} km", constraints.region_name, constraints.max_depth);
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{Degree, Kilometer};
use crate::geo::{GeoCoordinate, GeoFeature, GeoFeatureSet};

/// Attribute keys recognised on depth regions.
const DEFAULT_DEPTH_ATTRIBUTE: &str = "defaultDepth";
const MAX_DEPTH_ATTRIBUTE: &str = "maxDepth";

/// Configuration of the region-depth lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDepthConfig {
    /// Whether region-based depth constraints are applied at all.
    pub enabled: bool,
    /// Region names, checked in order; the first match wins.
    pub regions: Vec<String>,
    /// Default depth (km) when no region matches or defines one.
    pub global_default_depth: Kilometer,
    /// Maximum depth (km) when no region matches or defines one.
    pub global_max_depth: Kilometer,
}

impl Default for RegionDepthConfig {
    fn default() -> Self {
        RegionDepthConfig {
            enabled: false,
            regions: Vec::new(),
            global_default_depth: 10.0,
            global_max_depth: 700.0,
        }
    }
}

/// Depth constraints resolved for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDepthConstraints {
    /// Name of the matching region; empty when none matched.
    pub region_name: String,
    pub default_depth: Kilometer,
    pub max_depth: Kilometer,
    /// Whether the matched region itself defined the field.
    pub has_default_depth: bool,
    pub has_max_depth: bool,
    pub matched: bool,
}

/// Point query over configured depth regions.
///
/// Purely a traversal-and-merge layer: polygon membership and attribute
/// storage are the feature store's business.
#[derive(Debug, Default)]
pub struct RegionDepthLookup {
    config: RegionDepthConfig,
    regions: Vec<Arc<GeoFeature>>,
    initialized: bool,
}

impl RegionDepthLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration; retained regions are dropped and the
    /// lookup must be initialized again.
    pub fn set_config(&mut self, config: RegionDepthConfig) {
        self.config = config;
        self.regions.clear();
        self.initialized = false;
    }

    pub fn config(&self) -> &RegionDepthConfig {
        &self.config
    }

    /// Resolve the configured region names against `features`.
    ///
    /// For each configured name, in order, the first feature with that
    /// name is retained. Names not present are logged and skipped.
    ///
    /// Return
    /// ------
    /// * `true` iff at least one region was resolved. A disabled or
    ///   empty configuration leaves the lookup uninitialized.
    pub fn init(&mut self, features: &GeoFeatureSet) -> bool {
        self.regions.clear();
        self.initialized = false;

        if !self.config.enabled {
            debug!("region depth constraints disabled");
            return false;
        }

        if self.config.regions.is_empty() {
            warn!("region depth enabled but no regions configured");
            return false;
        }

        debug!(
            "loading depth regions from feature set ({} features available)",
            features.len()
        );

        for region_name in &self.config.regions {
            let Some(feature) = features
                .features()
                .iter()
                .find(|feature| feature.name() == region_name)
            else {
                warn!("depth region '{region_name}' not found in feature set");
                continue;
            };

            self.regions.push(feature.clone());

            let default_depth = parse_depth_attribute(feature, DEFAULT_DEPTH_ATTRIBUTE);
            let max_depth = parse_depth_attribute(feature, MAX_DEPTH_ATTRIBUTE);
            info!(
                "loaded depth region '{region_name}' (defaultDepth={}, maxDepth={})",
                default_depth.map_or("not set".to_string(), |d| d.to_string()),
                max_depth.map_or("not set".to_string(), |d| d.to_string()),
            );
        }

        self.initialized = !self.regions.is_empty();

        if self.initialized {
            info!(
                "region depth lookup initialized with {} regions",
                self.regions.len()
            );
        } else {
            warn!("no depth regions loaded, using global defaults");
        }

        self.initialized
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Depth constraints for a location.
    ///
    /// Retained regions are checked in configured order and the first
    /// polygon containing the point wins; attributes it defines
    /// override the global defaults. With no match (or a disabled or
    /// empty lookup) the globals are returned with `matched` false.
    pub fn get_constraints(&self, latitude: Degree, longitude: Degree) -> RegionDepthConstraints {
        let mut result = RegionDepthConstraints {
            region_name: String::new(),
            default_depth: self.config.global_default_depth,
            max_depth: self.config.global_max_depth,
            has_default_depth: false,
            has_max_depth: false,
            matched: false,
        };

        if !self.config.enabled || self.regions.is_empty() {
            return result;
        }

        let location = GeoCoordinate::new(latitude, longitude);

        for region in &self.regions {
            if !region.contains(&location) {
                continue;
            }

            result.region_name = region.name().to_string();
            result.matched = true;

            if let Some(depth) = parse_depth_attribute(region, DEFAULT_DEPTH_ATTRIBUTE) {
                result.default_depth = depth;
                result.has_default_depth = true;
            }
            if let Some(depth) = parse_depth_attribute(region, MAX_DEPTH_ATTRIBUTE) {
                result.max_depth = depth;
                result.has_max_depth = true;
            }

            debug!(
                "location {latitude:.2}/{longitude:.2} matched region '{}' \
                 (defaultDepth={:.1} km, maxDepth={:.1} km)",
                result.region_name, result.default_depth, result.max_depth
            );

            // First match wins.
            return result;
        }

        debug!(
            "location {latitude:.2}/{longitude:.2} matched no region, using global defaults \
             (defaultDepth={:.1} km, maxDepth={:.1} km)",
            result.default_depth, result.max_depth
        );

        result
    }

    /// Default depth for a location.
    pub fn get_default_depth(&self, latitude: Degree, longitude: Degree) -> Kilometer {
        self.get_constraints(latitude, longitude).default_depth
    }

    /// Maximum depth for a location.
    pub fn get_max_depth(&self, latitude: Degree, longitude: Degree) -> Kilometer {
        self.get_constraints(latitude, longitude).max_depth
    }

    /// Number of retained regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Names of the retained regions, in configured order.
    pub fn region_names(&self) -> Vec<String> {
        self.regions
            .iter()
            .map(|region| region.name().to_string())
            .collect()
    }
}

/// Parse a depth attribute of a region as km.
///
/// A missing attribute and an unparsable one are both `None`; the
/// latter is logged so broken region files get noticed.
fn parse_depth_attribute(feature: &GeoFeature, attribute: &str) -> Option<Kilometer> {
    let raw = feature.attributes().get(attribute)?;
    match raw.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(
                "failed to parse {attribute}='{raw}' for region '{}'",
                feature.name()
            );
            None
        }
    }
}
