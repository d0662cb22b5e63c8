//! # Depth-phase analysis
//!
//! Surface-reflected phases (pP, sP, ...) trail their direct reference
//! phase by a time that depends almost entirely on source depth, which
//! makes the observed (depth phase − reference) separation a powerful
//! depth constraint when the direct arrivals alone leave depth
//! ill-conditioned.
//!
//! This module defines the value types of the analysis:
//!
//! * [`DepthPhaseConfig`] — tunable parameters, with a validating
//!   builder ([`DepthPhaseConfig::builder`]).
//! * [`DepthPhaseObservation`] — one paired (depth phase, reference)
//!   pick with its residual bookkeeping.
//! * [`DepthPhaseResult`] — outcome of [`analyze`](analyzer::DepthPhaseAnalyzer::analyze).
//!
//! The algorithmic entry point is [`analyzer::DepthPhaseAnalyzer`];
//! the phase/reference pairing rules live in [`catalog`].

pub mod analyzer;
pub mod catalog;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Epoch, Kilometer, Seconds};
use crate::hypodepth_errors::HypodepthError;

/// Parameters of the depth-phase analysis.
///
/// Fields
/// -----------------
/// * `phases` – depth phases considered when pairing picks.
/// * `min_depth`, `max_depth` – depth range (km) scanned by the inversion;
///   analysis is skipped for sources outside this range.
/// * `min_distance`, `max_distance` – epicentral distance window (deg)
///   in which depth phases are considered reliable.
/// * `max_residual` – acceptance threshold (s) on |observed − theoretical|
///   time difference.
/// * `min_phase_count` – valid observations required before inverting.
/// * `weight` – weight assigned to each depth-phase observation,
///   relative to a direct P pick in the parent locator.
/// * `search_window_before` – seconds before a reference pick in which a
///   depth phase is searched.
/// * `search_window_after` – seconds after the theoretical depth-phase
///   time in which a pick still matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthPhaseConfig {
    pub phases: Vec<String>,
    pub min_depth: Kilometer,
    pub max_depth: Kilometer,
    pub min_distance: Degree,
    pub max_distance: Degree,
    pub max_residual: Seconds,
    pub min_phase_count: usize,
    pub weight: f64,
    pub search_window_before: Seconds,
    pub search_window_after: Seconds,
}

impl Default for DepthPhaseConfig {
    fn default() -> Self {
        DepthPhaseConfig {
            phases: vec!["pP".to_string(), "sP".to_string(), "pwP".to_string()],
            min_depth: 15.0,
            max_depth: 700.0,
            min_distance: 30.0,
            max_distance: 90.0,
            max_residual: 3.0,
            min_phase_count: 3,
            weight: 1.5,
            search_window_before: 5.0,
            search_window_after: 10.0,
        }
    }
}

impl DepthPhaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fluent builder over the defaults, validated at
    /// [`build`](DepthPhaseConfigBuilder::build).
    pub fn builder() -> DepthPhaseConfigBuilder {
        DepthPhaseConfigBuilder::new()
    }
}

impl fmt::Display for DepthPhaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DepthPhaseConfig(phases=[{}], depth {}..{} km, distance {}..{} deg, \
             residual<={} s, min count {}, weight {:.2})",
            self.phases.join(","),
            self.min_depth,
            self.max_depth,
            self.min_distance,
            self.max_distance,
            self.max_residual,
            self.min_phase_count,
            self.weight,
        )
    }
}

/// Builder for [`DepthPhaseConfig`], with validation.
#[derive(Debug, Clone, Default)]
pub struct DepthPhaseConfigBuilder {
    config: DepthPhaseConfig,
}

impl DepthPhaseConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DepthPhaseConfig::default(),
        }
    }

    pub fn phases<I, S>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.phases = phases.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_depth(mut self, v: Kilometer) -> Self {
        self.config.min_depth = v;
        self
    }

    pub fn max_depth(mut self, v: Kilometer) -> Self {
        self.config.max_depth = v;
        self
    }

    pub fn min_distance(mut self, v: Degree) -> Self {
        self.config.min_distance = v;
        self
    }

    pub fn max_distance(mut self, v: Degree) -> Self {
        self.config.max_distance = v;
        self
    }

    pub fn max_residual(mut self, v: Seconds) -> Self {
        self.config.max_residual = v;
        self
    }

    pub fn min_phase_count(mut self, v: usize) -> Self {
        self.config.min_phase_count = v;
        self
    }

    pub fn weight(mut self, v: f64) -> Self {
        self.config.weight = v;
        self
    }

    pub fn search_window_before(mut self, v: Seconds) -> Self {
        self.config.search_window_before = v;
        self
    }

    pub fn search_window_after(mut self, v: Seconds) -> Self {
        self.config.search_window_after = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(std::cmp::Ordering::Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(
            x.partial_cmp(&0.0),
            Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
        )
    }

    /// Validate and produce the final [`DepthPhaseConfig`].
    ///
    /// Validation rules
    /// -----------------
    /// * `phases` non-empty, every entry a known depth phase.
    /// * `0 <= min_depth <= max_depth`, `0 <= min_distance <= max_distance`.
    /// * `max_residual > 0`, `weight > 0`, `min_phase_count >= 1`.
    /// * Search windows non-negative.
    pub fn build(self) -> Result<DepthPhaseConfig, HypodepthError> {
        let c = &self.config;

        if c.phases.is_empty() {
            return Err(HypodepthError::InvalidDepthPhaseParameter(
                "phases must not be empty".into(),
            ));
        }
        if let Some(unknown) = c.phases.iter().find(|p| !catalog::is_depth_phase(p)) {
            return Err(HypodepthError::InvalidDepthPhaseParameter(format!(
                "'{unknown}' is not a depth phase"
            )));
        }
        if !Self::ge0(c.min_depth) || !(c.min_depth <= c.max_depth) {
            return Err(HypodepthError::InvalidDepthPhaseParameter(
                "require 0 <= min_depth <= max_depth".into(),
            ));
        }
        if !Self::ge0(c.min_distance) || !(c.min_distance <= c.max_distance) {
            return Err(HypodepthError::InvalidDepthPhaseParameter(
                "require 0 <= min_distance <= max_distance".into(),
            ));
        }
        if !Self::gt0(c.max_residual) {
            return Err(HypodepthError::InvalidDepthPhaseParameter(
                "max_residual must be > 0".into(),
            ));
        }
        if !Self::gt0(c.weight) {
            return Err(HypodepthError::InvalidDepthPhaseParameter(
                "weight must be > 0".into(),
            ));
        }
        if c.min_phase_count < 1 {
            return Err(HypodepthError::InvalidDepthPhaseParameter(
                "min_phase_count must be >= 1".into(),
            ));
        }
        if !Self::ge0(c.search_window_before) || !Self::ge0(c.search_window_after) {
            return Err(HypodepthError::InvalidDepthPhaseParameter(
                "search windows must be non-negative".into(),
            ));
        }

        Ok(self.config)
    }
}

/// One paired (depth phase, reference phase) pick at a station.
///
/// Invariant: `is_valid` implies `weight > 0` and finite time
/// differences; invalid records are carried for diagnostics but ignored
/// by every downstream computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthPhaseObservation {
    /// Phase code (pP, sP, ...).
    pub phase: String,
    /// Reference phase the separation is measured against (usually P).
    pub reference_phase: String,
    pub network_code: String,
    pub station_code: String,
    /// Station coordinates, kept so theoretical separations can be
    /// re-evaluated at trial depths during the inversion.
    pub station_latitude: Degree,
    pub station_longitude: Degree,
    /// Station elevation in meters.
    pub station_elevation: f64,
    /// Observed depth-phase arrival (epoch seconds).
    pub observed_time: Epoch,
    /// Theoretical depth-phase arrival at the analysis depth (epoch seconds).
    pub theoretical_time: Epoch,
    /// observed − theoretical time difference (s).
    pub residual: Seconds,
    /// Observed depth-phase − reference separation (s).
    pub time_difference_obs: Seconds,
    /// Theoretical separation at the analysis depth (s).
    pub time_difference_theo: Seconds,
    /// Epicentral distance (deg).
    pub distance: Degree,
    pub weight: f64,
    pub is_valid: bool,
}

/// Result of a depth-phase analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthPhaseResult {
    pub success: bool,
    /// Estimated depth (km); 0 when the analysis did not succeed.
    pub depth: Kilometer,
    /// Coarse symmetric uncertainty (km).
    pub depth_uncertainty: Kilometer,
    pub depth_lower_bound: Kilometer,
    pub depth_upper_bound: Kilometer,
    /// Number of valid observations.
    pub observation_count: usize,
    pub mean_residual: Seconds,
    pub rms_residual: Seconds,
    /// "pP-P", "sP-P", ... when a single phase contributed, else "combined".
    pub method: String,
    /// Every constructed observation, valid or not.
    pub observations: Vec<DepthPhaseObservation>,
}
