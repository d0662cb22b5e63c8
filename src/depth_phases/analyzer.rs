//! Depth-phase analyzer: pick classification and depth inversion.
//!
//! The analyzer pairs depth-phase picks with same-station reference
//! picks, turns each pair into a [`DepthPhaseObservation`], and inverts
//! the observed time separations for source depth with a three-pass
//! hierarchical grid search over the travel-time forward model.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hypodepth::depth_phases::analyzer::DepthPhaseAnalyzer;
//! use hypodepth::depth_phases::DepthPhaseConfig;
//! # let arrivals: Vec<hypodepth::arrivals::Arrival> = vec![];
//!
//! let mut analyzer = DepthPhaseAnalyzer::new();
//! analyzer.set_config(DepthPhaseConfig::default());
//! analyzer.set_travel_time_table_by_name("homogeneous", "iasp91");
//!
//! let result = analyzer.analyze(54.2, 158.9, 120.0, 1_700_000_000.0, &arrivals);
//! if result.success {
//!     println!("depth = {:.1} km", result.depth);
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use itertools::Itertools;
use tracing::{debug, error, warn};

use crate::arrivals::ArrivalLike;
use crate::constants::{Degree, Epoch, Kilometer, Seconds, StationKey, TravelTimeList};
use crate::geodesy::epicentral_distance;
use crate::travel_time::{registry, Hypocenter, Receiver, TravelTimeTable};

use super::catalog;
use super::{DepthPhaseConfig, DepthPhaseObservation, DepthPhaseResult};

/// Step of the first (coarse) scan over the full depth range (km).
const COARSE_STEP: Kilometer = 10.0;
/// Step and half-window of the second scan around the coarse optimum (km).
const FINE_STEP: Kilometer = 1.0;
const FINE_HALF_WINDOW: Kilometer = 20.0;
/// Step and half-window of the final scan (km).
const FINEST_STEP: Kilometer = 0.5;
const FINEST_HALF_WINDOW: Kilometer = 5.0;
/// Misfit excess (s) delimiting the coarse uncertainty bracket.
const BOUNDS_TOLERANCE: Seconds = 1.0;

/// Analyzer for constraining earthquake depths from depth phases.
///
/// The pP-P (or sP-P) separation is primarily sensitive to source depth
/// and only weakly to epicentral distance, so a handful of consistent
/// pairs constrains depth far better than the direct arrivals do.
///
/// The analyzer is `Uninitialized` until a travel-time table is
/// adopted; every compute operation in that state returns its empty or
/// sentinel value without side effects.
pub struct DepthPhaseAnalyzer {
    config: DepthPhaseConfig,
    table: Option<Arc<dyn TravelTimeTable>>,
}

impl DepthPhaseAnalyzer {
    pub fn new() -> Self {
        DepthPhaseAnalyzer {
            config: DepthPhaseConfig::default(),
            table: None,
        }
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: DepthPhaseConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &DepthPhaseConfig {
        &self.config
    }

    /// Adopt a shared travel-time table; the analyzer becomes ready.
    pub fn set_travel_time_table(&mut self, table: Arc<dyn TravelTimeTable>) -> bool {
        self.table = Some(table);
        true
    }

    /// Construct a travel-time table by registry type name, then select
    /// `model` on it. On either failure the analyzer is left without a
    /// table.
    pub fn set_travel_time_table_by_name(&mut self, table_type: &str, model: &str) -> bool {
        let Some(mut table) = registry::create(table_type) else {
            error!("failed to create travel time table '{table_type}'");
            self.table = None;
            return false;
        };

        if !table.set_model(model) {
            error!("failed to set travel time model '{model}'");
            self.table = None;
            return false;
        }

        debug!("using travel time table {table_type} with model {model}");
        self.table = Some(Arc::from(table));
        true
    }

    /// Whether a travel-time table has been adopted.
    pub fn is_ready(&self) -> bool {
        self.table.is_some()
    }

    /// Whether `phase` is a surface-reflected depth phase.
    pub fn is_depth_phase(phase: &str) -> bool {
        catalog::is_depth_phase(phase)
    }

    /// The direct phase paired with `depth_phase` (`P` when unknown).
    pub fn reference_phase_of(depth_phase: &str) -> &'static str {
        catalog::reference_phase_of(depth_phase)
    }

    /// Theoretical arrivals for this geometry, restricted to `phases`
    /// (or to the configured phases when `phases` is empty).
    ///
    /// Return
    /// ------
    /// * The filtered travel times; empty when no table is configured or
    ///   the model has nothing for this geometry.
    pub fn compute_depth_phase_times(
        &self,
        source: &Hypocenter,
        receiver: &Receiver,
        phases: &[String],
    ) -> TravelTimeList {
        let Some(table) = &self.table else {
            warn!("no travel time table configured");
            return TravelTimeList::new();
        };

        let all = match table.compute_all(source, receiver) {
            Ok(list) => list,
            Err(err) => {
                debug!("travel time computation failed: {err}");
                return TravelTimeList::new();
            }
        };

        let targets = if phases.is_empty() {
            &self.config.phases
        } else {
            phases
        };

        all.into_iter()
            .filter(|tt| targets.iter().any(|phase| *phase == tt.phase))
            .collect()
    }

    /// Theoretical (depth phase − reference phase) separation in seconds.
    ///
    /// Return
    /// ------
    /// * The separation when both arrivals exist with positive times;
    ///   `-1.0` when no table is configured or either phase is missing.
    pub fn compute_depth_phase_time_difference(
        &self,
        depth_phase: &str,
        source: &Hypocenter,
        receiver: &Receiver,
    ) -> Seconds {
        match self.depth_phase_pair(depth_phase, source, receiver) {
            Some((time_depth, time_reference)) => time_depth - time_reference,
            None => -1.0,
        }
    }

    /// Travel times of a depth phase and its reference phase, when both
    /// are available with positive times. Oracle failures are demoted to
    /// `None` so callers skip the observation instead of seeing a zero.
    fn depth_phase_pair(
        &self,
        depth_phase: &str,
        source: &Hypocenter,
        receiver: &Receiver,
    ) -> Option<(Seconds, Seconds)> {
        let table = self.table.as_ref()?;
        let reference = catalog::reference_phase_of(depth_phase);

        let time_depth = match table.compute_phase(depth_phase, source, receiver) {
            Ok(tt) => tt.time,
            Err(err) => {
                debug!("failed to compute {depth_phase} time: {err}");
                return None;
            }
        };
        let time_reference = match table.compute_phase(reference, source, receiver) {
            Ok(tt) => tt.time,
            Err(err) => {
                debug!("failed to compute {reference} time: {err}");
                return None;
            }
        };

        (time_depth > 0.0 && time_reference > 0.0).then_some((time_depth, time_reference))
    }

    /// Examine picks for depth phases and estimate the source depth.
    ///
    /// Every pick whose phase is a configured depth phase is paired
    /// with the first same-station pick carrying its reference phase;
    /// each pair becomes a [`DepthPhaseObservation`] with the observed
    /// and theoretical separations and their residual. Stations outside
    /// the configured distance window are skipped, as is the whole
    /// analysis when the source depth lies outside the inversion range.
    ///
    /// Arguments
    /// ---------
    /// * `latitude`, `longitude`: epicenter in degrees.
    /// * `depth`: current depth estimate in km.
    /// * `origin_time`: origin time as epoch seconds.
    /// * `arrivals`: picks from any container of [`ArrivalLike`] items.
    ///
    /// Return
    /// ------
    /// * A [`DepthPhaseResult`]; `success` is false when fewer than the
    ///   configured number of valid observations were found (counts and
    ///   residual statistics are still populated), or when the inversion
    ///   failed.
    pub fn analyze<A: ArrivalLike>(
        &self,
        latitude: Degree,
        longitude: Degree,
        depth: Kilometer,
        origin_time: Epoch,
        arrivals: &[A],
    ) -> DepthPhaseResult {
        let mut result = DepthPhaseResult::default();

        if self.table.is_none() {
            debug!("no travel time table configured, skipping depth phase analysis");
            return result;
        }

        if depth < self.config.min_depth || depth > self.config.max_depth {
            debug!(
                "source depth {depth:.1} km outside [{}, {}], skipping depth phase analysis",
                self.config.min_depth, self.config.max_depth
            );
            return result;
        }

        // Same-station pick lookup, preserving arrival order.
        let mut by_station: HashMap<StationKey, Vec<usize>, RandomState> = HashMap::default();
        for (idx, arrival) in arrivals.iter().enumerate() {
            let key = (
                arrival.network_code().to_string(),
                arrival.station_code().to_string(),
            );
            by_station.entry(key).or_default().push(idx);
        }

        let source = Hypocenter::new(latitude, longitude, depth);
        let mut observations: Vec<DepthPhaseObservation> = Vec::new();

        for (idx, arrival) in arrivals.iter().enumerate() {
            let phase = arrival.phase();
            if !self.config.phases.iter().any(|p| p == phase) || !catalog::is_depth_phase(phase) {
                continue;
            }

            let reference = catalog::reference_phase_of(phase);
            let key = (
                arrival.network_code().to_string(),
                arrival.station_code().to_string(),
            );
            let reference_idx = by_station.get(&key).and_then(|indices| {
                indices
                    .iter()
                    .copied()
                    .find(|&j| j != idx && arrivals[j].phase() == reference)
            });
            let Some(reference_idx) = reference_idx else {
                debug!(
                    "no {reference} pick for {phase} at {}.{}",
                    key.0, key.1
                );
                continue;
            };
            let reference_arrival = &arrivals[reference_idx];

            let receiver = Receiver::new(
                arrival.station_latitude(),
                arrival.station_longitude(),
                arrival.station_elevation(),
            );
            let distance =
                epicentral_distance(latitude, longitude, receiver.latitude, receiver.longitude);
            if distance < self.config.min_distance || distance > self.config.max_distance {
                debug!(
                    "station {}.{} at {distance:.1} deg outside depth phase window",
                    key.0, key.1
                );
                continue;
            }

            let Some((time_depth, time_reference)) =
                self.depth_phase_pair(phase, &source, &receiver)
            else {
                continue;
            };

            let theoretical_time = origin_time + time_depth;
            let earliest = reference_arrival.arrival_time() - self.config.search_window_before;
            let latest = theoretical_time + self.config.search_window_after;
            if arrival.arrival_time() < earliest || arrival.arrival_time() > latest {
                debug!(
                    "{phase} pick at {}.{} outside search window",
                    key.0, key.1
                );
                continue;
            }

            let time_difference_obs = arrival.arrival_time() - reference_arrival.arrival_time();
            let time_difference_theo = time_depth - time_reference;
            let residual = time_difference_obs - time_difference_theo;

            observations.push(DepthPhaseObservation {
                phase: phase.to_string(),
                reference_phase: reference.to_string(),
                network_code: key.0,
                station_code: key.1,
                station_latitude: receiver.latitude,
                station_longitude: receiver.longitude,
                station_elevation: receiver.elevation,
                observed_time: arrival.arrival_time(),
                theoretical_time,
                residual,
                time_difference_obs,
                time_difference_theo,
                distance,
                weight: self.config.weight,
                is_valid: residual.abs() <= self.config.max_residual,
            });
        }

        let valid_count = observations.iter().filter(|o| o.is_valid).count();
        result.observation_count = valid_count;

        if valid_count > 0 {
            let residuals = observations
                .iter()
                .filter(|o| o.is_valid)
                .map(|o| o.residual);
            result.mean_residual = residuals.clone().sum::<f64>() / valid_count as f64;
            result.rms_residual =
                (residuals.map(|r| r * r).sum::<f64>() / valid_count as f64).sqrt();

            let contributing: Vec<&DepthPhaseObservation> =
                observations.iter().filter(|o| o.is_valid).collect();
            let phases: Vec<&str> = contributing
                .iter()
                .map(|o| o.phase.as_str())
                .unique()
                .collect();
            result.method = if phases.len() == 1 {
                format!("{}-{}", phases[0], contributing[0].reference_phase)
            } else {
                "combined".to_string()
            };
        }

        if valid_count < self.config.min_phase_count {
            debug!(
                "not enough valid depth phase observations ({valid_count} < {})",
                self.config.min_phase_count
            );
            result.observations = observations;
            return result;
        }

        let inverted = self.invert_for_depth(latitude, longitude, &observations, depth);
        if inverted >= 0.0 {
            result.success = true;
            result.depth = inverted;
            if let Some((lower, upper)) =
                self.depth_bounds(latitude, longitude, &observations, inverted)
            {
                result.depth_lower_bound = lower;
                result.depth_upper_bound = upper;
                result.depth_uncertainty = (upper - lower) / 2.0;
            }
        }

        result.observations = observations;
        result
    }

    /// Invert depth-phase observations for source depth.
    ///
    /// Three grid-search passes narrow the depth: 10 km steps over the
    /// configured range, 1 km steps over ±20 km around the coarse
    /// optimum, then 0.5 km steps over ±5 km. The misfit at a trial
    /// depth is the weight-normalised RMS of the residuals between the
    /// observed separations and the separations the travel-time table
    /// predicts at that depth. Ties keep the shallowest depth tested.
    ///
    /// `_initial_depth` is accepted for interface compatibility with
    /// iterative refinement strategies; the hierarchical scan does not
    /// need a starting point.
    ///
    /// Return
    /// ------
    /// * The best depth in km, or `-1.0` when no table is configured,
    ///   `observations` is empty, or too few of them are valid.
    pub fn invert_for_depth(
        &self,
        latitude: Degree,
        longitude: Degree,
        observations: &[DepthPhaseObservation],
        _initial_depth: Kilometer,
    ) -> Kilometer {
        if observations.is_empty() {
            return -1.0;
        }

        if self.table.is_none() {
            warn!("no travel time table configured for depth inversion");
            return -1.0;
        }

        let valid_count = observations.iter().filter(|o| o.is_valid).count();
        if valid_count < self.config.min_phase_count {
            debug!(
                "not enough valid depth phase observations ({valid_count} < {})",
                self.config.min_phase_count
            );
            return -1.0;
        }

        let Some(best) = self.grid_search_depth(
            latitude,
            longitude,
            observations,
            self.config.min_depth,
            self.config.max_depth,
            COARSE_STEP,
        ) else {
            return -1.0;
        };

        let min_search = (best - FINE_HALF_WINDOW).max(self.config.min_depth);
        let max_search = (best + FINE_HALF_WINDOW).min(self.config.max_depth);
        let Some(best) = self.grid_search_depth(
            latitude,
            longitude,
            observations,
            min_search,
            max_search,
            FINE_STEP,
        ) else {
            return -1.0;
        };

        let min_search = (best - FINEST_HALF_WINDOW).max(self.config.min_depth);
        let max_search = (best + FINEST_HALF_WINDOW).min(self.config.max_depth);
        let Some(best) = self.grid_search_depth(
            latitude,
            longitude,
            observations,
            min_search,
            max_search,
            FINEST_STEP,
        ) else {
            return -1.0;
        };

        debug!("depth phase inversion result: {best:.1} km (from {valid_count} observations)");

        best
    }

    /// Scan `[min_depth, max_depth]` in `step` increments and return the
    /// depth with the smallest misfit. Strict comparison keeps the first
    /// (shallowest) depth on ties.
    fn grid_search_depth(
        &self,
        latitude: Degree,
        longitude: Degree,
        observations: &[DepthPhaseObservation],
        min_depth: Kilometer,
        max_depth: Kilometer,
        step: Kilometer,
    ) -> Option<Kilometer> {
        let mut best: Option<(Kilometer, f64)> = None;

        let mut depth = min_depth;
        while depth <= max_depth + 1e-9 {
            let trial = depth.min(max_depth);
            if let Some(misfit) = self.misfit_at(latitude, longitude, trial, observations) {
                match best {
                    Some((_, best_misfit)) if misfit >= best_misfit => {}
                    _ => best = Some((trial, misfit)),
                }
            }
            depth += step;
        }

        best.map(|(depth, _)| depth)
    }

    /// Weight-normalised RMS misfit of the valid observations at a trial
    /// depth: sqrt(sum(w_i * r_i^2) / sum(w_i)), with the theoretical
    /// separation of every observation re-evaluated at that depth.
    /// Observations the table cannot answer at this depth are left out.
    ///
    /// Return
    /// ------
    /// * `None` when no observation contributes.
    fn misfit_at(
        &self,
        latitude: Degree,
        longitude: Degree,
        depth: Kilometer,
        observations: &[DepthPhaseObservation],
    ) -> Option<f64> {
        let source = Hypocenter::new(latitude, longitude, depth);

        let mut sum_squared = 0.0;
        let mut sum_weights = 0.0;
        let mut count = 0usize;

        for obs in observations.iter().filter(|o| o.is_valid && o.weight > 0.0) {
            let receiver = Receiver::new(
                obs.station_latitude,
                obs.station_longitude,
                obs.station_elevation,
            );
            let Some((time_depth, time_reference)) =
                self.depth_phase_pair(&obs.phase, &source, &receiver)
            else {
                continue;
            };

            let residual = obs.time_difference_obs - (time_depth - time_reference);
            sum_squared += obs.weight * residual * residual;
            sum_weights += obs.weight;
            count += 1;
        }

        if count == 0 || sum_weights <= 0.0 {
            return None;
        }

        Some((sum_squared / sum_weights).sqrt())
    }

    /// Coarse uncertainty bracket: the extreme depths of the finest scan
    /// window whose misfit stays within [`BOUNDS_TOLERANCE`] of the
    /// optimum.
    fn depth_bounds(
        &self,
        latitude: Degree,
        longitude: Degree,
        observations: &[DepthPhaseObservation],
        best_depth: Kilometer,
    ) -> Option<(Kilometer, Kilometer)> {
        let best_misfit = self.misfit_at(latitude, longitude, best_depth, observations)?;

        let min_depth = (best_depth - FINEST_HALF_WINDOW).max(self.config.min_depth);
        let max_depth = (best_depth + FINEST_HALF_WINDOW).min(self.config.max_depth);

        let mut lower = best_depth;
        let mut upper = best_depth;
        let mut depth = min_depth;
        while depth <= max_depth + 1e-9 {
            let trial = depth.min(max_depth);
            if let Some(misfit) = self.misfit_at(latitude, longitude, trial, observations) {
                if misfit <= best_misfit + BOUNDS_TOLERANCE {
                    lower = lower.min(trial);
                    upper = upper.max(trial);
                }
            }
            depth += FINEST_STEP;
        }

        Some((lower, upper))
    }
}

impl Default for DepthPhaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod analyzer_test {
    use super::*;
    use crate::hypodepth_errors::HypodepthError;
    use crate::travel_time::TravelTime;
    use approx::assert_relative_eq;

    /// Synthetic table: reference phases arrive at a constant time, a
    /// depth phase trails its reference by `slope * depth` seconds.
    struct LinearTable {
        slope: f64,
    }

    impl TravelTimeTable for LinearTable {
        fn set_model(&mut self, _model: &str) -> bool {
            true
        }

        fn compute_phase(
            &self,
            phase: &str,
            source: &Hypocenter,
            _receiver: &Receiver,
        ) -> Result<TravelTime, HypodepthError> {
            let time = match phase {
                "P" | "S" | "PKP" => 500.0,
                p if catalog::is_depth_phase(p) => 500.0 + self.slope * source.depth,
                _ => {
                    return Err(HypodepthError::PhaseNotAvailable {
                        phase: phase.to_string(),
                        distance: 0.0,
                    })
                }
            };
            Ok(TravelTime::new(phase, time))
        }

        fn compute_all(
            &self,
            source: &Hypocenter,
            receiver: &Receiver,
        ) -> Result<TravelTimeList, HypodepthError> {
            ["P", "S", "pP", "sP", "pwP"]
                .iter()
                .map(|phase| self.compute_phase(phase, source, receiver))
                .collect()
        }
    }

    fn ready_analyzer(slope: f64) -> DepthPhaseAnalyzer {
        let mut analyzer = DepthPhaseAnalyzer::new();
        analyzer.set_travel_time_table(Arc::new(LinearTable { slope }));
        analyzer
    }

    #[test]
    fn test_uninitialized_operations_are_inert() {
        let analyzer = DepthPhaseAnalyzer::new();
        assert!(!analyzer.is_ready());

        let src = Hypocenter::new(0.0, 0.0, 50.0);
        let rcv = Receiver::new(0.0, 60.0, 0.0);
        assert!(analyzer.compute_depth_phase_times(&src, &rcv, &[]).is_empty());
        assert_eq!(
            analyzer.compute_depth_phase_time_difference("pP", &src, &rcv),
            -1.0
        );
        assert_eq!(analyzer.invert_for_depth(0.0, 0.0, &[], 33.0), -1.0);
    }

    #[test]
    fn test_set_table_is_idempotent() {
        let table: Arc<dyn TravelTimeTable> = Arc::new(LinearTable { slope: 2.0 });
        let mut analyzer = DepthPhaseAnalyzer::new();

        assert!(analyzer.set_travel_time_table(table.clone()));
        assert!(analyzer.is_ready());
        let before = analyzer.compute_depth_phase_time_difference(
            "pP",
            &Hypocenter::new(0.0, 0.0, 40.0),
            &Receiver::new(0.0, 60.0, 0.0),
        );

        assert!(analyzer.set_travel_time_table(table));
        assert!(analyzer.is_ready());
        let after = analyzer.compute_depth_phase_time_difference(
            "pP",
            &Hypocenter::new(0.0, 0.0, 40.0),
            &Receiver::new(0.0, 60.0, 0.0),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_table_by_name() {
        let mut analyzer = DepthPhaseAnalyzer::new();

        assert!(!analyzer.set_travel_time_table_by_name("no-such-type", "iasp91"));
        assert!(!analyzer.is_ready());

        assert!(!analyzer.set_travel_time_table_by_name("homogeneous", "no-such-model"));
        assert!(!analyzer.is_ready());

        assert!(analyzer.set_travel_time_table_by_name("homogeneous", "ak135"));
        assert!(analyzer.is_ready());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut analyzer = DepthPhaseAnalyzer::new();
        let config = DepthPhaseConfig::builder()
            .phases(["pP"])
            .min_phase_count(1)
            .build()
            .unwrap();
        analyzer.set_config(config.clone());
        assert_eq!(*analyzer.config(), config);
    }

    #[test]
    fn test_time_difference_matches_model() {
        let analyzer = ready_analyzer(2.0);
        let src = Hypocenter::new(0.0, 0.0, 40.0);
        let rcv = Receiver::new(0.0, 60.0, 0.0);
        assert_relative_eq!(
            analyzer.compute_depth_phase_time_difference("pP", &src, &rcv),
            80.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_compute_times_filters_by_config_phases() {
        let analyzer = ready_analyzer(2.0);
        let src = Hypocenter::new(0.0, 0.0, 40.0);
        let rcv = Receiver::new(0.0, 60.0, 0.0);

        let times = analyzer.compute_depth_phase_times(&src, &rcv, &[]);
        let phases: Vec<&str> = times.iter().map(|tt| tt.phase.as_str()).collect();
        assert_eq!(phases, vec!["pP", "sP", "pwP"]);

        let only_pp = analyzer.compute_depth_phase_times(&src, &rcv, &["pP".to_string()]);
        assert_eq!(only_pp.len(), 1);
        assert_eq!(only_pp[0].phase, "pP");
    }
}
