use hypodepth::arrivals::Arrival;
use hypodepth::constants::TravelTimeList;
use hypodepth::depth_phases::catalog;
use hypodepth::depth_phases::DepthPhaseObservation;
use hypodepth::hypodepth_errors::HypodepthError;
use hypodepth::travel_time::{Hypocenter, Receiver, TravelTime, TravelTimeTable};

/// Reference travel time of the synthetic table (s).
pub const BASE_TIME: f64 = 500.0;

/// Synthetic travel-time table: every reference phase arrives at
/// [`BASE_TIME`], every depth phase trails its reference by
/// `slope * depth` seconds. The linear depth dependence makes inversion
/// results exactly predictable.
pub struct LinearDepthTable {
    pub slope: f64,
}

impl LinearDepthTable {
    pub fn new(slope: f64) -> Self {
        LinearDepthTable { slope }
    }
}

impl TravelTimeTable for LinearDepthTable {
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
            "P" | "S" | "PKP" => BASE_TIME,
            p if catalog::is_depth_phase(p) => BASE_TIME + self.slope * source.depth,
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

/// A depth-phase observation at a teleseismic station, ready for
/// inversion against [`LinearDepthTable`].
pub fn observation(station: &str, time_difference_obs: f64, weight: f64) -> DepthPhaseObservation {
    DepthPhaseObservation {
        phase: "pP".to_string(),
        reference_phase: "P".to_string(),
        network_code: "GE".to_string(),
        station_code: station.to_string(),
        station_latitude: 0.0,
        station_longitude: 60.0,
        station_elevation: 0.0,
        observed_time: 0.0,
        theoretical_time: 0.0,
        residual: 0.0,
        time_difference_obs,
        time_difference_theo: 0.0,
        distance: 60.0,
        weight,
        is_valid: true,
    }
}

/// A P/pP pick pair at `station`, consistent with [`LinearDepthTable`]
/// up to `extra` seconds added to the depth-phase pick.
pub fn pick_pair(
    station: &str,
    station_longitude: f64,
    origin_time: f64,
    slope: f64,
    true_depth: f64,
    extra: f64,
) -> Vec<Arrival> {
    let p_time = origin_time + BASE_TIME;
    let pp_time = p_time + slope * true_depth + extra;
    vec![
        Arrival::new("P", p_time, "GE", station, 0.0, station_longitude, 0.0),
        Arrival::new("pP", pp_time, "GE", station, 0.0, station_longitude, 0.0),
    ]
}
