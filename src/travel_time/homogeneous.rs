//! Uniform-velocity travel-time table.
//!
//! A deliberately simple forward model: the Earth is a homogeneous
//! half-space with one P and one S velocity taken from the selected
//! reference model. Direct phases travel the straight slant path from
//! source to receiver; a depth phase climbs vertically to the surface
//! at the velocity of its upgoing leg and then follows the direct path
//! of a surface-focus source. The resulting depth-phase/direct time
//! separation grows monotonically with source depth, which is the
//! property the depth inversion relies on.
//!
//! The model has no ocean layer, so `pwP` is predicted at the `pP`
//! time, and no core, so `PKP` shares the P velocity and only appears
//! beyond 110 degrees.

use tracing::warn;

use crate::constants::{Kilometer, TravelTimeList, KM_PER_DEG};
use crate::geodesy::{deg_to_km, epicentral_distance};
use crate::hypodepth_errors::HypodepthError;

use super::{Hypocenter, Receiver, TravelTime, TravelTimeTable};

/// Reference P/S velocities in km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
struct VelocityModel {
    name: &'static str,
    vp: f64,
    vs: f64,
}

const IASP91: VelocityModel = VelocityModel {
    name: "iasp91",
    vp: 8.04,
    vs: 4.47,
};

const AK135: VelocityModel = VelocityModel {
    name: "ak135",
    vp: 8.045,
    vs: 4.49,
};

/// Minimum epicentral distance (deg) at which core phases are reported.
const PKP_MIN_DISTANCE: f64 = 110.0;

/// Phases this table predicts, direct phases first.
const PHASES: &[&str] = &["P", "S", "PKP", "pP", "sP", "pwP", "pS", "sS", "pPKP", "sPKP"];

pub struct HomogeneousTable {
    model: VelocityModel,
}

impl HomogeneousTable {
    pub fn new() -> Self {
        HomogeneousTable { model: IASP91 }
    }

    /// Velocity of a direct phase, by its code.
    fn direct_velocity(&self, phase: &str) -> Option<f64> {
        match phase {
            "P" | "PKP" => Some(self.model.vp),
            "S" => Some(self.model.vs),
            _ => None,
        }
    }

    /// Velocity of the upgoing leg of a depth phase, from its prefix.
    fn leg_velocity(&self, phase: &str) -> Option<f64> {
        match phase.chars().next() {
            Some('p') => Some(self.model.vp),
            Some('s') => Some(self.model.vs),
            _ => None,
        }
    }

    /// Direct phase after stripping the depth-phase prefix (`pP` -> `P`,
    /// `pwP` -> `P`, `sPKP` -> `PKP`).
    fn reflected_phase(phase: &str) -> Option<&str> {
        match phase {
            "pP" | "sP" | "pwP" => Some("P"),
            "pS" | "sS" => Some("S"),
            "pPKP" | "sPKP" => Some("PKP"),
            _ => None,
        }
    }

    /// Straight-ray time of a direct phase.
    ///
    /// `vertical` is the source depth plus the receiver elevation, both
    /// reduced to km; the slant path is the hypotenuse over the surface
    /// distance.
    fn direct_time(
        &self,
        phase: &str,
        distance_km: Kilometer,
        vertical_km: Kilometer,
    ) -> Option<TravelTime> {
        let velocity = self.direct_velocity(phase)?;
        let slant = distance_km.hypot(vertical_km).max(f64::EPSILON);

        let mut tt = TravelTime::new(phase, slant / velocity);
        tt.ray_param = Some((distance_km / slant) / velocity * KM_PER_DEG);
        tt.slowness = Some((vertical_km / slant) / velocity);
        Some(tt)
    }

    /// Surface-reflection time of a depth phase: vertical upgoing leg
    /// plus the direct path of a surface-focus source.
    fn depth_phase_time(
        &self,
        phase: &str,
        distance_km: Kilometer,
        depth_km: Kilometer,
        elevation_km: Kilometer,
    ) -> Option<TravelTime> {
        let leg_velocity = self.leg_velocity(phase)?;
        let reflected = Self::reflected_phase(phase)?;
        let surface_leg = self.direct_time(reflected, distance_km, elevation_km)?;

        let mut tt = TravelTime::new(phase, depth_km / leg_velocity + surface_leg.time);
        tt.ray_param = surface_leg.ray_param;
        tt.slowness = Some(1.0 / leg_velocity);
        Some(tt)
    }

    fn compute_one(
        &self,
        phase: &str,
        source: &Hypocenter,
        receiver: &Receiver,
        delta: f64,
    ) -> Option<TravelTime> {
        let distance_km = deg_to_km(delta);
        let elevation_km = receiver.elevation / 1000.0;

        if phase.contains("KP") && delta < PKP_MIN_DISTANCE {
            return None;
        }

        if self.direct_velocity(phase).is_some() {
            self.direct_time(phase, distance_km, source.depth + elevation_km)
        } else {
            self.depth_phase_time(phase, distance_km, source.depth, elevation_km)
        }
    }
}

impl Default for HomogeneousTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TravelTimeTable for HomogeneousTable {
    fn set_model(&mut self, model: &str) -> bool {
        match model {
            "iasp91" => {
                self.model = IASP91;
                true
            }
            "ak135" => {
                self.model = AK135;
                true
            }
            other => {
                warn!(model = other, "unknown homogeneous velocity model");
                false
            }
        }
    }

    fn compute_phase(
        &self,
        phase: &str,
        source: &Hypocenter,
        receiver: &Receiver,
    ) -> Result<TravelTime, HypodepthError> {
        let delta = epicentral_distance(
            source.latitude,
            source.longitude,
            receiver.latitude,
            receiver.longitude,
        );

        self.compute_one(phase, source, receiver, delta).ok_or_else(|| {
            HypodepthError::PhaseNotAvailable {
                phase: phase.to_string(),
                distance: delta,
            }
        })
    }

    fn compute_all(
        &self,
        source: &Hypocenter,
        receiver: &Receiver,
    ) -> Result<TravelTimeList, HypodepthError> {
        let delta = epicentral_distance(
            source.latitude,
            source.longitude,
            receiver.latitude,
            receiver.longitude,
        );

        Ok(PHASES
            .iter()
            .filter_map(|phase| self.compute_one(phase, source, receiver, delta))
            .collect())
    }
}
