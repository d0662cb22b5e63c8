//! # Travel-time forward models
//!
//! This module defines the oracle abstraction used by the depth-phase
//! analyzer: a [`TravelTimeTable`] answers "when does phase X from this
//! source arrive at this receiver". Implementations are looked up by
//! name through [`registry`] (the crate registers a uniform-velocity
//! table under `"homogeneous"`); external implementations register
//! their own constructor and become addressable the same way.
//!
//! ## Conventions
//!
//! - Source coordinates in degrees, depth in km (positive down).
//! - Receiver coordinates in degrees, elevation in meters above sea level.
//! - Travel times in seconds from origin time.
//!
//! ## See also
//!
//! * [`registry::create`] – name → boxed table.
//! * [`homogeneous::HomogeneousTable`] – built-in implementation.

pub mod homogeneous;
pub mod registry;

use crate::constants::{Degree, Kilometer, Seconds, TravelTimeList};
use crate::hypodepth_errors::HypodepthError;

/// Arrival of a named phase, as predicted by a forward model.
///
/// Fields
/// ------
/// * `phase`: phase code (`P`, `pP`, `sS`, ...).
/// * `time`: travel time from the origin in seconds.
/// * `ray_param`: horizontal slowness in s/deg, when the model provides it.
/// * `slowness`: vertical slowness at the source in s/km, when provided.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTime {
    pub phase: String,
    pub time: Seconds,
    pub ray_param: Option<f64>,
    pub slowness: Option<f64>,
}

impl TravelTime {
    pub fn new(phase: impl Into<String>, time: Seconds) -> Self {
        TravelTime {
            phase: phase.into(),
            time,
            ray_param: None,
            slowness: None,
        }
    }
}

/// Seismic source position: epicenter plus depth below the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hypocenter {
    pub latitude: Degree,
    pub longitude: Degree,
    pub depth: Kilometer,
}

impl Hypocenter {
    pub fn new(latitude: Degree, longitude: Degree, depth: Kilometer) -> Self {
        Hypocenter {
            latitude,
            longitude,
            depth,
        }
    }

    /// Same epicenter at a different trial depth.
    pub fn at_depth(&self, depth: Kilometer) -> Self {
        Hypocenter { depth, ..*self }
    }
}

/// Recording site position. Elevation is in meters above sea level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Receiver {
    pub latitude: Degree,
    pub longitude: Degree,
    pub elevation: f64,
}

impl Receiver {
    pub fn new(latitude: Degree, longitude: Degree, elevation: f64) -> Self {
        Receiver {
            latitude,
            longitude,
            elevation,
        }
    }
}

/// Forward model for seismic travel times.
///
/// Implementations must be cheap to query: the depth inversion calls
/// [`compute_phase`](TravelTimeTable::compute_phase) once per
/// observation per trial depth. A phase that does not exist for the
/// given geometry is an error, never a zero time.
pub trait TravelTimeTable: Send + Sync {
    /// Select a named velocity model (e.g. `iasp91`, `ak135`).
    ///
    /// Return
    /// ------
    /// * `true` iff the model is known to this table.
    fn set_model(&mut self, model: &str) -> bool;

    /// Travel time of a single named phase.
    fn compute_phase(
        &self,
        phase: &str,
        source: &Hypocenter,
        receiver: &Receiver,
    ) -> Result<TravelTime, HypodepthError>;

    /// Travel times of every phase the model predicts for this geometry.
    fn compute_all(
        &self,
        source: &Hypocenter,
        receiver: &Receiver,
    ) -> Result<TravelTimeList, HypodepthError>;
}
