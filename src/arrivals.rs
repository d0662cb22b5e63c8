//! Arrival input seam.
//!
//! The analyzer does not own a pick data model; it accepts any
//! container whose elements answer the six questions below. Callers
//! with their own arrival types implement [`ArrivalLike`] on them; the
//! concrete [`Arrival`] record is provided for callers without one.

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Epoch};

/// Accessor interface for a phase pick bound to a station.
pub trait ArrivalLike {
    /// Phase code of the pick (P, pP, sS, ...).
    fn phase(&self) -> &str;
    /// Pick time as epoch seconds.
    fn arrival_time(&self) -> Epoch;
    fn network_code(&self) -> &str;
    fn station_code(&self) -> &str;
    fn station_latitude(&self) -> Degree;
    fn station_longitude(&self) -> Degree;
    /// Station elevation in meters; defaults to sea level.
    fn station_elevation(&self) -> f64 {
        0.0
    }
}

/// A plain arrival record satisfying [`ArrivalLike`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrival {
    pub phase: String,
    pub time: Epoch,
    pub network_code: String,
    pub station_code: String,
    pub station_latitude: Degree,
    pub station_longitude: Degree,
    pub station_elevation: f64,
}

impl Arrival {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        phase: impl Into<String>,
        time: Epoch,
        network_code: impl Into<String>,
        station_code: impl Into<String>,
        station_latitude: Degree,
        station_longitude: Degree,
        station_elevation: f64,
    ) -> Self {
        Arrival {
            phase: phase.into(),
            time,
            network_code: network_code.into(),
            station_code: station_code.into(),
            station_latitude,
            station_longitude,
            station_elevation,
        }
    }
}

impl ArrivalLike for Arrival {
    fn phase(&self) -> &str {
        &self.phase
    }

    fn arrival_time(&self) -> Epoch {
        self.time
    }

    fn network_code(&self) -> &str {
        &self.network_code
    }

    fn station_code(&self) -> &str {
        &self.station_code
    }

    fn station_latitude(&self) -> Degree {
        self.station_latitude
    }

    fn station_longitude(&self) -> Degree {
        self.station_longitude
    }

    fn station_elevation(&self) -> f64 {
        self.station_elevation
    }
}
