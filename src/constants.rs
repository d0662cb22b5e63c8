use smallvec::SmallVec;

use crate::travel_time::TravelTime;

/// Mean Earth radius in kilometers (spherical approximation).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Length of one degree of great-circle arc at the Earth surface (km).
pub const KM_PER_DEG: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

// type def
pub type Degree = f64;
pub type Kilometer = f64;
/// Time span in seconds
pub type Seconds = f64;
/// Absolute time as epoch seconds
pub type Epoch = f64;

/// A (network code, station code) pair identifying a recording site
pub type StationKey = (String, String);

/// Travel times returned by a forward model for one source/receiver pair.
/// Few phases are requested per call, so the list lives on the stack.
pub type TravelTimeList = SmallVec<[TravelTime; 8]>;
