//! Spherical-Earth geometry helpers.
//!
//! Epicentral distances are great-circle central angles on a sphere of
//! radius [`EARTH_RADIUS_KM`](crate::constants::EARTH_RADIUS_KM). The
//! haversine form is used for numerical stability at short distances.

use crate::constants::{Degree, Kilometer, KM_PER_DEG};

/// Compute the epicentral distance between two geographic points.
///
/// Arguments
/// ---------
/// * `lat1`, `lon1`: first point in degrees.
/// * `lat2`, `lon2`: second point in degrees.
///
/// Return
/// ------
/// * The great-circle central angle in degrees, in `[0, 180]`.
pub fn epicentral_distance(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> Degree {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    c.to_degrees()
}

/// Convert an epicentral distance in degrees to a surface distance in km.
pub fn deg_to_km(delta: Degree) -> Kilometer {
    delta * KM_PER_DEG
}

/// Convert a surface distance in km to an epicentral distance in degrees.
pub fn km_to_deg(distance: Kilometer) -> Degree {
    distance / KM_PER_DEG
}
