//! # hypodepth
//!
//! Depth determination for earthquake hypocenters.
//!
//! When the direct first arrivals of an event leave the vertical
//! coordinate ill-conditioned, two independent constraints remain:
//!
//! * **Depth phases** — surface reflections (pP, sP, ...) trail their
//!   direct reference phase by a separation that is almost a pure
//!   function of source depth.
//!   [`DepthPhaseAnalyzer`](depth_phases::analyzer::DepthPhaseAnalyzer)
//!   pairs picks, forms observations, and inverts the separations with
//!   a hierarchical grid search over a travel-time forward model.
//! * **Regional priors** — geographic polygons carrying `defaultDepth`
//!   and `maxDepth` attributes.
//!   [`RegionDepthLookup`](region_depth::RegionDepthLookup) resolves a
//!   candidate epicenter to the constraints of the first matching
//!   region.
//!
//! Both subsystems report results and sentinels; adopting a depth is
//! the calling locator's decision.

pub mod arrivals;
pub mod constants;
pub mod depth_phases;
pub mod geo;
pub mod geodesy;
pub mod hypodepth_errors;
pub mod region_depth;
pub mod travel_time;

pub use arrivals::{Arrival, ArrivalLike};
pub use depth_phases::analyzer::DepthPhaseAnalyzer;
pub use depth_phases::{DepthPhaseConfig, DepthPhaseObservation, DepthPhaseResult};
pub use geo::{GeoCoordinate, GeoFeature, GeoFeatureSet};
pub use hypodepth_errors::HypodepthError;
pub use region_depth::{RegionDepthConfig, RegionDepthConstraints, RegionDepthLookup};
pub use travel_time::{Hypocenter, Receiver, TravelTime, TravelTimeTable};
