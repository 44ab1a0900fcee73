pub mod builder;
pub mod flight;
pub mod place;

use serde::{Deserialize, Serialize};

pub use builder::{Route, RouteGraph, StopView};
pub use place::{Airport, AirportSpec, Place, Waypoint};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6370.0;

/// Absolute tolerance, in kilometres, for locating circle intersections.
pub const INTERPOLATION_PRECISION: f64 = 1e-8;

/// Tunables shared by every case of a run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub sphere_radius_km: f64,
    pub interpolation_precision: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        RouteConfig {
            sphere_radius_km: EARTH_RADIUS_KM,
            interpolation_precision: INTERPOLATION_PRECISION,
        }
    }
}
