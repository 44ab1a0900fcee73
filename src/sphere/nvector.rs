//! n-vector geometry on a sphere.
//!
//! A surface point is a [`Location`]: a unit vector from the sphere's centre.
//! Anything that is not guaranteed to be unit length (sums, scaled vectors,
//! cross products) is a [`Vector3`], and only becomes a `Location` again
//! through [`Vector3::normalize`].

use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Free 3D vector with no length invariant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn scale_by(&self, factor: f64) -> Vector3 {
        Vector3 {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    /// Rescales to magnitude `mag`. The zero vector yields NaN components.
    pub fn scale_to(&self, mag: f64) -> Vector3 {
        self.scale_by(mag / self.magnitude())
    }

    /// Unit vector in the same direction. The zero vector yields NaN.
    pub fn normalize(&self) -> Location {
        Location(self.scale_to(1.0))
    }

    /// Numerically stable angle between two vectors of any length.
    pub fn angle_between(&self, other: &Vector3) -> f64 {
        self.cross(other).magnitude().atan2(self.dot(other))
    }

    /// Vector projection of `self` onto the direction of `onto`.
    pub fn project_onto(&self, onto: &Vector3) -> Vector3 {
        let unit = onto.scale_to(1.0);
        unit.scale_by(self.dot(&unit))
    }

    /// Component of `self` lying in the plane with the given normal.
    pub fn project_onto_plane(&self, normal: &Vector3) -> Vector3 {
        *self - self.project_onto(normal)
    }

    /// Whether `self` lies inside the smaller arc from `v1` to `v2`.
    ///
    /// All three vectors are assumed coplanar with the origin; otherwise the
    /// answer is meaningless.
    pub fn is_between(&self, v1: &Vector3, v2: &Vector3) -> bool {
        let big = v1.angle_between(v2);
        let small1 = self.angle_between(v1);
        if small1 > big {
            return false;
        }
        let small2 = self.angle_between(v2);
        small2 <= big && small1 + small2 <= PI
    }

    /// Like [`Vector3::is_between`], but accepts the arc when the two partial
    /// angles add up to the full angle within `epsilon` radians.
    pub fn is_between_epsilon(&self, v1: &Vector3, v2: &Vector3, epsilon: f64) -> bool {
        let big = v1.angle_between(v2);
        let small1 = self.angle_between(v1);
        let small2 = self.angle_between(v2);
        (big - small1 - small2).abs() <= epsilon
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5}, {:.5})", self.x, self.y, self.z)
    }
}

/// A point on the sphere surface, stored as a unit n-vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location(Vector3);

impl Location {
    /// Builds a location from latitude and longitude in radians.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        let clat = lat.cos();
        Location(Vector3::new(clat * lon.cos(), clat * lon.sin(), lat.sin()))
    }

    pub fn from_lat_lon_degrees(lat: f64, lon: f64) -> Self {
        Self::from_lat_lon(lat.to_radians(), lon.to_radians())
    }

    /// Returns (latitude, longitude) in radians.
    pub fn to_lat_lon(&self) -> (f64, f64) {
        let v = &self.0;
        let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
        let lon = v.y.atan2(v.x);
        (lat, lon)
    }

    pub fn to_lat_lon_degrees(&self) -> (f64, f64) {
        let (lat, lon) = self.to_lat_lon();
        (lat.to_degrees(), lon.to_degrees())
    }

    pub fn as_vector(&self) -> &Vector3 {
        &self.0
    }

    pub fn angle_between(&self, other: &Location) -> f64 {
        self.0.angle_between(&other.0)
    }

    /// Great-circle distance on a sphere of the given radius.
    pub fn distance(&self, other: &Location, sphere_radius: f64) -> f64 {
        self.angle_between(other) * sphere_radius
    }

    pub fn dot(&self, other: &Location) -> f64 {
        self.0.dot(&other.0)
    }

    pub fn cross(&self, other: &Location) -> Vector3 {
        self.0.cross(&other.0)
    }

    pub fn scale_to(&self, mag: f64) -> Vector3 {
        self.0.scale_by(mag)
    }

    /// Total order on the raw components (x, then y, then z).
    pub fn lex_cmp(&self, other: &Location) -> Ordering {
        let a = &self.0;
        let b = &other.0;
        a.x.total_cmp(&b.x)
            .then_with(|| a.y.total_cmp(&b.y))
            .then_with(|| a.z.total_cmp(&b.z))
    }

    /// Local frame at this location; see [`Rotation`].
    pub fn rotation(&self) -> Rotation {
        let (lat, lon) = self.to_lat_lon();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let (sin_lat, cos_lat) = lat.sin_cos();
        Rotation([
            [cos_lat * cos_lon, -sin_lon, -sin_lat * cos_lon],
            [cos_lat * sin_lon, cos_lon, -sin_lat * sin_lon],
            [sin_lat, 0.0, cos_lat],
        ])
    }

    /// Samples `num_points` points of the circle of great-circle radius
    /// `surface_radius` around `self`, at equal angular steps.
    ///
    /// The circle is built in the local frame (radial, east, north) and then
    /// rotated into place, so every point is exactly `surface_radius` from
    /// the centre up to rounding.
    pub fn circle_on_sphere(
        &self,
        sphere_radius: f64,
        surface_radius: f64,
        num_points: usize,
    ) -> Vec<Location> {
        let rotation = self.rotation();
        let angle = surface_radius / sphere_radius;
        let (sin_a, cos_a) = angle.sin_cos();
        (0..num_points)
            .map(|i| {
                let step = 2.0 * PI * i as f64 / num_points as f64;
                let local = Vector3::new(cos_a, sin_a * step.sin(), sin_a * step.cos());
                Location(rotation.transform(&local))
            })
            .collect()
    }

    /// Whether `between` lies angularly between `extreme1` and `extreme2` as
    /// seen from `self`.
    ///
    /// The three points are projected onto the plane tangent at `self`, so
    /// this is a flat-earth approximation: it is only trustworthy while all
    /// points are close to `self` relative to the sphere's radius. No error
    /// bound is given for larger separations.
    pub fn is_within(&self, extreme1: &Location, extreme2: &Location, between: &Location) -> bool {
        let (e1, e2, b) = self.tangent_projections(extreme1, extreme2, between);
        b.is_between(&e1, &e2)
    }

    /// [`Location::is_within`] with the tolerant [`Vector3::is_between_epsilon`] test.
    pub fn is_within_epsilon(
        &self,
        extreme1: &Location,
        extreme2: &Location,
        between: &Location,
        epsilon: f64,
    ) -> bool {
        let (e1, e2, b) = self.tangent_projections(extreme1, extreme2, between);
        b.is_between_epsilon(&e1, &e2, epsilon)
    }

    fn tangent_projections(
        &self,
        extreme1: &Location,
        extreme2: &Location,
        between: &Location,
    ) -> (Vector3, Vector3, Vector3) {
        let project = |p: &Location| (p.0 - self.0).project_onto_plane(&self.0);
        (project(extreme1), project(extreme2), project(between))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat, lon) = self.to_lat_lon_degrees();
        write!(f, "{lat:.5},{lon:.5}")
    }
}

/// 3x3 rotation whose columns are the radial, east and north unit vectors
/// of a location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation(pub [[f64; 3]; 3]);

impl Rotation {
    pub fn transform(&self, v: &Vector3) -> Vector3 {
        let row = |r: &[f64; 3]| r[0] * v.x + r[1] * v.y + r[2] * v.z;
        Vector3::new(row(&self.0[0]), row(&self.0[1]), row(&self.0[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const EARTH_RADIUS_KM: f64 = 6372.8;

    #[test]
    fn normalize_and_scale_to() {
        let v = Location::from_lat_lon_degrees(8.0, 31.0).scale_to(11.0);
        assert_approx_eq!(v.magnitude(), 11.0, 1e-9);
        assert_approx_eq!(v.normalize().as_vector().magnitude(), 1.0, 1e-12);
    }

    #[test]
    fn scale_to_zero_vector_is_nan() {
        let v = Vector3::new(0.0, 0.0, 0.0).scale_to(1.0);
        assert!(v.x.is_nan());
    }

    #[test]
    fn nashville_to_los_angeles() {
        // Great-circle distance article example: BNA to LAX.
        let bna = Location::from_lat_lon_degrees(36.12, -86.67);
        let lax = Location::from_lat_lon_degrees(33.94, -118.40);
        assert_approx_eq!(bna.distance(&lax, EARTH_RADIUS_KM), 2887.26, 0.005);
        assert_approx_eq!(lax.distance(&bna, EARTH_RADIUS_KM), 2887.26, 0.005);
    }

    #[test]
    fn angle_is_zero_to_self_and_symmetric() {
        let pts = [
            Location::from_lat_lon_degrees(0.0, 0.0),
            Location::from_lat_lon_degrees(89.9, 10.0),
            Location::from_lat_lon_degrees(-45.0, 179.0),
            Location::from_lat_lon_degrees(12.5, -77.0),
        ];
        for a in &pts {
            assert_eq!(a.angle_between(a).abs(), 0.0);
            for b in &pts {
                assert_eq!(a.angle_between(b), b.angle_between(a));
            }
        }
    }

    #[test]
    fn angle_is_stable_near_antipode() {
        let a = Location::from_lat_lon_degrees(0.0, 0.0);
        let b = Location::from_lat_lon_degrees(0.0, 179.9999);
        assert_approx_eq!(a.angle_between(&b), (179.9999_f64).to_radians(), 1e-9);
    }

    #[test]
    fn lat_lon_round_trip() {
        for lat in [-89.5, -60.0, -1.0, 0.0, 33.3, 71.25, 89.5] {
            for lon in [-179.5, -120.2, -0.5, 0.0, 45.0, 120.0, 179.5] {
                let (rlat, rlon) = Location::from_lat_lon_degrees(lat, lon).to_lat_lon_degrees();
                assert_approx_eq!(rlat, lat, 1e-6);
                assert_approx_eq!(rlon, lon, 1e-6);
            }
        }
    }

    #[test]
    fn rotation_columns_are_orthonormal() {
        let loc = Location::from_lat_lon_degrees(42.28, -83.75);
        let r = loc.rotation();
        let radial = r.transform(&Vector3::new(1.0, 0.0, 0.0));
        let east = r.transform(&Vector3::new(0.0, 1.0, 0.0));
        let north = r.transform(&Vector3::new(0.0, 0.0, 1.0));
        assert_approx_eq!(radial.angle_between(loc.as_vector()), 0.0, 1e-12);
        assert_approx_eq!(radial.dot(&east), 0.0, 1e-12);
        assert_approx_eq!(radial.dot(&north), 0.0, 1e-12);
        assert_approx_eq!(east.dot(&north), 0.0, 1e-12);
        assert!(north.z > 0.0);
    }

    #[test]
    fn circle_points_sit_on_the_circle() {
        let centers = [
            Location(Vector3::new(1.0, 0.0, 0.0)),
            Location::from_lat_lon_degrees(33.603845, -116.44001),
            Location::from_lat_lon_degrees(-70.0, 20.0),
        ];
        for center in &centers {
            for (radius, n) in [(60.0, 20), (1.0, 6), (750.0, 12), (5000.0, 33)] {
                let pts = center.circle_on_sphere(EARTH_RADIUS_KM, radius, n);
                assert_eq!(pts.len(), n);
                for p in &pts {
                    let d = center.distance(p, EARTH_RADIUS_KM);
                    assert!((d - radius).abs() <= radius * 1e-6, "{d} vs {radius}");
                    assert_approx_eq!(p.as_vector().magnitude(), 1.0, 1e-12);
                }
            }
        }
    }

    #[test]
    fn circle_points_are_evenly_spaced() {
        let center = Location::from_lat_lon_degrees(10.0, 10.0);
        let pts = center.circle_on_sphere(EARTH_RADIUS_KM, 100.0, 8);
        let first = pts[0].distance(&pts[1], EARTH_RADIUS_KM);
        for pair in pts.windows(2) {
            assert_approx_eq!(pair[0].distance(&pair[1], EARTH_RADIUS_KM), first, 1e-6);
        }
    }

    #[test]
    fn between_on_a_plane() {
        let v1 = Vector3::new(1.0, 0.0, 0.0);
        let v2 = Vector3::new(0.0, 1.0, 0.0);
        let mid = Vector3::new(1.0, 1.0, 0.0);
        let outside = Vector3::new(-1.0, 0.2, 0.0);
        assert!(mid.is_between(&v1, &v2));
        assert!(!outside.is_between(&v1, &v2));
        assert!(mid.is_between_epsilon(&v1, &v2, 1e-9));
        assert!(!outside.is_between_epsilon(&v1, &v2, 1e-9));
    }

    #[test]
    fn within_near_origin() {
        let origin = Location::from_lat_lon_degrees(0.0, 0.0);
        let east = Location::from_lat_lon_degrees(0.0, 0.1);
        let north = Location::from_lat_lon_degrees(0.1, 0.0);
        let north_east = Location::from_lat_lon_degrees(0.05, 0.05);
        let south_west = Location::from_lat_lon_degrees(-0.05, -0.05);
        assert!(origin.is_within(&east, &north, &north_east));
        assert!(!origin.is_within(&east, &north, &south_west));
        assert!(origin.is_within_epsilon(&east, &north, &north_east, 1e-9));
        assert!(!origin.is_within_epsilon(&east, &north, &south_west, 1e-9));
    }

    #[test]
    fn lex_order_is_total() {
        let a = Location::from_lat_lon_degrees(10.0, 10.0);
        let b = Location::from_lat_lon_degrees(10.0, 11.0);
        assert_eq!(a.lex_cmp(&a), Ordering::Equal);
        assert_eq!(a.lex_cmp(&b), b.lex_cmp(&a).reverse());
    }
}
