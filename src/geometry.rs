// Spherical math on (lat, lng) coordinates in degrees.

use itertools::Itertools;
use rand::Rng;
use std::f64::consts::PI;

/// Mean earth radius, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// Rough length of one degree of latitude, used to project meter offsets.
const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coord { lat, lng }
    }
}

/// Great-circle distance between two coordinates, in meters (haversine).
pub fn distance(a: Coord, b: Coord) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Sum of the distances between consecutive points of `order`.
///
/// Indices are not bounds-checked beyond slice indexing: callers only pass
/// indices of points they own.
pub fn path_length<P: AsRef<Coord>>(points: &[P], order: &[usize]) -> f64 {
    order.iter()
        .tuple_windows()
        .map(|(&from, &to)| distance(*points[from].as_ref(), *points[to].as_ref()))
        .sum()
}

/// Uniformly samples a coordinate within `radius_m` meters of `center`.
///
/// The radius is sqrt-scaled so density is uniform over the disk area, and the
/// longitude offset widens with latitude.
pub fn sample_in_disk<R: Rng + ?Sized>(center: Coord, radius_m: f64, rng: &mut R) -> Coord {
    let r = radius_m * rng.gen::<f64>().sqrt();
    let theta = rng.gen::<f64>() * 2.0 * PI;
    let lat_offset = (r * theta.cos()) / METERS_PER_DEGREE;
    let lng_offset = (r * theta.sin()) / (METERS_PER_DEGREE * center.lat.to_radians().cos());
    Coord::new(center.lat + lat_offset, center.lng + lng_offset)
}

impl AsRef<Coord> for Coord {
    fn as_ref(&self) -> &Coord {
        self
    }
}
