//! Great-circle helpers on WGS84 latitude/longitude pairs.

/// Mean Earth radius in metres used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance in metres (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_m(self, other)
    }

    /// Coordinate displaced by `north_m` / `east_m` metres on a local sphere
    /// approximation. Accurate to well under a metre for walking distances.
    pub fn offset_by_meters(&self, north_m: f64, east_m: f64) -> Coordinate {
        let dlat = north_m / EARTH_RADIUS_M;
        let cos_lat = self.latitude.to_radians().cos();
        let dlon = if cos_lat.abs() < f64::EPSILON {
            0.0
        } else {
            east_m / (EARTH_RADIUS_M * cos_lat)
        };
        Coordinate {
            latitude: self.latitude + dlat.to_degrees(),
            longitude: self.longitude + dlon.to_degrees(),
        }
    }
}

/// Haversine distance between two coordinates in metres.
pub fn haversine_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    // Clamp: rounding can push h a hair above 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
