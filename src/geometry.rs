//! Great-circle geometry for shipment legs.
//!
//! Distances are straight-line haversine estimates; carrier-specific detours
//! are applied later through each option's route multiplier.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic point in degrees.
///
/// No range validation is performed; out-of-range values still produce a
/// finite distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometers.
    ///
    /// # Examples
    ///
    /// ```
    /// use perishable_routing::geometry::Coordinate;
    ///
    /// let pune = Coordinate::new(18.5204, 73.8567);
    /// let mumbai = Coordinate::new(19.0760, 72.8777);
    ///
    /// let km = pune.distance_km(&mumbai);
    /// assert!(km > 115.0 && km < 125.0);
    /// ```
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance_km(*self, *other)
    }
}

/// Calculates the great-circle distance in kilometers using the haversine formula.
///
/// Returns exactly `0.0` for identical points and the same value regardless
/// of argument order.
///
/// # Examples
///
/// ```
/// use perishable_routing::geometry::{distance_km, Coordinate};
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.0, 1.0);
///
/// // 1 degree of longitude at the equator is about 111 km
/// let d = distance_km(a, b);
/// assert!(d > 110.0 && d < 112.0);
/// assert_eq!(distance_km(a, a), 0.0);
/// ```
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp guards sqrt(1 - h) against rounding just above 1 for antipodes.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_to_self() {
        let p = Coordinate::new(19.0596, 72.8295);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (Coordinate::new(18.5204, 73.8567), Coordinate::new(28.7041, 77.1025)),
            (Coordinate::new(-33.86, 151.21), Coordinate::new(51.5, -0.12)),
            (Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_km(a, b), distance_km(b, a));
        }
    }

    #[test]
    fn test_known_distance() {
        // Pune -> Bandra, Mumbai
        let pune = Coordinate::new(18.5204, 73.8567);
        let bandra = Coordinate::new(19.0596, 72.8295);
        let d = distance_km(pune, bandra);
        assert!((d - 123.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_antipodes_are_finite() {
        let d = distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_unvalidated_input() {
        let d = distance_km(Coordinate::new(400.0, -900.0), Coordinate::new(12.0, 3.0));
        assert!(d.is_finite() && d >= 0.0);
    }
}
