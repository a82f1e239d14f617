//! Great-circle distance on a spherical Earth.

use models::Coordinate;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometers.
///
/// Pure and symmetric; zero (up to floating epsilon) iff both points are
/// equal. Inputs are already range-checked by `Coordinate` construction.
///
/// # Examples
/// ```
/// use models::Coordinate;
/// use service::geo::haversine_km;
/// let a = Coordinate::new(0.0, 0.0).unwrap();
/// let b = Coordinate::new(0.0, 0.0).unwrap();
/// assert!(haversine_km(a, b) < 1e-9);
/// ```
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Round to two decimals for presentation (distances, mean scores).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn distance_is_non_negative_and_zero_on_identity() {
        let sp = coord(-23.5505, -46.6333);
        assert!(haversine_km(sp, sp).abs() < 1e-9);
        let rio = coord(-22.9068, -43.1729);
        assert!(haversine_km(sp, rio) > 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let sp = coord(-23.5505, -46.6333);
        let rio = coord(-22.9068, -43.1729);
        assert_eq!(haversine_km(sp, rio), haversine_km(rio, sp));
    }

    #[test]
    fn matches_known_distance_sao_paulo_to_rio() {
        let sp = coord(-23.5505, -46.6333);
        let rio = coord(-22.9068, -43.1729);
        let d = haversine_km(sp, rio);
        // ~361 km great-circle
        assert!((d - 361.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn respects_triangle_inequality() {
        let a = coord(-23.5505, -46.6333);
        let b = coord(-22.9068, -43.1729);
        let c = coord(-19.9167, -43.9345);
        assert!(haversine_km(a, c) <= haversine_km(a, b) + haversine_km(b, c) + 1e-9);
    }

    #[test]
    fn round2_rounds_to_two_decimals() {
        assert_eq!(round2(2.004), 2.0);
        assert_eq!(round2(2.006), 2.01);
        assert_eq!(round2(9.899999), 9.9);
    }
}
