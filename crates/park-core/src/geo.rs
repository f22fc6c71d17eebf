// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-core authors

use std::fmt;

/// Mean Earth radius in kilometres, used by [`GeoPoint::distance_km`].
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS-84 coordinate pair.
///
/// Kept as `f64` rather than `f32`: the scoring function in the parking
/// manager distinguishes proximity bands as narrow as 100m, which needs the
/// extra mantissa bits a city-scale agent simulation wouldn't.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    /// Great-circle distance to `other`, in kilometres, modelling Earth as a
    /// sphere of radius 6371km.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(41.1776, -8.6077);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(41.1776, -8.6077);
        let b = GeoPoint::new(41.1782, -8.6076);
        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-12);
    }

    #[test]
    fn close_points_are_under_a_hundred_metres() {
        let a = GeoPoint::new(41.1776, -8.6077);
        let b = GeoPoint::new(41.1782, -8.6076);
        let d = a.distance_km(&b);
        assert!(d > 0.0 && d < 0.1, "unexpected distance {d}");
    }

    #[test]
    fn known_distance_porto_to_lisbon_is_roughly_correct() {
        let porto = GeoPoint::new(41.1579, -8.6291);
        let lisbon = GeoPoint::new(38.7223, -9.1393);
        let d = porto.distance_km(&lisbon);
        assert!((270.0..290.0).contains(&d), "distance {d} out of expected range");
    }

    proptest::proptest! {
        #[test]
        fn distance_is_symmetric_for_arbitrary_points(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let a = GeoPoint::new(lat1, lon1);
            let b = GeoPoint::new(lat2, lon2);
            let ab = a.distance_km(&b);
            let ba = b.distance_km(&a);
            proptest::prop_assert!((ab - ba).abs() < 1e-9);
        }

        #[test]
        fn distance_is_never_negative_and_bounded_by_half_circumference(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let d = GeoPoint::new(lat1, lon1).distance_km(&GeoPoint::new(lat2, lon2));
            proptest::prop_assert!(d >= 0.0);
            proptest::prop_assert!(d <= EARTH_RADIUS_KM * std::f64::consts::PI + 1e-6);
        }
    }
}
