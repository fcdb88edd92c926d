//! Great-circle distance and elevation-gain accumulation over a sample sequence.

use crate::trail_types::{GeoSample, TrailSummary};

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Surface distance in meters between two samples on a spherical Earth.
///
/// Uses the haversine formula, so longitude spacing shrinks correctly with
/// latitude. GPS jitter between adjacent fixes is returned as-is.
pub fn great_circle_distance(a: &GeoSample, b: &GeoSample) -> f64 {
    haversine(a.lat, a.lon, b.lat, b.lon)
}

/// Haversine distance in meters between two `(lat, lon)` pairs in degrees.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Positive elevation change from `prev` to `curr`.
///
/// Zero when either elevation is absent or the change is not an ascent.
pub fn elevation_gain(prev: &GeoSample, curr: &GeoSample) -> f64 {
    match (prev.ele, curr.ele) {
        (Some(from), Some(to)) if to > from => to - from,
        _ => 0.0,
    }
}

/// Ratio of gain to horizontal distance, 0.0 when no distance was covered.
pub fn average_grade(total_gain_m: f64, total_distance_m: f64) -> f64 {
    if total_distance_m > 0.0 {
        total_gain_m / total_distance_m
    } else {
        0.0
    }
}

/// Walk consecutive pairs and total distance and ascent.
///
/// Every pair contributes its distance; a pair with a missing elevation
/// contributes no gain.
pub fn accumulate(samples: &[GeoSample]) -> TrailSummary {
    let (distance, gain) = samples
        .windows(2)
        .fold((0.0, 0.0), |(distance, gain), pair| {
            (
                distance + great_circle_distance(&pair[0], &pair[1]),
                gain + elevation_gain(&pair[0], &pair[1]),
            )
        });
    TrailSummary::new(distance, gain)
}
