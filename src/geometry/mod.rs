//! Spherical geometry for turning a point-plus-radius into a search polygon.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::models::Ring;

/// Mean earth radius in metres, as defined by WGS84.
pub const EARTH_RADIUS_METRES: f64 = 6_378_137.0;

/// Upper bound on circle segments accepted by the generator.
pub const MAX_SEGMENTS: usize = 180;

/// A WGS84 point in degrees. Matches the pin location stored with postcode
/// documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Approximate a circle on the sphere as a closed polygon ring.
///
/// The ring is generated clockwise, one vertex per segment, and closed by
/// repeating the first vertex, so a valid call yields `segments + 1` points
/// of `[longitude, latitude]` degrees. Deterministic for identical inputs.
pub fn circle_to_polygon(
    center: GeoPoint,
    radius_metres: f64,
    segments: usize,
) -> Result<Ring, SearchError> {
    validate_input(center, segments)?;

    let mut ring: Ring = Vec::with_capacity(segments + 1);
    for i in 0..segments {
        let bearing = (std::f64::consts::TAU * -(i as f64)) / segments as f64;
        ring.push(destination_point(center, radius_metres, bearing));
    }

    // Repeat the first vertex to close the polygon ring
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }

    Ok(ring)
}

fn validate_input(center: GeoPoint, segments: usize) -> Result<(), SearchError> {
    if segments > MAX_SEGMENTS {
        return Err(SearchError::TooManySegments);
    }

    if !(-90.0..=90.0).contains(&center.lat) {
        return Err(SearchError::InvalidLatitude);
    }

    if !(-180.0..=180.0).contains(&center.lon) {
        return Err(SearchError::InvalidLongitude);
    }

    Ok(())
}

/// Destination point at the given distance and bearing from `center`, via
/// the direct great-circle formulas on a sphere of radius
/// [`EARTH_RADIUS_METRES`].
fn destination_point(center: GeoPoint, distance_metres: f64, bearing: f64) -> [f64; 2] {
    let lat1 = center.lat.to_radians();
    let lon1 = center.lon.to_radians();

    // angular distance
    let d_by_r = distance_metres / EARTH_RADIUS_METRES;

    let lat = (lat1.sin() * d_by_r.cos() + lat1.cos() * d_by_r.sin() * bearing.cos()).asin();

    let lon = lon1
        + (bearing.sin() * d_by_r.sin() * lat1.cos()).atan2(d_by_r.cos() - lat1.sin() * lat.sin());

    [lon.to_degrees(), lat.to_degrees()]
}
