//! Heading arithmetic and great-circle geometry.
//!
//! Headings are circular quantities in degrees, kept in `[0, 360)`. All
//! heading math here is shortest-arc aware: the difference between 350° and
//! 10° is 20°, never 340°.

/// Earth radius in metres (WGS84 equatorial).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Normalize a heading into `[0, 360)`.
#[inline]
pub fn normalize_heading(heading: f64) -> f64 {
    let h = heading % 360.0;
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}

/// Signed shortest angular delta from `from` to `to`.
///
/// The magnitude is at most 180°; the sign gives the direction of the
/// shorter arc (positive = clockwise). 360° is treated as 0°.
pub fn shortest_heading_delta(from: f64, to: f64) -> f64 {
    let a = if from == 360.0 { 0.0 } else { from };
    let b = if to == 360.0 { 0.0 } else { to };

    let (cw, ccw) = if a > b {
        (360.0 - a + b, b - a)
    } else {
        (-(360.0 - b + a), b - a)
    };

    if cw.abs() < ccw.abs() {
        cw
    } else {
        ccw
    }
}

/// Heading midway between two headings, along the arc from `b` to `a`
/// crossing north when `a < b`.
pub fn middle_heading(a: f64, b: f64) -> f64 {
    if b > a {
        normalize_heading(a + (b - a) / 2.0)
    } else {
        normalize_heading(b + (360.0 + a - b) / 2.0)
    }
}

/// Great-circle distance in metres between two `(lat, lon)` pairs, by the
/// haversine formula.
pub fn great_circle_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Convert cartesian wind components to a `(bearing, magnitude)` pair.
///
/// The bearing is flipped by 180° relative to raw `atan2`, giving the
/// direction the flow comes *from* rather than points toward.
pub fn cartesian_to_polar_bearing(x: f64, y: f64) -> (f64, f64) {
    let magnitude = x.hypot(y);
    let mut bearing = x.atan2(y).to_degrees();
    if bearing < 0.0 {
        bearing += 360.0;
    }
    if bearing <= 180.0 {
        bearing += 180.0;
    } else {
        bearing -= 180.0;
    }
    (bearing, magnitude)
}
