//! Spatial math for link range checks and line-of-sight occlusion.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use crate::models::OccludingBody;

/// Position or direction in the shared absolute frame (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Euclidean distance between two points in meters.
///
/// Non-finite input collapses to `f64::INFINITY` so range checks fail
/// instead of passing on NaN comparisons.
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    let d = (b - a).length();
    if d.is_nan() {
        f64::INFINITY
    } else {
        d
    }
}

/// Check whether the straight segment `from -> to` clears every body.
///
/// A body blocks when its center projects strictly between the two
/// endpoints and the perpendicular miss distance is below
/// `radius - clearance_m`. Grazing the shrunken sphere does not block, which
/// keeps links from flickering at tangency (and lets surface stations see
/// the sky above their own body).
///
/// Returns false on the first blocking body.
pub fn has_line_of_sight(
    from: Vec3,
    to: Vec3,
    bodies: &[OccludingBody],
    clearance_m: f64,
) -> bool {
    let segment = to - from;
    let segment_len2 = segment.length_squared();

    for body in bodies {
        let radius = (body.radius_m - clearance_m.max(0.0)).max(0.0);
        if radius <= 0.0 {
            continue;
        }

        // Degenerate segment: treat as a point test.
        if segment_len2 == 0.0 {
            if (body.center - from).length_squared() < radius * radius {
                return false;
            }
            continue;
        }

        let to_center = body.center - from;
        let t = to_center.dot(segment) / segment_len2;
        if !(t > 0.0 && t < 1.0) {
            continue;
        }

        let closest = from + segment * t;
        if (body.center - closest).length_squared() < radius * radius {
            return false;
        }
    }

    true
}

/// Check whether `candidate` lies inside the cone that starts at `origin`
/// and opens toward `aim`, with half-angle given as its cosine.
///
/// A cosine of 1.0 (or above) is a closed cone and covers nothing.
pub fn within_cone(origin: Vec3, aim: Vec3, candidate: Vec3, cone_cos: f64) -> bool {
    if cone_cos >= 1.0 || cone_cos.is_nan() {
        return false;
    }

    let axis = aim - origin;
    let offset = candidate - origin;
    let norms = axis.length() * offset.length();
    if norms == 0.0 || !norms.is_finite() {
        return false;
    }

    axis.dot(offset) / norms >= cone_cos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BodyId;

    fn body(center: Vec3, radius_m: f64) -> OccludingBody {
        OccludingBody::new(BodyId(1), "Mun", center, radius_m)
    }

    #[test]
    fn test_distance_is_euclidean() {
        let d = distance(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 4.0, 12.0));
        assert!((d - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_body_at_midpoint_blocks() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10_000.0, 0.0, 0.0);
        let bodies = [body(Vec3::new(5_000.0, 0.0, 0.0), 1_000.0)];
        assert!(!has_line_of_sight(a, b, &bodies, 5.0));
        assert!(!has_line_of_sight(b, a, &bodies, 5.0));
    }

    #[test]
    fn test_body_moved_off_segment_clears() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10_000.0, 0.0, 0.0);
        let bodies = [body(Vec3::new(5_000.0, 1_001.0, 0.0), 1_000.0)];
        assert!(has_line_of_sight(a, b, &bodies, 5.0));
    }

    #[test]
    fn test_tangent_body_does_not_block() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10_000.0, 0.0, 0.0);
        // Miss distance equals the radius exactly.
        let bodies = [body(Vec3::new(5_000.0, 1_000.0, 0.0), 1_000.0)];
        assert!(has_line_of_sight(a, b, &bodies, 5.0));
    }

    #[test]
    fn test_body_beyond_endpoint_does_not_block() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1_000.0, 0.0, 0.0);
        let bodies = [body(Vec3::new(5_000.0, 0.0, 0.0), 1_000.0)];
        assert!(has_line_of_sight(a, b, &bodies, 5.0));
    }

    #[test]
    fn test_degenerate_segment_is_total() {
        let p = Vec3::new(100.0, 0.0, 0.0);
        let inside = [body(Vec3::ZERO, 1_000.0)];
        let outside = [body(Vec3::new(10_000.0, 0.0, 0.0), 1_000.0)];
        assert!(!has_line_of_sight(p, p, &inside, 5.0));
        assert!(has_line_of_sight(p, p, &outside, 5.0));
    }

    #[test]
    fn test_zero_radius_body_never_blocks() {
        let bodies = [body(Vec3::new(500.0, 0.0, 0.0), 0.0)];
        assert!(has_line_of_sight(
            Vec3::ZERO,
            Vec3::new(1_000.0, 0.0, 0.0),
            &bodies,
            5.0
        ));
    }

    #[test]
    fn test_within_cone() {
        let origin = Vec3::ZERO;
        let aim = Vec3::new(1_000.0, 0.0, 0.0);
        let cos_10deg = 10.0_f64.to_radians().cos();

        assert!(within_cone(origin, aim, Vec3::new(500.0, 50.0, 0.0), cos_10deg));
        assert!(!within_cone(origin, aim, Vec3::new(500.0, 500.0, 0.0), cos_10deg));
        assert!(!within_cone(origin, aim, Vec3::new(-500.0, 0.0, 0.0), cos_10deg));
        // Closed cone.
        assert!(!within_cone(origin, aim, Vec3::new(500.0, 0.0, 0.0), 1.0));
    }
}
