//! 2D vector algebra and angle computation.

use std::f64::consts::TAU;

use nalgebra::{Point2, Rotation2, Vector2};

/// Distance below which two coordinates are considered the same point.
pub const COINCIDENCE_TOLERANCE: f64 = 1e-12;

/// The z component of the 3D cross product of two planar vectors.
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive when the points turn counter-clockwise, negative when clockwise,
/// zero when collinear.
#[inline]
pub fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    cross(&(b - a), &(c - a))
}

/// Check whether two points coincide within [`COINCIDENCE_TOLERANCE`].
#[inline]
pub fn points_coincide(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    (a.x - b.x).abs() < COINCIDENCE_TOLERANCE && (a.y - b.y).abs() < COINCIDENCE_TOLERANCE
}

/// Unsigned angle between two vectors, in `[0, π]`.
///
/// A zero-length vector yields `0.0`.
pub fn angle_between(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < COINCIDENCE_TOLERANCE {
        return 0.0;
    }
    // atan2 is stable near 0 and π where acos loses precision
    cross(a, b).abs().atan2(a.dot(b))
}

/// Angle swept counter-clockwise from `from` to `to`, in `[0, 2π)`.
///
/// Collinear vectors pointing the same way give `0.0`; opposite vectors give
/// exactly `π`.
pub fn ccw_angle(from: &Vector2<f64>, to: &Vector2<f64>) -> f64 {
    let angle = cross(from, to).atan2(from.dot(to));
    if angle < 0.0 {
        let wrapped = angle + TAU;
        if wrapped >= TAU {
            0.0
        } else {
            wrapped
        }
    } else {
        angle
    }
}

/// Rotate a vector counter-clockwise by `angle` radians.
#[inline]
pub fn rotate(v: &Vector2<f64>, angle: f64) -> Vector2<f64> {
    Rotation2::new(angle) * v
}

/// Signed area of a simple polygon given in walk order (shoelace formula).
pub fn polygon_signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        twice += p.x * q.y - q.x * p.y;
    }
    0.5 * twice
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_orient_sign() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(orient(&a, &b, &Point2::new(0.0, 1.0)) > 0.0);
        assert!(orient(&a, &b, &Point2::new(0.0, -1.0)) < 0.0);
        assert_eq!(orient(&a, &b, &Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_angle_between() {
        let x = Vector2::new(1.0, 0.0);
        let y = Vector2::new(0.0, 2.0);
        assert!((angle_between(&x, &y) - FRAC_PI_2).abs() < 1e-12);
        assert!((angle_between(&x, &-x) - PI).abs() < 1e-12);
        assert_eq!(angle_between(&x, &Vector2::zeros()), 0.0);
    }

    #[test]
    fn test_ccw_angle_full_range() {
        let x = Vector2::new(1.0, 0.0);
        assert!((ccw_angle(&x, &Vector2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-12);
        assert!((ccw_angle(&x, &Vector2::new(0.0, -1.0)) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((ccw_angle(&x, &Vector2::new(-1.0, 0.0)) - PI).abs() < 1e-12);
        assert_eq!(ccw_angle(&x, &x), 0.0);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(&Vector2::new(1.0, 0.0), FRAC_PI_2);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_signed_area() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!((polygon_signed_area(&square) - 4.0).abs() < 1e-12);

        let mut reversed = square;
        reversed.reverse();
        assert!((polygon_signed_area(&reversed) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_points_coincide() {
        let a = Point2::new(1.0, 1.0);
        assert!(points_coincide(&a, &Point2::new(1.0 + 1e-13, 1.0)));
        assert!(!points_coincide(&a, &Point2::new(1.0 + 1e-9, 1.0)));
    }
}
