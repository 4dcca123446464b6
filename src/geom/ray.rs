//! Segments and rays with intersection queries.

use nalgebra::{Point2, Vector2};

use super::vector::{cross, orient, COINCIDENCE_TOLERANCE};

/// A line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Start point.
    pub a: Point2<f64>,
    /// End point.
    pub b: Point2<f64>,
}

impl Segment {
    /// Create a segment from its endpoints.
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self { a, b }
    }

    /// Direction vector from `a` to `b`.
    #[inline]
    pub fn direction(&self) -> Vector2<f64> {
        self.b - self.a
    }

    /// Length of the segment.
    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Midpoint of the segment.
    #[inline]
    pub fn midpoint(&self) -> Point2<f64> {
        Point2::from((self.a.coords + self.b.coords) * 0.5)
    }

    /// Check whether the two segments cross at a point interior to both.
    ///
    /// Touching at an endpoint and collinear overlap do not count: both
    /// endpoints of each segment must lie strictly on opposite sides of the
    /// other segment's supporting line.
    pub fn crosses(&self, other: &Segment) -> bool {
        let d1 = orient(&self.a, &self.b, &other.a);
        let d2 = orient(&self.a, &self.b, &other.b);
        let d3 = orient(&other.a, &other.b, &self.a);
        let d4 = orient(&other.a, &other.b, &self.b);
        d1 * d2 < 0.0 && d3 * d4 < 0.0
    }

    /// Intersection point of the two segments, if they meet.
    ///
    /// Shared endpoints count as intersections here. Parallel segments
    /// (including collinear ones) report `None`.
    pub fn intersection(&self, other: &Segment) -> Option<Point2<f64>> {
        let r = self.direction();
        let s = other.direction();
        let denom = cross(&r, &s);
        if denom.abs() < COINCIDENCE_TOLERANCE {
            return None;
        }
        let qp = other.a - self.a;
        let t = cross(&qp, &s) / denom;
        let u = cross(&qp, &r) / denom;
        let eps = COINCIDENCE_TOLERANCE;
        if (-eps..=1.0 + eps).contains(&t) && (-eps..=1.0 + eps).contains(&u) {
            Some(self.a + r * t)
        } else {
            None
        }
    }
}

/// A half-infinite ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    origin: Point2<f64>,
    direction: Vector2<f64>,
}

impl Ray {
    /// Create a ray from an origin and a direction (not necessarily unit length).
    pub fn new(origin: Point2<f64>, direction: Vector2<f64>) -> Self {
        Self { origin, direction }
    }

    /// The ray origin.
    pub fn origin(&self) -> &Point2<f64> {
        &self.origin
    }

    /// The ray direction.
    pub fn direction(&self) -> &Vector2<f64> {
        &self.direction
    }

    /// Point at parameter `t` along the ray.
    pub fn point_at(&self, t: f64) -> Point2<f64> {
        self.origin + self.direction * t
    }

    /// Parameter at which the ray hits a segment, if it does.
    ///
    /// Hits at the ray origin (t ≈ 0) are ignored so a ray leaving a mesh
    /// node does not report the edges incident to that node.
    pub fn intersect_segment(&self, segment: &Segment) -> Option<f64> {
        let s = segment.direction();
        let denom = cross(&self.direction, &s);
        if denom.abs() < COINCIDENCE_TOLERANCE {
            return None;
        }
        let qp = segment.a - self.origin;
        let t = cross(&qp, &s) / denom;
        let u = cross(&qp, &self.direction) / denom;
        if t > COINCIDENCE_TOLERANCE && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    /// Intersection of the supporting lines of two rays.
    ///
    /// Returns the parameters `(t, w)` on `self` and `other`, or `None` when
    /// the rays are parallel.
    pub fn line_intersection(&self, other: &Ray) -> Option<(f64, f64)> {
        let denom = cross(&self.direction, &other.direction);
        if denom.abs() < COINCIDENCE_TOLERANCE {
            return None;
        }
        let qp = other.origin - self.origin;
        let t = cross(&qp, &other.direction) / denom;
        let w = cross(&qp, &self.direction) / denom;
        Some((t, w))
    }
}
