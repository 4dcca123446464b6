//! Planar geometry primitives.
//!
//! Everything in the mesher works on `nalgebra` [`Point2`]/[`Vector2`] values
//! with `f64` coordinates. This module collects the small set of predicates the
//! rest of the crate relies on:
//!
//! - [`vector`]: cross products, orientation, angle measurement, rotation
//! - [`ray`]: segments and rays with intersection tests
//!
//! [`Point2`]: nalgebra::Point2
//! [`Vector2`]: nalgebra::Vector2

pub mod ray;
pub mod vector;

pub use ray::{Ray, Segment};
pub use vector::{
    angle_between, ccw_angle, cross, orient, points_coincide, polygon_signed_area, rotate,
    COINCIDENCE_TOLERANCE,
};
