//! Geometry primitives.

use cgmath::{MetricSpace, Point2};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// A 2D point
pub type Point2d = Point2<f64>;

/// The tolerance used when comparing coordinates and angles.
pub const EPS: f64 = 1e-9;

/// Creates a point, converting any `-0.0` coordinate into `+0.0`.
pub fn point(x: f64, y: f64) -> Point2d {
    Point2d::new(x + 0.0, y + 0.0)
}

/// Wraps an angle in radians into the range [-pi, pi].
pub fn normalize_angle(angle: f64) -> f64 {
    if angle < -PI {
        angle + 2.0 * PI
    } else if angle > PI {
        angle - 2.0 * PI
    } else {
        angle
    }
}

/// Operations on points which tolerate floating point error.
pub trait PointExt: Sized {
    /// Whether both coordinates agree to within [EPS].
    fn approx_eq(&self, other: &Self) -> bool;

    /// Compares by y coordinate, breaking ties by x coordinate.
    fn cmp_yx(&self, other: &Self) -> Ordering;

    /// The angle of the ray from this point to `other`, between -pi and pi.
    /// Zero if the points are equal.
    fn angle_to(&self, other: &Self) -> f64;

    /// Rotates the point by `theta` radians around `pivot`.
    fn rotate_about(&self, pivot: &Self, theta: f64) -> Self;

    /// Moves the point `dist` units along the ray towards `target`.
    /// This may overshoot `target`.
    fn step_towards(&self, target: &Self, dist: f64) -> Self;
}

impl PointExt for Point2d {
    fn approx_eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() <= EPS && (self.y - other.y).abs() <= EPS
    }

    fn cmp_yx(&self, other: &Self) -> Ordering {
        let cmp = |a: f64, b: f64| {
            if a < b - EPS {
                Ordering::Less
            } else if a > b + EPS {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        };
        cmp(self.y, other.y).then_with(|| cmp(self.x, other.x))
    }

    fn angle_to(&self, other: &Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    fn rotate_about(&self, pivot: &Self, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        let (dx, dy) = (self.x - pivot.x, self.y - pivot.y);
        point(pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
    }

    fn step_towards(&self, target: &Self, dist: f64) -> Self {
        let angle = self.angle_to(target);
        point(self.x + dist * angle.cos(), self.y + dist * angle.sin())
    }
}

/// The Euclidean distance between two points.
pub fn distance(a: Point2d, b: Point2d) -> f64 {
    a.distance(b)
}
