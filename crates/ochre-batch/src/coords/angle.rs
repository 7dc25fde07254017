//! Angle helpers for screen space (+Y down).
//!
//! With +Y pointing down, positive angles sweep clockwise on screen.

use std::f32::consts::{FRAC_PI_2, PI};

pub const TAU: f32 = PI * 2.0;
pub const RIGHT: f32 = 0.0;
pub const DOWN: f32 = FRAC_PI_2;
pub const LEFT: f32 = PI;
pub const UP: f32 = -FRAC_PI_2;

/// Shortest signed difference from `a` to `b`, in `(-PI, PI]`.
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let mut d = (b - a) % TAU;
    if d <= -PI {
        d += TAU;
    } else if d > PI {
        d -= TAU;
    }
    d
}
