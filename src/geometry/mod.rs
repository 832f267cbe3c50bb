mod lanes;
mod rays;

pub use lanes::{Lanes, Mask};
pub use rays::Rays;

use nalgebra::{Point3, Rotation3, Vector2, Vector3};

pub type FloatType = f64;

pub type ScreenSize = Vector2<u32>;

pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;

/// Linear RGB, nominally in 0-1 range
pub type Color = Vector3<FloatType>;

/// Distance reported for rays that don't hit anything.
/// Implausibly large, but still finite and comparable.
pub const FARAWAY: FloatType = 1.0e39;

/// Offset along the surface normal applied to origins of secondary rays,
/// so that they don't immediately hit the surface they start on.
pub const NUDGE: FloatType = 1e-4;

pub const AMBIENT: Color = Color::new(0.05, 0.05, 0.05);

/// Rotates a point or a vector around the world Y axis.
///
/// Positive angle turns +X towards +Z.
pub fn rotate_about_y(angle: FloatType) -> Rotation3<FloatType> {
    Rotation3::from_axis_angle(&WorldVector::y_axis(), -angle)
}
