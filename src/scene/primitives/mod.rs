mod plane;
mod sphere;
mod triangle;

pub use plane::Plane;
pub use sphere::Sphere;
pub use triangle::Triangle;

use crate::geometry::{Color, FARAWAY, FloatType, Lanes, Rays, WorldPoint, WorldVector};

use super::Object;

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Plane(Plane),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Primitive::Sphere($p) => $body,
            Primitive::Triangle($p) => $body,
            Primitive::Plane($p) => $body,
        }
    };
}

impl Object for Primitive {
    fn intersect(&self, rays: &Rays) -> Lanes<FloatType> {
        dispatch!(self, p => p.intersect(rays))
    }

    fn normal(
        &self,
        points: &Lanes<WorldPoint>,
        directions: &Lanes<WorldVector>,
    ) -> Lanes<WorldVector> {
        dispatch!(self, p => p.normal(points, directions))
    }

    fn diffuse_color(&self, points: &Lanes<WorldPoint>) -> Lanes<Color> {
        dispatch!(self, p => p.diffuse_color(points))
    }

    fn mirror(&self) -> FloatType {
        dispatch!(self, p => p.mirror())
    }

    fn rotate(&mut self, angle: FloatType) {
        dispatch!(self, p => p.rotate(angle))
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Triangle> for Primitive {
    fn from(triangle: Triangle) -> Self {
        Primitive::Triangle(triangle)
    }
}

impl From<Plane> for Primitive {
    fn from(plane: Plane) -> Self {
        Primitive::Plane(plane)
    }
}

/// Maps a candidate distance to itself if it's a usable hit, to FARAWAY otherwise.
/// NaN is never a hit.
fn hit_or_faraway(t: FloatType) -> FloatType {
    if t > 0.0 && t < FARAWAY { t } else { FARAWAY }
}
