use bon::bon;

use crate::{
    geometry::{Color, FARAWAY, FloatType, Lanes, Rays, WorldPoint, WorldVector, rotate_about_y},
    scene::Object,
};

use super::hit_or_faraway;

#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: WorldPoint,
    /// Must be positive, otherwise shading produces NaNs.
    pub radius: FloatType,
    pub diffuse: Color,
    pub mirror: FloatType,
}

#[bon]
impl Sphere {
    #[builder]
    pub fn new(
        center: WorldPoint,
        radius: FloatType,
        diffuse: Color,
        #[builder(default = 0.5)] mirror: FloatType,
    ) -> Self {
        Sphere {
            center,
            radius,
            diffuse,
            mirror,
        }
    }
}

impl Object for Sphere {
    fn intersect(&self, rays: &Rays) -> Lanes<FloatType> {
        let c = self.center.coords;
        let c_squared = c.norm_squared();
        let r_squared = self.radius * self.radius;

        rays.origin.zip_map(&rays.direction, |origin, direction| {
            let o = origin.coords;
            let b = 2.0 * direction.dot(&(o - c));
            let cc = c_squared + o.norm_squared() - 2.0 * c.dot(&o) - r_squared;
            let discriminant = b * b - 4.0 * cc;

            if discriminant <= 0.0 {
                return FARAWAY;
            }

            let sq = discriminant.sqrt();
            let h0 = (-b - sq) / 2.0;
            let h1 = (-b + sq) / 2.0;
            hit_or_faraway(if h0 > 0.0 && h0 < h1 { h0 } else { h1 })
        })
    }

    fn normal(
        &self,
        points: &Lanes<WorldPoint>,
        _directions: &Lanes<WorldVector>,
    ) -> Lanes<WorldVector> {
        points.map(|&m| (m - self.center) / self.radius)
    }

    fn diffuse_color(&self, points: &Lanes<WorldPoint>) -> Lanes<Color> {
        Lanes::splat(self.diffuse, points.len())
    }

    fn mirror(&self) -> FloatType {
        self.mirror
    }

    fn rotate(&mut self, angle: FloatType) {
        self.center = rotate_about_y(angle) * self.center;
    }
}
