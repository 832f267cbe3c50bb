use bon::bon;

use crate::{
    geometry::{Color, FloatType, Lanes, Rays, WorldPoint, WorldVector, rotate_about_y},
    scene::Object,
};

use super::hit_or_faraway;

/// Infinite plane with a checkerboard of squares 0.5 units wide.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub point: WorldPoint,
    /// Must be unit length, otherwise shading is wrong.
    pub normal: WorldVector,
    /// Color of the lit squares, the others are black.
    pub diffuse: Color,
    pub mirror: FloatType,
}

#[bon]
impl Plane {
    #[builder]
    pub fn new(
        point: WorldPoint,
        normal: WorldVector,
        diffuse: Color,
        #[builder(default = 0.05)] mirror: FloatType,
    ) -> Self {
        Plane {
            point,
            normal,
            diffuse,
            mirror,
        }
    }

    /// True on the squares that show the diffuse color.
    fn checker(point: &WorldPoint) -> bool {
        let parity = |coord: FloatType| (coord * 2.0).floor().rem_euclid(2.0);
        parity(point.x) == parity(point.z)
    }
}

impl Object for Plane {
    fn intersect(&self, rays: &Rays) -> Lanes<FloatType> {
        rays.origin.zip_map(&rays.direction, |&origin, direction| {
            let t = -self.normal.dot(&(origin - self.point)) / self.normal.dot(direction);
            hit_or_faraway(t)
        })
    }

    fn normal(
        &self,
        points: &Lanes<WorldPoint>,
        _directions: &Lanes<WorldVector>,
    ) -> Lanes<WorldVector> {
        Lanes::splat(self.normal, points.len())
    }

    fn diffuse_color(&self, points: &Lanes<WorldPoint>) -> Lanes<Color> {
        points.map(|m| {
            if Self::checker(m) {
                self.diffuse
            } else {
                Color::zeros()
            }
        })
    }

    fn mirror(&self) -> FloatType {
        self.mirror
    }

    fn rotate(&mut self, angle: FloatType) {
        let rotation = rotate_about_y(angle);
        self.point = rotation * self.point;
        self.normal = rotation * self.normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::FARAWAY, scene::primitives::test::single_ray};
    use assert2::assert;
    use proptest::prop_assert;
    use test_case::test_case;
    use test_strategy::proptest;

    fn floor() -> Plane {
        Plane::builder()
            .point(WorldPoint::new(0.0, -1.0, 0.0))
            .normal(WorldVector::y())
            .diffuse(Color::new(1.0, 1.0, 1.0))
            .build()
    }

    #[test_case([0.0, 2.0, 0.0], [0.0, -1.0, 0.0] => 3.0 ; "straight down from above")]
    #[test_case([0.0, -3.0, 0.0], [0.0, 1.0, 0.0] => 2.0 ; "straight up from below")]
    #[test_case([0.0, -3.0, 0.0], [0.0, -1.0, 0.0] => FARAWAY ; "down from below")]
    #[test_case([0.0, 2.0, 0.0], [0.0, 1.0, 0.0] => FARAWAY ; "up from above")]
    #[test_case([0.0, 2.0, 0.0], [1.0, 0.0, 0.0] => FARAWAY ; "parallel")]
    fn floor_distance(origin: [FloatType; 3], direction: [FloatType; 3]) -> FloatType {
        floor().intersect(&single_ray(origin, direction))[0]
    }

    #[test]
    fn slanted_ray() {
        let t = floor().intersect(&single_ray([0.0, 1.0, 0.0], [1.0, -1.0, 0.0]))[0];
        assert!((t - 2.0 * 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test_case([0.25, -1.0, 0.25] => true ; "first square")]
    #[test_case([0.75, -1.0, 0.25] => false ; "neighbour along x")]
    #[test_case([0.25, -1.0, 0.75] => false ; "neighbour along z")]
    #[test_case([0.75, -1.0, 0.75] => true ; "diagonal")]
    #[test_case([-0.25, -1.0, 0.25] => false ; "across zero along x")]
    #[test_case([-0.25, -1.0, -0.25] => true ; "negative diagonal")]
    fn checkerboard(point: [FloatType; 3]) -> bool {
        let color = floor().diffuse_color(&Lanes::new(vec![WorldPoint::from(point)]))[0];
        color == Color::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn default_mirror() {
        assert!(floor().mirror() == 0.05);
    }

    #[proptest]
    fn rotation_round_trip(
        #[strategy(-10.0f64..10.0)] x: f64,
        #[strategy(-10.0f64..10.0)] z: f64,
        #[strategy(-10.0f64..10.0)] angle: f64,
    ) {
        let mut plane = floor();
        plane.point = WorldPoint::new(x, -1.0, z);
        plane.normal = WorldVector::new(1.0, 1.0, 0.0).normalize();
        let original = plane.clone();

        plane.rotate(angle);
        prop_assert!((plane.normal.norm() - 1.0).abs() < 1e-12);
        plane.rotate(-angle);

        prop_assert!((plane.point - original.point).norm() < 1e-9);
        prop_assert!((plane.normal - original.normal).norm() < 1e-9);
    }
}
