use bon::bon;

use crate::{
    geometry::{Color, FARAWAY, FloatType, Lanes, Rays, WorldPoint, WorldVector, rotate_about_y},
    scene::Object,
};

use super::hit_or_faraway;

/// Two sided triangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub a: WorldPoint,
    pub b: WorldPoint,
    pub c: WorldPoint,
    pub diffuse: Color,
    pub mirror: FloatType,
}

#[bon]
impl Triangle {
    #[builder]
    pub fn new(
        a: WorldPoint,
        b: WorldPoint,
        c: WorldPoint,
        diffuse: Color,
        #[builder(default = 0.5)] mirror: FloatType,
    ) -> Self {
        Triangle {
            a,
            b,
            c,
            diffuse,
            mirror,
        }
    }
}

/// Solution of the ray / supporting plane intersection.
#[derive(Copy, Clone, Debug)]
struct PlaneHit {
    /// Distance along the ray
    t: FloatType,
    /// Barycentric weight of vertex b
    r: FloatType,
    /// Barycentric weight of vertex c
    s: FloatType,
}

impl PlaneHit {
    fn is_inside(&self) -> bool {
        (0.0..=1.0).contains(&self.r) && (0.0..=1.0).contains(&self.s) && self.r + self.s <= 1.0
    }
}

impl Triangle {
    /// Edge vectors, coming from a
    fn edges(&self) -> (WorldVector, WorldVector) {
        (self.b - self.a, self.c - self.a)
    }

    /// Unit normal following the right hand rule over a, b, c.
    pub fn face_normal(&self) -> WorldVector {
        let (u, v) = self.edges();
        u.cross(&v).normalize()
    }

    /// Parallel rays produce non-finite values.
    fn solve(&self, origin: &WorldPoint, direction: &WorldVector) -> PlaneHit {
        let (u, v) = self.edges();
        let w = *origin - self.a;

        let d_cross_v = direction.cross(&v);
        let w_cross_u = w.cross(&u);
        let den = d_cross_v.dot(&u);

        PlaneHit {
            t: w_cross_u.dot(&v) / den,
            r: d_cross_v.dot(&w) / den,
            s: w_cross_u.dot(direction) / den,
        }
    }
}

impl Object for Triangle {
    fn intersect(&self, rays: &Rays) -> Lanes<FloatType> {
        rays.origin.zip_map(&rays.direction, |origin, direction| {
            let hit = self.solve(origin, direction);
            if hit.is_inside() {
                hit_or_faraway(hit.t)
            } else {
                FARAWAY
            }
        })
    }

    /// Face normal, turned towards the incoming ray.
    fn normal(
        &self,
        _points: &Lanes<WorldPoint>,
        directions: &Lanes<WorldVector>,
    ) -> Lanes<WorldVector> {
        let n = self.face_normal();
        directions.map(|d| if d.dot(&n) > 0.0 { -n } else { n })
    }

    fn diffuse_color(&self, points: &Lanes<WorldPoint>) -> Lanes<Color> {
        Lanes::splat(self.diffuse, points.len())
    }

    fn mirror(&self) -> FloatType {
        self.mirror
    }

    fn rotate(&mut self, angle: FloatType) {
        let rotation = rotate_about_y(angle);
        self.a = rotation * self.a;
        self.b = rotation * self.b;
        self.c = rotation * self.c;
    }
}
