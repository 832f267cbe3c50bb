pub mod primitives;

use std::ops::Index;

use bon::bon;
use index_vec::IndexVec;
use log::debug;

use crate::geometry::{Color, FloatType, Lanes, Rays, WorldPoint, WorldVector};

pub use primitives::{Plane, Primitive, Sphere, Triangle};

/// Angle of a single rotation step of the demo scene.
pub const ROTATION_STEP: FloatType = std::f64::consts::PI / 10.0;

/// Renderable object.
///
/// All methods work on a batch of rays or points at once, one per lane.
pub trait Object {
    /// Returns the distance along each ray to the nearest intersection in front of the ray
    /// origin, or [`FARAWAY`](crate::geometry::FARAWAY) for lanes that don't hit.
    fn intersect(&self, rays: &Rays) -> Lanes<FloatType>;

    /// Unit surface normal at points lying on the object, hit by rays going along `directions`.
    fn normal(
        &self,
        points: &Lanes<WorldPoint>,
        directions: &Lanes<WorldVector>,
    ) -> Lanes<WorldVector>;

    fn diffuse_color(&self, points: &Lanes<WorldPoint>) -> Lanes<Color>;

    /// Fraction of the reflected light added to the surface color.
    fn mirror(&self) -> FloatType;

    /// Rotates the object around the world Y axis, see [`crate::geometry::rotate_about_y`].
    fn rotate(&mut self, angle: FloatType);
}

index_vec::define_index_type! {
    pub struct PrimitiveIdx = u32;
}

/// Primitives lit by a single point light, seen from a single eye position.
///
/// Primitive indices are stable for the lifetime of the scene, shadow testing depends on it.
#[derive(Clone, Debug)]
pub struct Scene {
    primitives: IndexVec<PrimitiveIdx, Primitive>,
    light: WorldPoint,
    eye: WorldPoint,
}

#[bon]
impl Scene {
    #[builder]
    pub fn new(
        light: WorldPoint,
        eye: WorldPoint,
        #[builder(default)] primitives: Vec<Primitive>,
    ) -> Self {
        debug!(
            "Scene with {} primitives, light at {light}, eye at {eye}",
            primitives.len()
        );
        Scene {
            primitives: IndexVec::from_vec(primitives),
            light,
            eye,
        }
    }
}

impl Scene {
    /// Three spheres marking the corners of a triangle, floating above a checkered floor.
    pub fn demo() -> Self {
        let a = WorldPoint::new(-0.5, 0.3, 1.2);
        let b = WorldPoint::new(0.5, 0.3, 1.2);
        let c = WorldPoint::new(0.0, 1.2, 1.2);

        Scene::builder()
            .light(WorldPoint::new(5.0, 5.0, -10.0))
            .eye(WorldPoint::new(0.0, 0.35, -1.0))
            .primitives(vec![
                Plane::builder()
                    .point(WorldPoint::new(0.0, -1.0, 0.0))
                    .normal(WorldVector::y())
                    .diffuse(Color::new(1.0, 1.0, 1.0))
                    .build()
                    .into(),
                Triangle::builder()
                    .a(a)
                    .b(b)
                    .c(c)
                    .diffuse(Color::new(1.0, 1.0, 0.0))
                    .build()
                    .into(),
                Sphere::builder()
                    .center(a)
                    .radius(0.4)
                    .diffuse(Color::new(0.0, 1.0, 0.0))
                    .build()
                    .into(),
                Sphere::builder()
                    .center(b)
                    .radius(0.4)
                    .diffuse(Color::new(1.0, 0.0, 0.0))
                    .build()
                    .into(),
                Sphere::builder()
                    .center(c)
                    .radius(0.4)
                    .diffuse(Color::new(0.0, 0.0, 1.0))
                    .build()
                    .into(),
            ])
            .build()
    }

    pub fn push(&mut self, primitive: impl Into<Primitive>) -> PrimitiveIdx {
        self.primitives.push(primitive.into())
    }

    pub fn primitives(&self) -> &IndexVec<PrimitiveIdx, Primitive> {
        &self.primitives
    }

    pub fn light(&self) -> WorldPoint {
        self.light
    }

    pub fn eye(&self) -> WorldPoint {
        self.eye
    }

    /// Rotates all primitives around the world Y axis.
    /// Light and eye stay in place.
    pub fn rotate(&mut self, angle: FloatType) {
        debug!(
            "Rotating {} primitives by {angle:.4} rad",
            self.primitives.len()
        );
        for primitive in self.primitives.iter_mut() {
            primitive.rotate(angle);
        }
    }

    /// Rotates the scene by a whole number of [`ROTATION_STEP`]s.
    pub fn rotate_steps(&mut self, steps: i32) {
        if steps != 0 {
            self.rotate(steps as FloatType * ROTATION_STEP);
        }
    }

    /// Distances to every primitive, indexed like the primitives.
    pub fn intersect_all(&self, rays: &Rays) -> IndexVec<PrimitiveIdx, Lanes<FloatType>> {
        self.primitives.iter().map(|p| p.intersect(rays)).collect()
    }
}

impl Index<PrimitiveIdx> for Scene {
    type Output = Primitive;

    fn index(&self, index: PrimitiveIdx) -> &Primitive {
        &self.primitives[index]
    }
}
