use std::fmt::Display;

use index_vec::IndexVec;
use log::trace;

use crate::{
    geometry::{AMBIENT, Color, FARAWAY, FloatType, Lanes, Mask, NUDGE, Rays},
    scene::{Object as _, PrimitiveIdx, Scene},
    util::Stats,
};

/// Deepest recursion level that still shades mirror reflections.
/// Primary rays are traced at depth 0, so this allows two reflections.
pub const MAX_BOUNCE: u32 = 2;

const SPECULAR_EXPONENT: i32 = 50;

/// Counters of a single tracer, or merged from several.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceStats {
    pub trace_calls: usize,
    pub primary_rays: usize,
    pub reflection_rays: usize,
    pub shadow_rays: usize,
    /// Lanes per trace call
    pub batch_sizes: Stats,
}

impl TraceStats {
    pub fn merge(&self, other: &Self) -> Self {
        TraceStats {
            trace_calls: self.trace_calls + other.trace_calls,
            primary_rays: self.primary_rays + other.primary_rays,
            reflection_rays: self.reflection_rays + other.reflection_rays,
            shadow_rays: self.shadow_rays + other.shadow_rays,
            batch_sizes: self.batch_sizes.merge(&other.batch_sizes),
        }
    }
}

impl Display for TraceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} primary, {} reflection, {} shadow rays; {} trace calls, batch sizes {}",
            self.primary_rays,
            self.reflection_rays,
            self.shadow_rays,
            self.trace_calls,
            self.batch_sizes
        )
    }
}

/// Whitted style recursive ray tracer over batches of rays.
///
/// Every lane is an independent ray. The scene must not change while the tracer exists.
pub struct Tracer<'a> {
    scene: &'a Scene,
    stats: TraceStats,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Tracer {
            scene,
            stats: TraceStats::default(),
        }
    }

    pub fn stats(&self) -> &TraceStats {
        &self.stats
    }

    pub fn into_stats(self) -> TraceStats {
        self.stats
    }

    /// Returns color seen along each ray. Lanes that don't hit anything are black.
    pub fn trace(&mut self, rays: &Rays, bounce: u32) -> Lanes<Color> {
        trace!("Tracing {} rays, bounce {bounce}", rays.len());
        self.stats.trace_calls += 1;
        self.stats.batch_sizes.add_sample(rays.len());
        if bounce == 0 {
            self.stats.primary_rays += rays.len();
        } else {
            self.stats.reflection_rays += rays.len();
        }

        let distances = self.scene.intersect_all(rays);
        let nearest = nearest(&distances, rays.len());

        let mut color = Lanes::splat(Color::zeros(), rays.len());
        // Equally distant primitives: the first one in scene order wins the lane
        let mut claimed = Lanes::splat(false, rays.len());

        for (idx, distance) in distances.iter_enumerated() {
            let hit = distance
                .zip_map(&nearest, |&d, &n| n != FARAWAY && d == n)
                .and_not(&claimed);
            if !hit.any() {
                continue;
            }

            let shaded = self.shade(idx, &rays.extract(&hit), &distance.extract(&hit), bounce);
            color += &shaded.place(&hit);
            claimed = claimed.or(&hit);
        }

        color
    }

    /// Lights the points where the rays hit primitive `idx`, `distance` along each ray.
    /// All lanes must be hits of this primitive.
    pub fn shade(
        &mut self,
        idx: PrimitiveIdx,
        rays: &Rays,
        distance: &Lanes<FloatType>,
        bounce: u32,
    ) -> Lanes<Color> {
        let scene = self.scene;
        let primitive = &scene[idx];

        let points = rays.point_at(distance);
        let normals = primitive.normal(&points, &rays.direction);
        let to_light = points.map(|&m| scene.light() - m).normalize();
        let to_eye = points.map(|&m| scene.eye() - m).normalize();
        let nudged = &points + &normals.map(|n| n * NUDGE);

        let visible = self
            .sees_light(idx, &Rays::new(nudged.clone(), to_light.clone()))
            .to_factor();

        let mut color = Lanes::splat(AMBIENT, rays.len());

        // Lambert
        let lambert = normals.dot(&to_light).map(|x| x.max(0.0));
        color += &(&primitive.diffuse_color(&points) * &(&lambert * &visible));

        // Mirror reflection
        if bounce < MAX_BOUNCE {
            let twice_projection = rays.direction.dot(&normals).map(|x| 2.0 * x);
            let reflected = (&rays.direction - &(&normals * &twice_projection)).normalize();
            let mirror = primitive.mirror();
            let reflection = self.trace(&Rays::new(nudged, reflected), bounce + 1);
            color += &reflection.map(|c| c * mirror);
        }

        // Blinn-Phong
        let half = (&to_light + &to_eye).normalize();
        let specular = normals.dot(&half).zip_map(&visible, |&cos, &v| {
            cos.clamp(0.0, 1.0).powi(SPECULAR_EXPONENT) * v
        });
        color += &specular.map(|&s| Color::repeat(s));

        color
    }

    /// True for lanes where nothing is closer along the shadow ray than primitive `idx`
    /// itself (or nothing is hit at all).
    fn sees_light(&mut self, idx: PrimitiveIdx, shadow_rays: &Rays) -> Mask {
        self.stats.shadow_rays += shadow_rays.len();

        let distances = self.scene.intersect_all(shadow_rays);
        let nearest = nearest(&distances, shadow_rays.len());
        distances[idx].zip_map(&nearest, |own, nearest| own == nearest)
    }
}

/// Lane-wise minimum over all primitives, FARAWAY if there are none.
fn nearest(distances: &IndexVec<PrimitiveIdx, Lanes<FloatType>>, len: usize) -> Lanes<FloatType> {
    distances
        .iter()
        .fold(Lanes::splat(FARAWAY, len), |acc, d| {
            acc.zip_map(d, |&a, &b| a.min(b))
        })
}
