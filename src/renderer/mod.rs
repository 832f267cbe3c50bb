mod machinery;
mod worker;

use std::{num::NonZeroU32, time::Instant};

use image::RgbImage;
use log::info;
use thiserror::Error;

pub use crate::renderer::machinery::{Progress, RenderProgress, render};
use crate::{
    camera::Camera, geometry::ScreenSize, renderer::worker::Worker, scene::Scene,
    screen_block::ScreenBlock, tracer::TraceStats,
};

const DEFAULT_TILE_ROWS: NonZeroU32 = NonZeroU32::new(16).unwrap();

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    /// Number of image rows traced together as one batch
    pub tile_rows: NonZeroU32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            tile_rows: DEFAULT_TILE_ROWS,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("failed to start worker thread")]
    Spawn(#[from] std::io::Error),
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Traces the whole image as a single batch of rays.
pub fn render_image(scene: &Scene, camera: &Camera) -> Result<(RgbImage, TraceStats), RenderError> {
    let block = ScreenBlock::from_size(check_resolution(camera)?);
    let start = Instant::now();

    let mut worker = Worker::new(0);
    let image = worker.render_tile(scene, camera, &block);
    let stats = worker.into_stats();

    info!(
        "Rendered {}x{} in {:.2?}: {stats}",
        image.width(),
        image.height(),
        start.elapsed()
    );
    Ok((image, stats))
}

pub(crate) fn check_resolution(camera: &Camera) -> Result<ScreenSize, RenderError> {
    let resolution = camera.get_resolution();
    if resolution.x == 0 || resolution.y == 0 {
        Err(RenderError::EmptyImage {
            width: resolution.x,
            height: resolution.y,
        })
    } else {
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{Color, WorldPoint},
        scene::Sphere,
    };
    use assert2::{assert, let_assert};

    /// Red sphere straight ahead of the eye, filling the middle of a 3x3 image.
    fn sphere_scene() -> Scene {
        Scene::builder()
            .light(WorldPoint::new(5.0, 5.0, -10.0))
            .eye(WorldPoint::new(0.0, 0.25, -1.0))
            .primitives(vec![
                Sphere::builder()
                    .center(WorldPoint::new(0.0, 0.25, 2.0))
                    .radius(0.5)
                    .diffuse(Color::new(0.5, 0.0, 0.0))
                    .build()
                    .into(),
            ])
            .build()
    }

    #[test]
    fn sphere_in_the_middle() {
        let scene = sphere_scene();
        let camera = Camera::for_scene(&scene, ScreenSize::new(3, 3));
        let_assert!(Ok((image, stats)) = render_image(&scene, &camera));

        assert!(image.dimensions() == (3, 3));
        assert!(image.as_raw().len() == 27);
        assert!(image.get_pixel(1, 1).0[0] > 0);
        assert!(image.get_pixel(0, 0).0 == [0, 0, 0]);
        assert!(image.get_pixel(2, 2).0 == [0, 0, 0]);

        assert!(stats.primary_rays == 9);
        assert!(stats.shadow_rays == 1);
    }

    #[test]
    fn demo_scene_is_deterministic() {
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(32, 24));
        let_assert!(Ok((first, _)) = render_image(&scene, &camera));
        let_assert!(Ok((second, _)) = render_image(&scene, &camera));

        assert!(first.dimensions() == (32, 24));
        assert!(first == second);
        assert!(first.pixels().any(|p| p.0 != [0, 0, 0]));
    }

    #[test]
    fn empty_image() {
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(0, 24));
        let_assert!(
            Err(RenderError::EmptyImage {
                width: 0,
                height: 24
            }) = render_image(&scene, &camera)
        );
    }
}
