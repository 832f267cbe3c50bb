use image::RgbImage;
use log::debug;

use crate::{
    camera::Camera,
    geometry::{Color, Lanes},
    scene::Scene,
    screen_block::ScreenBlock,
    tracer::{TraceStats, Tracer},
    util::color_to_image,
};

/// Renders tiles one after another, keeping counters of everything it traced.
pub struct Worker {
    id: usize,
    stats: TraceStats,
}

impl Worker {
    pub fn new(worker_id: usize) -> Self {
        Self {
            id: worker_id,
            stats: TraceStats::default(),
        }
    }

    /// Traces all pixels of the tile as one batch and returns them as an image
    /// of the tile's size.
    pub fn render_tile(&mut self, scene: &Scene, camera: &Camera, tile: &ScreenBlock) -> RgbImage {
        debug!("worker{} tracing rows {:?}", self.id, tile.rows());

        let mut tracer = Tracer::new(scene);
        let colors = tracer.trace(&camera.primary_rays(tile), 0);
        self.stats = self.stats.merge(tracer.stats());

        colors_to_image(tile, &colors)
    }

    pub fn into_stats(self) -> TraceStats {
        self.stats
    }
}

/// Lays out row-major pixel colors as an image of the tile's size.
fn colors_to_image(tile: &ScreenBlock, colors: &Lanes<Color>) -> RgbImage {
    assert!(colors.len() == tile.pixel_count());
    RgbImage::from_fn(tile.width, tile.height(), |x, y| {
        color_to_image(&colors[y as usize * tile.width as usize + x as usize])
    })
}
