use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use image::{GenericImage as _, RgbImage};
use log::{debug, info, warn};

use crate::{
    camera::Camera,
    renderer::{RenderError, RenderSettings, check_resolution, worker::Worker},
    scene::Scene,
    screen_block::ScreenBlock,
    tracer::TraceStats,
};

/// Number of finished and total tiles of a render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub finished: usize,
    pub total: usize,
}

/// Starts rendering on one worker thread per core and returns immediately.
///
/// `finished_tile_callback` is called from the worker threads after each tile is copied
/// into the output image.
pub fn render<F: Fn(ScreenBlock, Progress) + Send + Sync + 'static>(
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
    finished_tile_callback: F,
) -> Result<RenderProgress, RenderError> {
    let resolution = check_resolution(&camera)?;
    let image = RgbImage::new(resolution.x, resolution.y);
    let state = Arc::new(RenderState {
        scene,
        camera,

        image: Mutex::new(image),

        tile_ordering: ScreenBlock::from_size(resolution).tile_ordering(settings.tile_rows),
        next_tile_index: AtomicUsize::new(0),
        finished_tiles: AtomicUsize::new(0),
    });
    let finished_tile_callback = Arc::new(finished_tile_callback);

    let cores: Vec<Option<core_affinity::CoreId>> = match core_affinity::get_core_ids() {
        Some(ids) if !ids.is_empty() => ids.into_iter().map(Some).collect(),
        _ => {
            warn!("CPU list unavailable, running workers without pinning");
            vec![None; num_cpus::get().max(1)]
        }
    };

    info!(
        "Rendering {}x{} in {} tiles of {} rows on {} workers",
        resolution.x,
        resolution.y,
        state.tile_ordering.len(),
        settings.tile_rows,
        cores.len()
    );

    let mut threads = Vec::with_capacity(cores.len());
    for (worker_id, core) in cores.into_iter().enumerate() {
        let spawned = {
            let state = Arc::clone(&state);
            let finished_tile_callback = Arc::clone(&finished_tile_callback);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }

                    let mut worker = Worker::new(worker_id);

                    while let Some(tile) = state.get_next_tile() {
                        let buffer = worker.render_tile(&state.scene, &state.camera, tile);
                        state
                            .image
                            .lock()
                            .expect("Poisoned lock!")
                            .copy_from(&buffer, 0, tile.min_y)
                            .unwrap_or_else(|_| {
                                unreachable!("The buffer should always fit into the output")
                            });

                        let finished = state.finished_tiles.fetch_add(1, Ordering::AcqRel) + 1;
                        (finished_tile_callback)(
                            *tile,
                            Progress {
                                finished,
                                total: state.tile_ordering.len(),
                            },
                        );
                    }

                    debug!("worker{worker_id} done");
                    worker.into_stats()
                })
        };

        match spawned {
            Ok(handle) => threads.push((worker_id, handle)),
            Err(error) => {
                // Workers that already started must not keep running in the background
                state.abort();
                for (_, handle) in threads {
                    let _ = handle.join();
                }
                return Err(error.into());
            }
        }
    }

    Ok(RenderProgress {
        render_state: state,
        threads,
        started: Instant::now(),
    })
}

pub struct RenderProgress {
    render_state: Arc<RenderState>,
    threads: Vec<(usize, JoinHandle<TraceStats>)>,
    started: Instant,
}

impl RenderProgress {
    /// Return number of finished and total tiles.
    pub fn progress(&self) -> Progress {
        Progress {
            finished: self.render_state.finished_tiles.load(Ordering::Acquire),
            total: self.render_state.tile_ordering.len(),
        }
    }

    pub fn progress_percent(&self) -> f32 {
        let progress = self.progress();
        if progress.total == 0 {
            100.0
        } else {
            100.0 * (progress.finished as f32) / (progress.total as f32)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|(_, handle)| handle.is_finished())
    }

    /// Signal the workers to abort.
    /// Any running workers will still finish their tiles, but no new ones will be started.
    pub fn abort(&self) {
        self.render_state.abort();
    }

    /// Block until all workers finish, return their merged counters.
    /// All workers are joined even if some of them panicked, the first panicked one is reported.
    pub fn wait(&mut self) -> Result<TraceStats, RenderError> {
        let mut stats = TraceStats::default();
        let mut panicked = None;
        for (worker_id, handle) in self.threads.drain(..) {
            match handle.join() {
                Ok(worker_stats) => stats = stats.merge(&worker_stats),
                Err(_) => {
                    warn!("worker{worker_id} panicked");
                    panicked.get_or_insert(worker_id);
                }
            }
        }

        if let Some(worker_id) = panicked {
            return Err(RenderError::WorkerPanicked(worker_id));
        }

        info!("Rendered in {:.2?}: {stats}", self.started.elapsed());
        Ok(stats)
    }

    pub fn image(&self) -> &Mutex<RgbImage> {
        &self.render_state.image
    }

    /// Take the output image. Tiles that were not rendered yet stay black.
    pub fn into_image(self) -> RgbImage {
        match Arc::try_unwrap(self.render_state) {
            Ok(state) => state
                .image
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            Err(state) => state
                .image
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

struct RenderState {
    scene: Scene,
    camera: Camera,

    image: Mutex<RgbImage>,

    tile_ordering: Vec<ScreenBlock>,
    next_tile_index: AtomicUsize,
    finished_tiles: AtomicUsize,
}

impl RenderState {
    fn get_next_tile(&self) -> Option<&ScreenBlock> {
        let id = self.next_tile_index.fetch_add(1, Ordering::AcqRel);
        self.tile_ordering.get(id)
    }

    fn abort(&self) {
        self.next_tile_index
            .store(self.tile_ordering.len(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::ScreenSize, renderer::render_image};
    use assert2::{assert, let_assert};
    use std::sync::mpsc;
    use test_case::test_case;

    #[test_case(1 ; "one row per tile")]
    #[test_case(7 ; "uneven tiles")]
    #[test_case(100 ; "single tile")]
    fn tiled_matches_single_batch(tile_rows: u32) {
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(40, 30));
        let_assert!(Ok((expected, expected_stats)) = render_image(&scene, &camera));

        let settings = RenderSettings {
            tile_rows: tile_rows.try_into().unwrap(),
        };
        let_assert!(Ok(mut progress) = render(scene, camera, settings, |_, _| {}));
        let_assert!(Ok(stats) = progress.wait());

        assert!(progress.is_finished());
        assert!(progress.progress_percent() == 100.0);
        assert!(stats.primary_rays == expected_stats.primary_rays);
        assert!(stats.shadow_rays == expected_stats.shadow_rays);
        assert!(progress.into_image() == expected);
    }

    #[test]
    fn callback_sees_every_tile() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(16, 10));
        let settings = RenderSettings {
            tile_rows: 3.try_into().unwrap(),
        };

        let_assert!(
            Ok(mut progress) = render(scene, camera, settings, {
                let calls = Arc::clone(&calls);
                move |tile, progress| {
                    assert!(tile.width == 16);
                    assert!(progress.total == 4);
                    assert!(progress.finished >= 1 && progress.finished <= 4);
                    calls.fetch_add(1, Ordering::Relaxed);
                }
            })
        );
        let_assert!(Ok(_) = progress.wait());

        assert!(calls.load(Ordering::Relaxed) == 4);
        assert!(
            progress.progress()
                == Progress {
                    finished: 4,
                    total: 4
                }
        );
    }

    #[test]
    fn aborted_state_hands_out_no_tiles() {
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(8, 8));
        let state = RenderState {
            scene,
            camera,
            image: Mutex::new(RgbImage::new(8, 8)),
            tile_ordering: ScreenBlock::from_size(camera.get_resolution())
                .tile_ordering(1.try_into().unwrap()),
            next_tile_index: AtomicUsize::new(0),
            finished_tiles: AtomicUsize::new(0),
        };

        assert!(state.get_next_tile().is_some());
        state.abort();
        assert!(state.get_next_tile().is_none());
        assert!(state.get_next_tile().is_none());
    }

    #[test]
    fn abort_stops_handing_out_tiles() {
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(4, 256));
        let settings = RenderSettings {
            tile_rows: 1.try_into().unwrap(),
        };

        // Every worker stalls in the callback after its first tile until the gate opens
        let gate = Arc::new(Mutex::new(()));
        let (tile_done, first_tile) = mpsc::channel();
        let closed_gate = gate.lock().unwrap();

        let_assert!(
            Ok(mut progress) = render(scene, camera, settings, {
                let gate = Arc::clone(&gate);
                move |_, _| {
                    let _ = tile_done.send(());
                    drop(gate.lock());
                }
            })
        );
        let workers = progress.threads.len();

        let_assert!(Ok(()) = first_tile.recv());
        progress.abort();
        drop(closed_gate);
        let_assert!(Ok(_) = progress.wait());

        let p = progress.progress();
        assert!(p.total == 256);
        assert!(p.finished >= 1);
        assert!(p.finished <= workers);
    }

    #[test]
    fn panicked_worker_does_not_leave_others_running() {
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(8, 12));
        let settings = RenderSettings {
            tile_rows: 2.try_into().unwrap(),
        };

        // The last tile is handed out last, all others are claimed by then
        let_assert!(
            Ok(mut progress) = render(scene, camera, settings, |tile, _| {
                if tile.max_y == 12 {
                    panic!("failing on the last tile");
                }
            })
        );

        let_assert!(Err(RenderError::WorkerPanicked(_)) = progress.wait());
        assert!(progress.threads.is_empty());
        assert!(
            progress.progress()
                == Progress {
                    finished: 6,
                    total: 6
                }
        );
    }

    #[test]
    fn empty_image() {
        let scene = Scene::demo();
        let camera = Camera::for_scene(&scene, ScreenSize::new(8, 0));
        let_assert!(
            Err(RenderError::EmptyImage { .. }) =
                render(scene, camera, RenderSettings::default(), |_, _| {})
        );
    }
}
