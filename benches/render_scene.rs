use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use whitted::{Camera, RenderSettings, Scene, geometry::ScreenSize, render, render_image};

fn criterion_benchmark(c: &mut Criterion) {
    let scene = Scene::demo();
    let camera = Camera::for_scene(&scene, ScreenSize::new(320, 240));
    let settings = RenderSettings {
        tile_rows: 16.try_into().unwrap(),
    };

    c.bench_function("render_scene_single_batch", |b| {
        b.iter(|| render_image(&scene, &camera).unwrap())
    });

    c.bench_function("render_scene_tiled", |b| {
        b.iter_batched(
            || scene.clone(),
            |scene| {
                let mut render_progress = render(scene, camera, settings, |_, _| {}).unwrap();
                render_progress.wait().unwrap();
                render_progress.into_image()
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(20));
    targets = criterion_benchmark
}
criterion_main!(benches);
