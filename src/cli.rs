use std::{num::NonZeroU32, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;
use log::{LevelFilter, info};
use whitted::{
    Camera, RenderSettings, Scene, geometry::ScreenSize, render, render_image,
    scene::ROTATION_STEP,
};

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Renders the demo scene of three spheres, a triangle and a checkered floor.
#[derive(Parser)]
#[command(name = "whitted-cli")]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Image rows traced together by one worker
    #[arg(long, default_value = "16")]
    tile_rows: NonZeroU32,

    /// Rotate the scene about the vertical axis by this many steps of pi/10
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    rotate_steps: i32,

    /// Trace the whole image as one batch on the current thread
    #[arg(long)]
    single_batch: bool,

    /// Output PNG file
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level.clone().into())
        .parse_default_env()
        .init();

    let mut scene = Scene::demo();
    scene.rotate_steps(args.rotate_steps);
    info!(
        "Scene rotated by {:.3} rad",
        args.rotate_steps as f64 * ROTATION_STEP
    );

    let camera = Camera::for_scene(&scene, ScreenSize::new(args.width, args.height));

    let (image, stats) = if args.single_batch {
        render_image(&scene, &camera)?
    } else {
        let settings = RenderSettings {
            tile_rows: args.tile_rows,
        };

        let bar = ProgressBar::no_length();
        let mut render_progress = render(scene, camera, settings, {
            let bar = bar.clone();
            move |_, progress| {
                bar.update(|ps| {
                    ps.set_len(progress.total as u64);
                    ps.set_pos(progress.finished as u64)
                })
            }
        })?;
        bar.set_length(render_progress.progress().total as u64);

        let stats = render_progress.wait()?;
        bar.finish();
        (render_progress.into_image(), stats)
    };

    info!("{stats}");

    image
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    info!("Saved {}", args.output.display());

    Ok(())
}
