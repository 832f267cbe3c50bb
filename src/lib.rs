mod camera;
pub mod geometry;
mod renderer;
pub mod scene;
mod screen_block;
pub mod tracer;
mod util;

pub use crate::renderer::{
    Progress, RenderError, RenderProgress, RenderSettings, render, render_image,
};
pub use camera::Camera;
pub use scene::Scene;
pub use screen_block::ScreenBlock;
pub use tracer::{TraceStats, Tracer};
pub use util::{Stats, color_to_image};
