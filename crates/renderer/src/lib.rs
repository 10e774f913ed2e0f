//! Animated fog background renderer.
//!
//! The crate renders a procedural, pointer-reactive fog layer behind a hero
//! section and keeps it cheap enough to run everywhere. Data flows one way
//! per frame:
//!
//! ```text
//!   host events ──▶ FogBackground (bridge) ──▶ RenderSurface uniforms ──▶ fog kernel ──▶ pixels
//!                           │                          ▲
//!                           └─ visibility ─▶ AnimationDriver ── tick ──┘
//!                                                  │
//!                                          TickScheduler (next tick)
//! ```
//!
//! - [`kernel`] is the CPU reference of the GLSL fog kernel in `compile`.
//! - [`RenderSurface`] owns a [`FrameTarget`] backend (the `wgpu`
//!   [`GpuSurface`] in the preview window) plus the uniform snapshot.
//! - [`AnimationDriver`] advances time, keeps the rolling frame rate and steps
//!   the render scale down when frames run long.
//! - [`FogBackground`] routes pointer, resize and visibility events and owns
//!   teardown.
//!
//! [`Renderer`] is the entry point the CLI uses: it either opens the winit
//! preview or writes a still PNG.

mod bridge;
mod compile;
mod driver;
mod export;
mod gpu;
pub mod kernel;
mod runtime;
mod surface;
#[cfg(test)]
mod testing;
mod timeline;
mod types;
mod uniforms;
mod window;

use anyhow::Result;

pub use bridge::{FogBackground, HostEvent};
pub use driver::{
    AnimationDriver, DriverState, FrameState, FRAME_HISTORY_CAPACITY, LOW_FPS_WINDOW_MS,
    PIXEL_RATIO_STEP, TARGET_FPS,
};
pub use export::{export_png, render_still};
pub use gpu::GpuSurface;
pub use runtime::SystemClock;
pub use surface::{backing_size, FrameTarget, RenderSurface};
pub use timeline::{ease_out_quad, FadeEnvelope, FOG_FADE_IN_MS};
pub use types::{
    clamp_pixel_ratio_scale, ExportTarget, HostEnvironment, PointerState, RenderError, RenderMode,
    RendererConfig, MAX_PIXEL_RATIO_SCALE, MIN_PIXEL_RATIO_SCALE,
};
pub use uniforms::FogUniforms;

/// Entry point that runs one [`RendererConfig`] to completion.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Blocks until the preview window closes or the still is written.
    pub fn run(self) -> Result<()> {
        match &self.config.mode {
            RenderMode::Windowed => window::run_preview(&self.config),
            RenderMode::Export(target) => export::export_png(&self.config.fog, target),
        }
    }
}
