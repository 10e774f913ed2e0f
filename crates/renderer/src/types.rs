use std::path::PathBuf;

use fogconfig::{ConfigError, RenderConfig};
use winit::dpi::{LogicalPosition, LogicalSize};

/// Upper bound of the render-resolution scale (and of the initial DPR).
pub const MAX_PIXEL_RATIO_SCALE: f64 = 1.5;
/// Floor the adaptive-quality loop never degrades below.
pub const MIN_PIXEL_RATIO_SCALE: f64 = 0.75;

/// Clamps a device pixel ratio into the supported render-scale range.
pub fn clamp_pixel_ratio_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MIN_PIXEL_RATIO_SCALE;
    }
    scale.clamp(MIN_PIXEL_RATIO_SCALE, MAX_PIXEL_RATIO_SCALE)
}

/// Errors raised while mounting or drawing the fog surface.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No graphics context could be obtained; the caller should show a static background.
    #[error("graphics context unavailable: {0:#}")]
    ContextCreation(anyhow::Error),
    #[error("draw failed: {0}")]
    Draw(String),
}

/// Pointer position in shader space: `[0, 1]²`, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl PointerState {
    /// Converts a client-space position (Y down) into shader space (Y up).
    pub fn from_client(position: LogicalPosition<f64>, viewport: LogicalSize<u32>) -> Self {
        let width = f64::from(viewport.width.max(1));
        let height = f64::from(viewport.height.max(1));
        let x = (position.x / width).clamp(0.0, 1.0);
        let y = (1.0 - position.y / height).clamp(0.0, 1.0);
        Self {
            x: x as f32,
            y: y as f32,
        }
    }
}

/// Host signals sampled once at mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostEnvironment {
    /// System-wide reduced-motion preference.
    pub reduced_motion: bool,
    /// Native physical-to-logical pixel ratio.
    pub device_pixel_ratio: f64,
    /// Logical viewport size.
    pub viewport: LogicalSize<u32>,
}

impl HostEnvironment {
    pub fn initial_pixel_ratio_scale(&self) -> f64 {
        clamp_pixel_ratio_scale(self.device_pixel_ratio.min(MAX_PIXEL_RATIO_SCALE))
    }
}

/// Still-frame export request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTarget {
    pub path: PathBuf,
    /// Output size in pixels.
    pub size: (u32, u32),
    /// Shader time in seconds.
    pub time: f32,
    pub pointer: PointerState,
}

/// How the renderer should present frames.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    /// Interactive preview window driven by `winit`.
    Windowed,
    /// Evaluate a single frame on the CPU and write it to disk.
    Export(ExportTarget),
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Fog palette the surface is mounted with.
    pub fog: RenderConfig,
    /// Preview window size in logical pixels.
    pub window_size: (u32, u32),
    /// Overrides the host's reduced-motion preference.
    pub reduced_motion: bool,
    pub mode: RenderMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fog: RenderConfig::default(),
            window_size: (1280, 720),
            reduced_motion: false,
            mode: RenderMode::Windowed,
        }
    }
}
