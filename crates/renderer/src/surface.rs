//! Render Surface Manager.
//!
//! [`RenderSurface`] owns one drawing backend plus the uniform snapshot fed to
//! the fog kernel. The backend sits behind [`FrameTarget`] so the manager's
//! bookkeeping (viewport, render scale, disposal) is identical under `wgpu`
//! and under the recording target the tests use.

use fogconfig::RenderConfig;
use winit::dpi::{LogicalSize, PhysicalSize};

use crate::types::{clamp_pixel_ratio_scale, HostEnvironment, PointerState, RenderError};
use crate::uniforms::FogUniforms;

/// Drawing backend owned by a [`RenderSurface`].
///
/// Resources are released when the target is dropped.
pub trait FrameTarget {
    /// Reallocates the backing buffer. Never called with a zero dimension.
    fn resize_backing(&mut self, physical: PhysicalSize<u32>);

    /// Uploads `uniforms` and issues one full-screen draw.
    fn draw(&mut self, uniforms: &FogUniforms) -> Result<(), RenderError>;
}

/// Physical backing size for a logical viewport at the given render scale.
pub fn backing_size(viewport: LogicalSize<u32>, scale: f64) -> PhysicalSize<u32> {
    let scaled = |extent: u32| ((f64::from(extent) * scale).round() as u32).max(1);
    PhysicalSize::new(scaled(viewport.width), scaled(viewport.height))
}

pub struct RenderSurface<T: FrameTarget> {
    target: Option<T>,
    uniforms: FogUniforms,
    viewport: LogicalSize<u32>,
    pixel_ratio_scale: f64,
    draw_count: u64,
}

impl<T: FrameTarget> RenderSurface<T> {
    /// Validates `config`, then asks `build` for a backend sized to the
    /// initial backing buffer.
    ///
    /// A failing builder surfaces as [`RenderError::ContextCreation`]; the
    /// caller is expected to fall back to a static background.
    pub fn create<F>(config: &RenderConfig, env: &HostEnvironment, build: F) -> Result<Self, RenderError>
    where
        F: FnOnce(PhysicalSize<u32>) -> anyhow::Result<T>,
    {
        config.validate()?;

        let pixel_ratio_scale = env.initial_pixel_ratio_scale();
        let backing = backing_size(env.viewport, pixel_ratio_scale);
        let target = build(backing).map_err(RenderError::ContextCreation)?;

        tracing::debug!(
            width = env.viewport.width,
            height = env.viewport.height,
            scale = pixel_ratio_scale,
            backing_width = backing.width,
            backing_height = backing.height,
            "created render surface"
        );

        Ok(Self {
            target: Some(target),
            uniforms: FogUniforms::new(config, env.viewport, env.reduced_motion),
            viewport: env.viewport,
            pixel_ratio_scale,
            draw_count: 0,
        })
    }

    /// Updates the logical viewport and the resolution uniform.
    pub fn resize(&mut self, width: u32, height: u32) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        let viewport = LogicalSize::new(width, height);
        self.uniforms.set_resolution(viewport);
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        target.resize_backing(backing_size(viewport, self.pixel_ratio_scale));
    }

    /// Rescales the backing buffer; the logical viewport is unchanged.
    pub fn set_pixel_ratio_scale(&mut self, scale: f64) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        let scale = clamp_pixel_ratio_scale(scale);
        if scale == self.pixel_ratio_scale {
            return;
        }
        self.pixel_ratio_scale = scale;
        target.resize_backing(backing_size(self.viewport, scale));
    }

    /// Pushes the per-frame uniforms and draws once. A no-op after disposal.
    pub fn render_once(&mut self, time: f32, pointer: PointerState, fade: f32) -> Result<(), RenderError> {
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };
        self.uniforms.set_frame(time, pointer, fade);
        target.draw(&self.uniforms)?;
        self.draw_count += 1;
        Ok(())
    }

    /// Draws the current uniforms again without advancing the frame.
    pub fn redraw(&mut self) -> Result<(), RenderError> {
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };
        target.draw(&self.uniforms)?;
        self.draw_count += 1;
        Ok(())
    }

    /// Releases the backend. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(target) = self.target.take() {
            drop(target);
            tracing::info!(draws = self.draw_count, "render surface disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.target.is_none()
    }

    pub fn uniforms(&self) -> &FogUniforms {
        &self.uniforms
    }

    pub fn viewport(&self) -> LogicalSize<u32> {
        self.viewport
    }

    pub fn pixel_ratio_scale(&self) -> f64 {
        self.pixel_ratio_scale
    }

    pub fn backing_size(&self) -> PhysicalSize<u32> {
        backing_size(self.viewport, self.pixel_ratio_scale)
    }

    /// Number of successful draws since creation.
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }
}

impl<T: FrameTarget> Drop for RenderSurface<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
