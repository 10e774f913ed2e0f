//! `wgpu` backend for the fog surface.
//!
//! - `context` owns the instance, device and swapchain for one window and
//!   reconfigures it on resize or loss.
//! - `pipeline` builds the fog pass (GLSL kernel into a scaled offscreen
//!   target) and the blit pass that stretches it onto the swapchain.
//! - `state` ties both into [`GpuSurface`], the [`crate::FrameTarget`] the
//!   preview window mounts.

mod context;
mod pipeline;
mod state;

pub use state::GpuSurface;
