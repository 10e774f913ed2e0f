use bytemuck::{Pod, Zeroable};
use fogconfig::RenderConfig;
use winit::dpi::LogicalSize;

use crate::types::PointerState;

/// CPU mirror of the `FogParams` uniform block.
///
/// Field order and padding follow std140; the layout must match the block
/// declared in `compile.rs`. Each `vec3` shares its 16-byte slot with the scalar after it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FogUniforms {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub time: f32,
    pub density: f32,
    pub speed: f32,
    pub warp: f32,
    pub tint: [f32; 3],
    pub pointer_strength: f32,
    pub background: [f32; 3],
    pub pointer_radius: f32,
    pub fade: f32,
    pub padding: [f32; 3],
}

impl FogUniforms {
    /// Seeds the block from the mount-time configuration.
    ///
    /// With reduced motion the animated terms (`speed`, pointer strength) are
    /// zeroed here; `config` itself is left untouched.
    pub fn new(config: &RenderConfig, viewport: LogicalSize<u32>, reduced_motion: bool) -> Self {
        let pointer = PointerState::default();
        Self {
            resolution: [viewport.width as f32, viewport.height as f32],
            pointer: [pointer.x, pointer.y],
            time: 0.0,
            density: config.density,
            speed: if reduced_motion { 0.0 } else { config.speed },
            warp: config.warp,
            tint: config.tint.to_array(),
            pointer_strength: if reduced_motion {
                0.0
            } else {
                config.pointer_strength
            },
            background: config.background.to_array(),
            pointer_radius: config.pointer_radius,
            fade: 1.0,
            padding: [0.0; 3],
        }
    }

    pub fn set_resolution(&mut self, viewport: LogicalSize<u32>) {
        self.resolution = [viewport.width as f32, viewport.height as f32];
    }

    pub fn set_frame(&mut self, time: f32, pointer: PointerState, fade: f32) {
        self.time = time;
        self.pointer = [pointer.x, pointer.y];
        self.fade = fade.clamp(0.0, 1.0);
    }
}
