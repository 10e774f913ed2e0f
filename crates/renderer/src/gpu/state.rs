use std::sync::Arc;

use anyhow::Result;
use fogconfig::Rgb;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::context::GpuContext;
use super::pipeline::{FogPipelines, OFFSCREEN_FORMAT};
use crate::surface::FrameTarget;
use crate::types::RenderError;
use crate::uniforms::FogUniforms;

/// Scaled render target the fog pass draws into.
struct Offscreen {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
    size: PhysicalSize<u32>,
}

impl Offscreen {
    fn new(
        device: &wgpu::Device,
        pipelines: &FogPipelines,
        size: PhysicalSize<u32>,
        max_dimension: u32,
    ) -> Self {
        let size = PhysicalSize::new(
            size.width.clamp(1, max_dimension),
            size.height.clamp(1, max_dimension),
        );
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("fog offscreen target"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fog blit bind group"),
            layout: &pipelines.blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
                },
            ],
        });
        Self {
            _texture: texture,
            view,
            blit_bind_group,
            size,
        }
    }
}

/// `wgpu` implementation of [`FrameTarget`] bound to a winit window.
pub struct GpuSurface {
    window: Arc<Window>,
    context: GpuContext,
    pipelines: FogPipelines,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    offscreen: Offscreen,
    background: wgpu::Color,
}

impl GpuSurface {
    /// Acquires a device for `window` and allocates a `backing`-sized fog target.
    pub fn new(window: Arc<Window>, backing: PhysicalSize<u32>, background: Rgb) -> Result<Self> {
        let context = GpuContext::new(Arc::clone(&window))?;
        let pipelines = FogPipelines::new(&context.device, context.surface_format());

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fog uniforms"),
            size: std::mem::size_of::<FogUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fog uniform bind group"),
            layout: &pipelines.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let offscreen = Offscreen::new(
            &context.device,
            &pipelines,
            backing,
            context.max_texture_dimension,
        );
        let [r, g, b] = background.to_array();

        Ok(Self {
            window,
            context,
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            offscreen,
            background: wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: 1.0,
            },
        })
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fog pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.offscreen.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipelines.fog);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fog blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.background),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipelines.blit);
        pass.set_bind_group(0, &self.offscreen.blit_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

impl FrameTarget for GpuSurface {
    fn resize_backing(&mut self, physical: PhysicalSize<u32>) {
        if physical == self.offscreen.size {
            return;
        }
        self.offscreen = Offscreen::new(
            &self.context.device,
            &self.pipelines,
            physical,
            self.context.max_texture_dimension,
        );
        tracing::debug!(
            width = self.offscreen.size.width,
            height = self.offscreen.size.height,
            "resized fog backing buffer"
        );
    }

    fn draw(&mut self, uniforms: &FogUniforms) -> Result<(), RenderError> {
        // The swapchain follows the window; the fog target follows the render scale.
        let window_size = self.window.inner_size();
        if window_size != PhysicalSize::new(self.context.config.width, self.context.config.height) {
            self.context.resize(window_size);
        }

        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated; reconfiguring and skipping frame");
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("timed out acquiring surface texture; skipping frame");
                return Ok(());
            }
            Err(err) => return Err(RenderError::Draw(err.to_string())),
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fog encoder"),
            });
        self.encode(&mut encoder, &view);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
