use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use scheduler::FrameQueue;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::bridge::{FogBackground, HostEvent};
use crate::gpu::GpuSurface;
use crate::runtime::SystemClock;
use crate::types::{HostEnvironment, RenderError, RendererConfig};

/// Opens the preview window and plays the page's role until it is closed.
///
/// Cursor motion, resizes and occlusion are forwarded as host events; closing
/// the window unmounts the fog. A reduced-motion still is re-presented on
/// every redraw the system asks for. A draw failure unmounts and is returned.
pub(crate) fn run_preview(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.window_size;
    let window = WindowBuilder::new()
        .with_title("herofog")
        .with_inner_size(LogicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let scale_factor = window.scale_factor();
    let env = HostEnvironment {
        reduced_motion: config.reduced_motion,
        device_pixel_ratio: scale_factor,
        viewport: window.inner_size().to_logical(scale_factor),
    };
    tracing::info!(
        width = env.viewport.width,
        height = env.viewport.height,
        device_pixel_ratio = scale_factor,
        reduced_motion = env.reduced_motion,
        "opening fog preview"
    );

    let clock = SystemClock::new();
    let gpu_window = Arc::clone(&window);
    let background = config.fog.background;
    let mut fog = FogBackground::mount(
        &config.fog,
        &env,
        FrameQueue::new(),
        move |backing| GpuSurface::new(gpu_window, backing, background),
        clock.now_ms(),
    )
    .context("failed to mount fog background")?;

    let mut failure: Option<RenderError> = None;
    let failure_slot = &mut failure;
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    fog.unmount();
                    elwt.exit();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let position = position.to_logical(window.scale_factor());
                    fog.handle_event(HostEvent::PointerMoved(position), clock.now_ms());
                }
                WindowEvent::Resized(size) => {
                    let size = size.to_logical(window.scale_factor());
                    fog.handle_event(HostEvent::Resized(size), clock.now_ms());
                    if !fog.wants_frame() {
                        window.request_redraw();
                    }
                }
                WindowEvent::Occluded(occluded) => {
                    fog.handle_event(
                        HostEvent::VisibilityChanged { visible: !occluded },
                        clock.now_ms(),
                    );
                }
                WindowEvent::RedrawRequested => {
                    let drawn = fog
                        .pump(clock.now_ms())
                        .and_then(|rendered| match rendered {
                            0 => fog.refresh().map(|_| ()),
                            _ => Ok(()),
                        });
                    if let Err(err) = drawn {
                        tracing::error!(error = %err, "fog render failed; closing preview");
                        *failure_slot = Some(err);
                        fog.unmount();
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if fog.wants_frame() {
                    window.request_redraw();
                }
                elwt.set_control_flow(ControlFlow::Wait);
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))?;

    match failure {
        Some(err) => Err(err).context("fog preview stopped"),
        None => Ok(()),
    }
}
