//! Recording backend shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use fogconfig::RenderConfig;
use winit::dpi::{LogicalSize, PhysicalSize};

use crate::surface::{FrameTarget, RenderSurface};
use crate::types::{HostEnvironment, RenderError};
use crate::uniforms::FogUniforms;

#[derive(Debug, Default)]
pub(crate) struct TargetLog {
    pub draws: Vec<FogUniforms>,
    pub backing: Vec<PhysicalSize<u32>>,
    pub released: bool,
    pub fail_draws: bool,
}

pub(crate) struct RecordingTarget {
    log: Rc<RefCell<TargetLog>>,
}

impl RecordingTarget {
    pub fn new(log: Rc<RefCell<TargetLog>>) -> Self {
        Self { log }
    }
}

impl FrameTarget for RecordingTarget {
    fn resize_backing(&mut self, physical: PhysicalSize<u32>) {
        self.log.borrow_mut().backing.push(physical);
    }

    fn draw(&mut self, uniforms: &FogUniforms) -> Result<(), RenderError> {
        let mut log = self.log.borrow_mut();
        if log.fail_draws {
            return Err(RenderError::Draw("recording target refused the frame".into()));
        }
        log.draws.push(*uniforms);
        Ok(())
    }
}

impl Drop for RecordingTarget {
    fn drop(&mut self) {
        self.log.borrow_mut().released = true;
    }
}

pub(crate) fn environment(reduced_motion: bool, device_pixel_ratio: f64) -> HostEnvironment {
    HostEnvironment {
        reduced_motion,
        device_pixel_ratio,
        viewport: LogicalSize::new(1280, 720),
    }
}

pub(crate) fn recording_surface(
    config: &RenderConfig,
    env: &HostEnvironment,
) -> (RenderSurface<RecordingTarget>, Rc<RefCell<TargetLog>>) {
    let log = Rc::new(RefCell::new(TargetLog::default()));
    let target_log = Rc::clone(&log);
    let surface = RenderSurface::create(config, env, move |backing| {
        target_log.borrow_mut().backing.push(backing);
        Ok(RecordingTarget { log: target_log })
    })
    .expect("recording surface");
    (surface, log)
}
