//! Input/Lifecycle Bridge.
//!
//! [`FogBackground`] is what a host mounts. While mounted it owns the surface,
//! the driver and the pointer; host events are routed to them through
//! [`FogBackground::handle_event`]. Unmounting takes the whole bundle out of
//! the bridge at once, so nothing can reach the driver or surface afterwards.

use fogconfig::RenderConfig;
use scheduler::{TickHandle, TickScheduler, TickSource};
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};

use crate::driver::{AnimationDriver, DriverState};
use crate::surface::{FrameTarget, RenderSurface};
use crate::types::{HostEnvironment, PointerState, RenderError};

/// Signals a host forwards to a mounted fog background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer position in client coordinates (Y down, logical pixels).
    PointerMoved(LogicalPosition<f64>),
    /// New logical viewport size.
    Resized(LogicalSize<u32>),
    /// Page visibility changed.
    VisibilityChanged { visible: bool },
}

struct Mounted<T: FrameTarget, S: TickScheduler> {
    surface: RenderSurface<T>,
    driver: AnimationDriver<S>,
    pointer: PointerState,
    reduced_motion: bool,
}

pub struct FogBackground<T: FrameTarget, S: TickScheduler> {
    mounted: Option<Mounted<T, S>>,
}

impl<T: FrameTarget, S: TickScheduler> FogBackground<T, S> {
    /// Creates the surface, starts the driver and starts accepting host events.
    pub fn mount<F>(
        config: &RenderConfig,
        env: &HostEnvironment,
        scheduler: S,
        build: F,
        now_ms: f64,
    ) -> Result<Self, RenderError>
    where
        F: FnOnce(PhysicalSize<u32>) -> anyhow::Result<T>,
    {
        let mut surface = RenderSurface::create(config, env, build)?;
        let driver = AnimationDriver::start(scheduler, &mut surface, env.reduced_motion, now_ms)?;
        tracing::debug!(reduced_motion = env.reduced_motion, "fog background mounted");
        Ok(Self {
            mounted: Some(Mounted {
                surface,
                driver,
                pointer: PointerState::default(),
                reduced_motion: env.reduced_motion,
            }),
        })
    }

    /// Routes one host event. Events after unmount are dropped.
    pub fn handle_event(&mut self, event: HostEvent, now_ms: f64) {
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        match event {
            HostEvent::PointerMoved(position) => {
                if !mounted.reduced_motion {
                    mounted.pointer = PointerState::from_client(position, mounted.surface.viewport());
                }
            }
            HostEvent::Resized(size) => mounted.surface.resize(size.width, size.height),
            HostEvent::VisibilityChanged { visible: false } => mounted.driver.suspend(),
            HostEvent::VisibilityChanged { visible: true } => mounted.driver.resume(now_ms),
        }
    }

    /// Delivers one tick to the driver with the latest pointer.
    pub fn on_tick(&mut self, handle: TickHandle, now_ms: f64) -> Result<bool, RenderError> {
        let Some(mounted) = self.mounted.as_mut() else {
            return Ok(false);
        };
        mounted
            .driver
            .tick(handle, now_ms, &mut mounted.surface, mounted.pointer)
    }

    /// Re-presents the still frame of a reduced-motion mount, e.g. after the
    /// host resized or exposed it. Returns `Ok(false)` when the driver animates
    /// on its own or nothing is mounted.
    pub fn refresh(&mut self) -> Result<bool, RenderError> {
        let Some(mounted) = self.mounted.as_mut() else {
            return Ok(false);
        };
        if mounted.driver.state() != DriverState::SingleShot {
            return Ok(false);
        }
        mounted.surface.redraw()?;
        Ok(true)
    }

    /// Stops event delivery, then disposes the driver and the surface in that order.
    pub fn unmount(&mut self) {
        let Some(mut mounted) = self.mounted.take() else {
            return;
        };
        mounted.driver.dispose();
        mounted.surface.dispose();
        tracing::debug!("fog background unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn pointer(&self) -> Option<PointerState> {
        self.mounted.as_ref().map(|mounted| mounted.pointer)
    }

    pub fn surface(&self) -> Option<&RenderSurface<T>> {
        self.mounted.as_ref().map(|mounted| &mounted.surface)
    }

    pub fn driver(&self) -> Option<&AnimationDriver<S>> {
        self.mounted.as_ref().map(|mounted| &mounted.driver)
    }
}

impl<T: FrameTarget, S: TickScheduler + TickSource> FogBackground<T, S> {
    /// Delivers every due tick; returns the number of frames rendered.
    pub fn pump(&mut self, now_ms: f64) -> Result<usize, RenderError> {
        let Some(mounted) = self.mounted.as_mut() else {
            return Ok(0);
        };
        let mut rendered = 0;
        for handle in mounted.driver.scheduler_mut().drain_due() {
            if mounted
                .driver
                .tick(handle, now_ms, &mut mounted.surface, mounted.pointer)?
            {
                rendered += 1;
            }
        }
        Ok(rendered)
    }

    /// True while a tick is waiting to be pumped.
    pub fn wants_frame(&self) -> bool {
        self.mounted
            .as_ref()
            .is_some_and(|mounted| mounted.driver.scheduler().has_pending())
    }
}

impl<T: FrameTarget, S: TickScheduler> Drop for FogBackground<T, S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use scheduler::FrameQueue;

    use super::*;
    use crate::testing::{environment, RecordingTarget, TargetLog};
    use crate::uniforms::FogUniforms;

    type Order = Rc<RefCell<Vec<&'static str>>>;

    struct OrderedTarget {
        inner: RecordingTarget,
        order: Order,
    }

    impl FrameTarget for OrderedTarget {
        fn resize_backing(&mut self, physical: PhysicalSize<u32>) {
            self.inner.resize_backing(physical);
        }

        fn draw(&mut self, uniforms: &FogUniforms) -> Result<(), RenderError> {
            self.inner.draw(uniforms)
        }
    }

    impl Drop for OrderedTarget {
        fn drop(&mut self) {
            self.order.borrow_mut().push("surface");
        }
    }

    struct OrderedQueue {
        inner: FrameQueue,
        order: Order,
    }

    impl TickScheduler for OrderedQueue {
        fn schedule_tick(&mut self) -> TickHandle {
            self.inner.schedule_tick()
        }

        fn cancel_tick(&mut self, handle: TickHandle) {
            self.order.borrow_mut().push("driver");
            self.inner.cancel_tick(handle);
        }
    }

    impl TickSource for OrderedQueue {
        fn has_pending(&self) -> bool {
            self.inner.has_pending()
        }

        fn drain_due(&mut self) -> Vec<TickHandle> {
            self.inner.drain_due()
        }
    }

    fn mount(reduced_motion: bool) -> (FogBackground<RecordingTarget, FrameQueue>, Rc<RefCell<TargetLog>>) {
        let log = Rc::new(RefCell::new(TargetLog::default()));
        let target_log = Rc::clone(&log);
        let background = FogBackground::mount(
            &RenderConfig::default(),
            &environment(reduced_motion, 1.0),
            FrameQueue::new(),
            move |_| Ok(RecordingTarget::new(target_log)),
            0.0,
        )
        .expect("mount");
        (background, log)
    }

    #[test]
    fn pointer_moves_apply_on_next_tick() {
        let (mut background, log) = mount(false);
        background.handle_event(HostEvent::PointerMoved(LogicalPosition::new(320.0, 180.0)), 5.0);
        assert!(log.borrow().draws.is_empty());
        assert_eq!(background.pointer(), Some(PointerState { x: 0.25, y: 0.75 }));

        assert_eq!(background.pump(16.0).expect("pump"), 1);
        assert_eq!(log.borrow().draws[0].pointer, [0.25, 0.75]);
    }

    #[test]
    fn reduced_motion_ignores_pointer() {
        let (mut background, log) = mount(true);
        background.handle_event(HostEvent::PointerMoved(LogicalPosition::new(0.0, 0.0)), 5.0);
        assert_eq!(background.pointer(), Some(PointerState::default()));
        assert!(!background.wants_frame());
        assert_eq!(background.pump(16.0).expect("pump"), 0);
        assert_eq!(log.borrow().draws.len(), 1);
    }

    #[test]
    fn still_frame_is_represented_after_resize() {
        let (mut background, log) = mount(true);
        background.handle_event(HostEvent::Resized(LogicalSize::new(800, 450)), 40.0);
        assert!(background.refresh().expect("refresh"));

        let log = log.borrow();
        assert_eq!(log.draws.len(), 2);
        assert_eq!(log.draws[1].resolution, [800.0, 450.0]);
        assert_eq!(log.draws[1].time, 0.0);
        assert_eq!(log.draws[1].fade, 1.0);
    }

    #[test]
    fn refresh_leaves_animated_mounts_to_the_driver() {
        let (mut background, log) = mount(false);
        assert!(!background.refresh().expect("refresh"));
        assert!(log.borrow().draws.is_empty());

        background.unmount();
        assert!(!background.refresh().expect("refresh"));
    }

    #[test]
    fn resize_reaches_surface_synchronously() {
        let (mut background, log) = mount(false);
        background.handle_event(HostEvent::Resized(LogicalSize::new(640, 360)), 1.0);
        let surface = background.surface().expect("mounted");
        assert_eq!(surface.uniforms().resolution, [640.0, 360.0]);
        assert_eq!(log.borrow().backing.last(), Some(&PhysicalSize::new(640, 360)));
    }

    #[test]
    fn visibility_drives_suspend_and_resume() {
        let (mut background, log) = mount(false);
        background.pump(16.0).expect("pump");

        background.handle_event(HostEvent::VisibilityChanged { visible: false }, 20.0);
        assert!(!background.wants_frame());
        assert_eq!(background.pump(32.0).expect("pump"), 0);
        assert_eq!(background.driver().map(|d| d.state()), Some(DriverState::Suspended));

        background.handle_event(HostEvent::VisibilityChanged { visible: true }, 3_000.0);
        assert!(background.wants_frame());
        assert_eq!(background.pump(3_016.0).expect("pump"), 1);
        let time = log.borrow().draws.last().expect("draw").time;
        assert!((time - 3.016).abs() < 1e-4);
    }

    #[test]
    fn unmount_disposes_driver_then_surface() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::new(RefCell::new(TargetLog::default()));
        let target = OrderedTarget {
            inner: RecordingTarget::new(Rc::clone(&log)),
            order: Rc::clone(&order),
        };
        let queue = OrderedQueue {
            inner: FrameQueue::new(),
            order: Rc::clone(&order),
        };
        let mut background = FogBackground::mount(
            &RenderConfig::default(),
            &environment(false, 1.0),
            queue,
            move |_| Ok(target),
            0.0,
        )
        .expect("mount");
        background.pump(16.0).expect("pump");
        assert_eq!(
            background.driver().map(|d| d.state()),
            Some(DriverState::Running)
        );

        background.unmount();
        assert!(!background.is_mounted());
        assert_eq!(*order.borrow(), vec!["driver", "surface"]);
        assert!(log.borrow().released);

        background.unmount();
        background.handle_event(HostEvent::Resized(LogicalSize::new(10, 10)), 20.0);
        background.handle_event(HostEvent::VisibilityChanged { visible: true }, 20.0);
        assert_eq!(background.pump(32.0).expect("pump"), 0);
        assert_eq!(log.borrow().draws.len(), 1);
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn mount_failure_reports_context_error() {
        let result = FogBackground::<RecordingTarget, FrameQueue>::mount(
            &RenderConfig::default(),
            &environment(false, 1.0),
            FrameQueue::new(),
            |_| Err(anyhow::anyhow!("adapter request failed")),
            0.0,
        );
        assert!(matches!(result, Err(RenderError::ContextCreation(_))));
    }

    #[test]
    fn dropping_unmounts() {
        let (background, log) = mount(false);
        drop(background);
        assert!(log.borrow().released);
    }
}
