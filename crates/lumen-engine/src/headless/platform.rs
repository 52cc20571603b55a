use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::coords::{MonitorBounds, WindowGeometry};
use crate::device::{GpuInit, GraphicsDevice};
use crate::error::PlatformError;
use crate::window::{Platform, PlatformEvent};

use super::HeadlessDevice;

#[derive(Debug, Clone)]
struct HeadlessWindow {
    title: String,
    geometry: WindowGeometry,
    decorated: bool,
    resizable: bool,
}

struct Shared {
    monitor: MonitorBounds,
    script: VecDeque<Vec<PlatformEvent>>,
    pending: Vec<PlatformEvent>,
    frame_limit: Option<u64>,
    polls: u64,

    fail_initialization: Option<String>,
    fail_window_creation: Option<String>,
    fail_graphics_context: Option<String>,

    initialized: bool,
    terminated: bool,
    window: Option<HeadlessWindow>,
    windows_created: u32,
    windows_destroyed: u32,
    devices_created: u32,
    should_close: bool,
    swaps: u64,
}

/// Scripted [`Platform`] for tests and CI.
///
/// Each call to `poll_events` returns the next scripted batch of events. The
/// close flag is raised by the poll that reaches the frame limit, so that
/// frame still runs. Without an explicit limit the run lasts as many frames as
/// there are scripted batches, and at least one.
///
/// Window size changes made through the platform are reported back as a
/// framebuffer resize on the next poll, as a real window system would.
pub struct HeadlessPlatform {
    shared: Rc<RefCell<Shared>>,
    device: Rc<HeadlessDevice>,
}

/// Read-only view of a [`HeadlessPlatform`] that stays valid after the
/// platform has been moved into the lifecycle.
#[derive(Clone)]
pub struct HeadlessProbe {
    shared: Rc<RefCell<Shared>>,
    device: Rc<HeadlessDevice>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// 1920x1080 monitor at the origin, no scripted events.
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                monitor: MonitorBounds::new(1920, 1080, 0, 0),
                script: VecDeque::new(),
                pending: Vec::new(),
                frame_limit: None,
                polls: 0,
                fail_initialization: None,
                fail_window_creation: None,
                fail_graphics_context: None,
                initialized: false,
                terminated: false,
                window: None,
                windows_created: 0,
                windows_destroyed: 0,
                devices_created: 0,
                should_close: false,
                swaps: 0,
            })),
            device: Rc::new(HeadlessDevice::new()),
        }
    }

    pub fn with_monitor(self, monitor: MonitorBounds) -> Self {
        self.shared.borrow_mut().monitor = monitor;
        self
    }

    /// Appends one poll's worth of events.
    pub fn with_poll(self, events: impl IntoIterator<Item = PlatformEvent>) -> Self {
        self.shared
            .borrow_mut()
            .script
            .push_back(events.into_iter().collect());
        self
    }

    /// Raises the close flag on the `frames`-th poll.
    pub fn with_frame_limit(self, frames: u64) -> Self {
        self.shared.borrow_mut().frame_limit = Some(frames.max(1));
        self
    }

    pub fn fail_initialization(self, reason: impl Into<String>) -> Self {
        self.shared.borrow_mut().fail_initialization = Some(reason.into());
        self
    }

    pub fn fail_window_creation(self, reason: impl Into<String>) -> Self {
        self.shared.borrow_mut().fail_window_creation = Some(reason.into());
        self
    }

    pub fn fail_graphics_context(self, reason: impl Into<String>) -> Self {
        self.shared.borrow_mut().fail_graphics_context = Some(reason.into());
        self
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            shared: Rc::clone(&self.shared),
            device: Rc::clone(&self.device),
        }
    }

    pub fn device(&self) -> Rc<HeadlessDevice> {
        Rc::clone(&self.device)
    }
}

impl Platform for HeadlessPlatform {
    fn initialize(&mut self) -> Result<(), PlatformError> {
        let mut s = self.shared.borrow_mut();
        if let Some(reason) = s.fail_initialization.clone() {
            return Err(PlatformError::Initialization(reason));
        }
        s.initialized = true;
        s.terminated = false;
        Ok(())
    }

    fn primary_monitor(&mut self) -> Result<MonitorBounds, PlatformError> {
        let s = self.shared.borrow();
        if !s.initialized {
            return Err(PlatformError::Initialization("platform not initialized".into()));
        }
        Ok(s.monitor)
    }

    fn create_window(&mut self, width: u32, height: u32, title: &str) -> Result<(), PlatformError> {
        let mut s = self.shared.borrow_mut();
        if let Some(reason) = s.fail_window_creation.clone() {
            return Err(PlatformError::WindowCreation(reason));
        }
        if s.window.is_some() {
            return Err(PlatformError::WindowCreation("a window already exists".into()));
        }

        s.window = Some(HeadlessWindow {
            title: title.to_string(),
            geometry: WindowGeometry {
                x: 0,
                y: 0,
                width,
                height,
            },
            decorated: true,
            resizable: true,
        });
        s.windows_created += 1;
        s.should_close = false;
        Ok(())
    }

    fn destroy_window(&mut self) {
        let mut s = self.shared.borrow_mut();
        if s.window.take().is_some() {
            s.windows_destroyed += 1;
        }
        s.pending.clear();
    }

    fn has_window(&self) -> bool {
        self.shared.borrow().window.is_some()
    }

    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        let mut s = self.shared.borrow_mut();
        s.polls += 1;

        let mut events = std::mem::take(&mut s.pending);
        if let Some(batch) = s.script.pop_front() {
            events.extend(batch);
        }

        for event in &events {
            if let PlatformEvent::FramebufferResized { width, height } = *event {
                if width > 0 && height > 0 {
                    if let Some(window) = s.window.as_mut() {
                        window.geometry.width = width as u32;
                        window.geometry.height = height as u32;
                    }
                }
            }
        }

        let limit = s.frame_limit.unwrap_or_else(|| (s.script.len() as u64 + s.polls).max(1));
        if s.polls >= limit {
            s.should_close = true;
        }

        events
    }

    fn swap_buffers(&mut self) {
        self.shared.borrow_mut().swaps += 1;
    }

    fn should_close(&self) -> bool {
        self.shared.borrow().should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.shared.borrow_mut().should_close = value;
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.shared
            .borrow()
            .window
            .as_ref()
            .map_or((0, 0), |w| (w.geometry.width, w.geometry.height))
    }

    fn window_geometry(&self) -> Option<WindowGeometry> {
        self.shared.borrow().window.as_ref().map(|w| w.geometry)
    }

    fn set_decorated(&mut self, decorated: bool) {
        if let Some(w) = self.shared.borrow_mut().window.as_mut() {
            w.decorated = decorated;
        }
    }

    fn set_resizable(&mut self, resizable: bool) {
        if let Some(w) = self.shared.borrow_mut().window.as_mut() {
            w.resizable = resizable;
        }
    }

    fn set_window_position(&mut self, x: i32, y: i32) {
        if let Some(w) = self.shared.borrow_mut().window.as_mut() {
            w.geometry.x = x;
            w.geometry.y = y;
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        let mut s = self.shared.borrow_mut();
        let Some(w) = s.window.as_mut() else {
            return;
        };

        if (w.geometry.width, w.geometry.height) != (width, height) {
            w.geometry.width = width;
            w.geometry.height = height;
            s.pending.push(PlatformEvent::FramebufferResized {
                width: width as i32,
                height: height as i32,
            });
        }
    }

    fn create_graphics_device(
        &mut self,
        _init: &GpuInit,
    ) -> Result<Rc<dyn GraphicsDevice>, PlatformError> {
        let mut s = self.shared.borrow_mut();
        if s.window.is_none() {
            return Err(PlatformError::NoWindow);
        }
        if let Some(reason) = s.fail_graphics_context.clone() {
            return Err(PlatformError::Context(reason));
        }
        s.devices_created += 1;

        let device: Rc<dyn GraphicsDevice> = self.device.clone();
        Ok(device)
    }

    fn terminate(&mut self) {
        self.destroy_window();
        let mut s = self.shared.borrow_mut();
        s.initialized = false;
        s.terminated = true;
    }
}

impl HeadlessProbe {
    pub fn device(&self) -> &HeadlessDevice {
        &self.device
    }

    pub fn window_geometry(&self) -> Option<WindowGeometry> {
        self.shared.borrow().window.as_ref().map(|w| w.geometry)
    }

    pub fn window_title(&self) -> Option<String> {
        self.shared.borrow().window.as_ref().map(|w| w.title.clone())
    }

    pub fn is_decorated(&self) -> Option<bool> {
        self.shared.borrow().window.as_ref().map(|w| w.decorated)
    }

    pub fn is_resizable(&self) -> Option<bool> {
        self.shared.borrow().window.as_ref().map(|w| w.resizable)
    }

    pub fn has_window(&self) -> bool {
        self.shared.borrow().window.is_some()
    }

    pub fn windows_created(&self) -> u32 {
        self.shared.borrow().windows_created
    }

    pub fn windows_destroyed(&self) -> u32 {
        self.shared.borrow().windows_destroyed
    }

    pub fn devices_created(&self) -> u32 {
        self.shared.borrow().devices_created
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.borrow().initialized
    }

    pub fn is_terminated(&self) -> bool {
        self.shared.borrow().terminated
    }

    pub fn polls(&self) -> u64 {
        self.shared.borrow().polls
    }

    pub fn swaps(&self) -> u64 {
        self.shared.borrow().swaps
    }

    pub fn should_close(&self) -> bool {
        self.shared.borrow().should_close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_destroy_leaves_no_window() {
        let mut platform = HeadlessPlatform::new();
        let probe = platform.probe();

        platform.initialize().unwrap();
        for (w, h) in [(1, 1), (640, 480), (3840, 2160)] {
            platform.create_window(w, h, "probe").unwrap();
            assert!(probe.has_window());
            platform.destroy_window();
            assert!(!probe.has_window());
        }

        assert_eq!(probe.windows_created(), 3);
        assert_eq!(probe.windows_destroyed(), 3);
    }

    #[test]
    fn second_window_is_rejected() {
        let mut platform = HeadlessPlatform::new();
        platform.initialize().unwrap();
        platform.create_window(800, 600, "a").unwrap();

        let err = platform.create_window(800, 600, "b").unwrap_err();
        assert!(matches!(err, PlatformError::WindowCreation(_)));
    }

    #[test]
    fn script_drives_polls_and_close_flag() {
        let mut platform = HeadlessPlatform::new()
            .with_poll([PlatformEvent::FramebufferResized { width: 10, height: 20 }])
            .with_poll([]);

        platform.initialize().unwrap();
        platform.create_window(100, 100, "s").unwrap();

        assert_eq!(platform.poll_events().len(), 1);
        assert_eq!(platform.framebuffer_size(), (10, 20));
        assert!(!platform.should_close());

        assert!(platform.poll_events().is_empty());
        assert!(platform.should_close());
    }

    #[test]
    fn window_resize_is_reported_on_next_poll() {
        let mut platform = HeadlessPlatform::new().with_frame_limit(5);
        platform.initialize().unwrap();
        platform.create_window(100, 100, "r").unwrap();

        platform.set_window_size(300, 200);
        assert_eq!(
            platform.poll_events(),
            vec![PlatformEvent::FramebufferResized { width: 300, height: 200 }]
        );
        assert!(platform.poll_events().is_empty());
    }

    #[test]
    fn injected_failures_surface_as_typed_errors() {
        let mut platform = HeadlessPlatform::new().fail_initialization("no display");
        assert!(matches!(
            platform.initialize(),
            Err(PlatformError::Initialization(r)) if r == "no display"
        ));

        let mut platform = HeadlessPlatform::new().fail_graphics_context("no adapter");
        platform.initialize().unwrap();
        platform.create_window(10, 10, "c").unwrap();
        assert!(matches!(
            platform.create_graphics_device(&GpuInit::default()),
            Err(PlatformError::Context(_))
        ));
    }
}
