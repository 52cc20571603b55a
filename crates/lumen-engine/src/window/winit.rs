use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::coords::{MonitorBounds, WindowGeometry};
use crate::device::{Gpu, GpuInit, GraphicsDevice, WgpuDevice};
use crate::error::PlatformError;
use crate::input::platform::winit::{map_modifiers, translate_key_event};
use crate::input::Modifiers;

use super::{Platform, PlatformEvent};

/// Pumps allowed while waiting for the event loop to service a request.
const MAX_SERVICE_PUMPS: usize = 64;

/// [`Platform`] backed by a winit event loop that is pumped, never run.
///
/// Window creation and monitor queries need an active event loop, so they are
/// queued and serviced from inside the next pump.
#[derive(Default)]
pub struct WinitPlatform {
    event_loop: Option<EventLoop<()>>,
    state: WinitState,
}

#[derive(Default)]
struct WinitState {
    window: Option<Arc<Window>>,
    pending_window: Option<WindowAttributes>,
    creation_error: Option<String>,
    monitor: Option<MonitorBounds>,
    monitor_queried: bool,
    events: Vec<PlatformEvent>,
    modifiers: Modifiers,
    should_close: bool,
}

impl WinitPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window handle, when one exists.
    pub fn window(&self) -> Option<&Arc<Window>> {
        self.state.window.as_ref()
    }

    fn pump(&mut self) -> Result<(), PlatformError> {
        let event_loop = self
            .event_loop
            .as_mut()
            .ok_or_else(|| PlatformError::Initialization("event loop not started".into()))?;

        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state) {
            log::debug!("winit: event loop exited with code {code}");
            self.state.should_close = true;
        }
        Ok(())
    }

    /// Pumps until `done` holds or the pump budget runs out.
    fn pump_until(&mut self, done: impl Fn(&WinitState) -> bool) -> Result<bool, PlatformError> {
        for _ in 0..MAX_SERVICE_PUMPS {
            if done(&self.state) {
                return Ok(true);
            }
            self.pump()?;
        }
        Ok(done(&self.state))
    }

    fn with_window(&self, f: impl FnOnce(&Window)) {
        match self.state.window.as_deref() {
            Some(window) => f(window),
            None => log::warn!("winit: window operation ignored, no window"),
        }
    }
}

impl Platform for WinitPlatform {
    fn initialize(&mut self) -> Result<(), PlatformError> {
        if self.event_loop.is_some() {
            return Ok(());
        }

        let event_loop =
            EventLoop::new().map_err(|e| PlatformError::Initialization(e.to_string()))?;
        self.event_loop = Some(event_loop);
        Ok(())
    }

    fn primary_monitor(&mut self) -> Result<MonitorBounds, PlatformError> {
        if self.state.monitor.is_none() {
            self.state.monitor_queried = false;
            self.pump_until(|s| s.monitor_queried)?;
        }

        self.state
            .monitor
            .ok_or_else(|| PlatformError::Initialization("no monitor available".into()))
    }

    fn create_window(&mut self, width: u32, height: u32, title: &str) -> Result<(), PlatformError> {
        if self.state.window.is_some() {
            return Err(PlatformError::WindowCreation("a window already exists".into()));
        }

        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)))
            .with_resizable(true)
            .with_decorations(true);

        self.state.creation_error = None;
        self.state.pending_window = Some(attrs);

        let serviced =
            self.pump_until(|s| s.window.is_some() || s.creation_error.is_some())?;

        if let Some(err) = self.state.creation_error.take() {
            return Err(PlatformError::WindowCreation(err));
        }
        if !serviced {
            self.state.pending_window = None;
            return Err(PlatformError::WindowCreation(
                "event loop did not service the request".into(),
            ));
        }

        self.state.should_close = false;
        Ok(())
    }

    fn destroy_window(&mut self) {
        if self.state.window.take().is_some() {
            log::debug!("winit: window destroyed");
        }
        self.state.events.clear();
    }

    fn has_window(&self) -> bool {
        self.state.window.is_some()
    }

    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        if let Err(e) = self.pump() {
            log::error!("winit: {e}");
            self.state.should_close = true;
        }
        std::mem::take(&mut self.state.events)
    }

    fn swap_buffers(&mut self) {
        if let Some(window) = &self.state.window {
            window.pre_present_notify();
        }
    }

    fn should_close(&self) -> bool {
        self.state.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.state.should_close = value;
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.state
            .window
            .as_ref()
            .map(|w| {
                let size = w.inner_size();
                (size.width, size.height)
            })
            .unwrap_or((0, 0))
    }

    fn window_geometry(&self) -> Option<WindowGeometry> {
        let window = self.state.window.as_ref()?;
        let position = window.outer_position().unwrap_or_default();
        let size = window.inner_size();

        Some(WindowGeometry {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        })
    }

    fn set_decorated(&mut self, decorated: bool) {
        self.with_window(|w| w.set_decorations(decorated));
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.with_window(|w| w.set_resizable(resizable));
    }

    fn set_window_position(&mut self, x: i32, y: i32) {
        self.with_window(|w| w.set_outer_position(PhysicalPosition::new(x, y)));
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.with_window(|w| {
            // Applied asynchronously on most platforms; the resulting resize
            // arrives through `poll_events`.
            let _ = w.request_inner_size(PhysicalSize::new(width, height));
        });
    }

    fn create_graphics_device(
        &mut self,
        init: &GpuInit,
    ) -> Result<Rc<dyn GraphicsDevice>, PlatformError> {
        let window = self.state.window.clone().ok_or(PlatformError::NoWindow)?;

        let gpu = pollster::block_on(Gpu::new(window, init.clone()))
            .map_err(|e| PlatformError::Context(format!("{e:#}")))?;

        Ok(Rc::new(WgpuDevice::new(gpu)))
    }

    fn terminate(&mut self) {
        self.destroy_window();
        if self.event_loop.take().is_some() {
            log::debug!("winit: event loop released");
        }
    }
}

impl WinitState {
    /// Services queued requests that need an active event loop.
    fn service(&mut self, event_loop: &ActiveEventLoop) {
        if !self.monitor_queried {
            self.monitor = query_primary_monitor(event_loop);
            self.monitor_queried = true;
        }

        if let Some(attrs) = self.pending_window.take() {
            match event_loop.create_window(attrs) {
                Ok(window) => {
                    log::debug!("winit: window {:?} created", window.id());
                    self.window = Some(Arc::new(window));
                }
                Err(e) => self.creation_error = Some(e.to_string()),
            }
        }
    }
}

fn query_primary_monitor(event_loop: &ActiveEventLoop) -> Option<MonitorBounds> {
    let monitor = event_loop
        .primary_monitor()
        .or_else(|| event_loop.available_monitors().next())?;

    let size = monitor.size();
    let position = monitor.position();

    Some(MonitorBounds::new(size.width, size.height, position.x, position.y))
}

impl ApplicationHandler for WinitState {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, _cause: StartCause) {
        self.service(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.service(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.should_close = true,

            WindowEvent::Resized(size) => {
                self.events.push(PlatformEvent::FramebufferResized {
                    width: size.width as i32,
                    height: size.height as i32,
                });
            }

            WindowEvent::ModifiersChanged(m) => self.modifiers = map_modifiers(m.state()),

            WindowEvent::KeyboardInput { event, .. } => {
                self.events
                    .push(PlatformEvent::Key(translate_key_event(&event, self.modifiers)));
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.service(event_loop);
    }
}
