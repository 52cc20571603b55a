use std::rc::Rc;
use std::sync::mpsc;

use crate::coords::{MonitorBounds, Viewport, WindowGeometry};
use crate::device::{ClearFlags, DebugMessage, GraphicsDevice};
use crate::input::{Key, KeyEvent};
use crate::window::Platform;

use super::config::AppConfig;
use super::debug_break::debug_break;

/// Lifecycle state handed to every [`Application`](super::Application) hook.
///
/// Owns the platform (and through it the window) and a handle to the graphics
/// device. The default hook bodies are exposed here as plain methods so that an
/// override can still run the base behavior.
pub struct AppContext {
    pub(super) platform: Box<dyn Platform>,
    device: Rc<dyn GraphicsDevice>,
    config: AppConfig,
    monitor: MonitorBounds,
    framebuffer: (i32, i32),
    fullscreen: bool,
    render_requested: bool,
    debug_breaks: u32,
    diagnostics: mpsc::Receiver<DebugMessage>,
}

impl AppContext {
    pub(crate) fn new(
        platform: Box<dyn Platform>,
        device: Rc<dyn GraphicsDevice>,
        config: AppConfig,
        monitor: MonitorBounds,
        diagnostics: mpsc::Receiver<DebugMessage>,
    ) -> Self {
        let (w, h) = platform.framebuffer_size();
        Self {
            platform,
            device,
            config,
            monitor,
            framebuffer: (w as i32, h as i32),
            fullscreen: false,
            render_requested: false,
            debug_breaks: 0,
            diagnostics,
        }
    }

    pub fn device(&self) -> &Rc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Last framebuffer size accepted from a resize, in pixels.
    pub fn framebuffer_size(&self) -> (i32, i32) {
        self.framebuffer
    }

    pub fn monitor(&self) -> MonitorBounds {
        self.monitor
    }

    pub fn window_geometry(&self) -> Option<WindowGeometry> {
        self.platform.window_geometry()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Number of debug breaks requested by error diagnostics so far.
    pub fn debug_breaks(&self) -> u32 {
        self.debug_breaks
    }

    /// Sets the close flag; the frame loop stops at its next check.
    pub fn request_close(&mut self) {
        self.platform.set_should_close(true);
    }

    pub fn should_close(&self) -> bool {
        self.platform.should_close()
    }

    /// Clears color and depth with the configured clear values.
    pub fn clear(&self) {
        self.device.clear(ClearFlags::COLOR_DEPTH);
    }

    /// Sets the viewport to cover the whole framebuffer.
    pub fn apply_framebuffer_viewport(&self) {
        let (w, h) = self.framebuffer;
        self.device.set_viewport(Viewport::from_size(w, h));
    }

    /// Escape requests close; the configured fullscreen key toggles fullscreen.
    pub fn handle_default_key_down(&mut self, event: &KeyEvent) {
        if event.key == Key::Escape {
            self.request_close();
        } else if event.key == self.config.fullscreen_key && !event.repeat {
            self.toggle_fullscreen();
        }
    }

    /// Logs `message` at its severity and, for error-kind messages, requests a
    /// debug break according to the configured policy.
    pub fn report_debug_message(&mut self, message: &DebugMessage) {
        log::log!(message.level(), "{message}");

        if message.is_error() {
            self.debug_breaks += 1;
            debug_break(self.config.debug_break_policy, message);
        }
    }

    /// Switches between a borderless window covering the primary monitor and
    /// the centred, decorated window. The runtime renders once as soon as the
    /// calling hook returns.
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;

        let geometry = if self.fullscreen {
            self.monitor.fullscreen()
        } else {
            self.monitor.centered(self.config.window_scale)
        };

        self.platform.set_decorated(!self.fullscreen);
        self.platform.set_resizable(!self.fullscreen);
        self.platform.set_window_position(geometry.x, geometry.y);
        self.platform.set_window_size(geometry.width, geometry.height);

        log::debug!(
            "fullscreen {}: {}x{} at ({}, {})",
            if self.fullscreen { "on" } else { "off" },
            geometry.width,
            geometry.height,
            geometry.x,
            geometry.y
        );

        self.render_requested = true;
    }

    pub(crate) fn set_framebuffer(&mut self, width: i32, height: i32) {
        self.framebuffer = (width, height);
        self.device.resize_framebuffer(width as u32, height as u32);
    }

    pub(crate) fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }

    /// Drains the diagnostic channel, dropping ignored ids.
    pub(crate) fn pending_diagnostics(&self) -> Vec<DebugMessage> {
        self.diagnostics
            .try_iter()
            .filter(|m| !self.config.is_ignored(m.id))
            .collect()
    }

    /// Releases the device handle, destroys the window and stops the platform.
    pub(crate) fn shutdown(self) {
        let AppContext {
            mut platform,
            device,
            ..
        } = self;

        drop(device);
        platform.destroy_window();
        platform.terminate();
    }
}
