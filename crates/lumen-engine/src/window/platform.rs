use std::rc::Rc;

use crate::coords::{MonitorBounds, WindowGeometry};
use crate::device::{GpuInit, GraphicsDevice};
use crate::error::PlatformError;
use crate::input::KeyEvent;

/// Event returned by [`Platform::poll_events`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlatformEvent {
    /// New framebuffer size in physical pixels. Minimized windows report zero.
    FramebufferResized { width: i32, height: i32 },
    Key(KeyEvent),
}

/// Windowing capabilities consumed by the lifecycle.
///
/// A platform owns at most one window. Window close requests from the system
/// set the close flag directly; they are not returned as events.
pub trait Platform {
    /// Starts the windowing subsystem.
    fn initialize(&mut self) -> Result<(), PlatformError>;

    fn primary_monitor(&mut self) -> Result<MonitorBounds, PlatformError>;

    fn create_window(&mut self, width: u32, height: u32, title: &str) -> Result<(), PlatformError>;

    fn destroy_window(&mut self);

    fn has_window(&self) -> bool;

    /// Dispatches pending system events without blocking and returns the ones
    /// the lifecycle routes to the application, in arrival order.
    fn poll_events(&mut self) -> Vec<PlatformEvent>;

    /// Signals that the frame for the window is about to be presented.
    fn swap_buffers(&mut self);

    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, value: bool);

    /// Current framebuffer size in physical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn window_geometry(&self) -> Option<WindowGeometry>;

    fn set_decorated(&mut self, decorated: bool);

    fn set_resizable(&mut self, resizable: bool);

    fn set_window_position(&mut self, x: i32, y: i32);

    fn set_window_size(&mut self, width: u32, height: u32);

    /// Acquires a graphics device that renders into the window.
    fn create_graphics_device(
        &mut self,
        init: &GpuInit,
    ) -> Result<Rc<dyn GraphicsDevice>, PlatformError>;

    /// Releases the windowing subsystem. Destroys the window if still present.
    fn terminate(&mut self);
}
