use crate::device::DebugMessage;
use crate::input::KeyEvent;
use crate::time::FrameTime;

use super::config::AppConfig;
use super::ctx::AppContext;

/// Application contract driven by [`Runtime::run`](super::Runtime::run).
///
/// Every hook has a default body. Overrides that still want the base behavior
/// call the matching [`AppContext`] method (`clear`,
/// `apply_framebuffer_viewport`, `handle_default_key_down`,
/// `report_debug_message`).
pub trait Application {
    /// Read once before the window is created.
    fn config(&self) -> AppConfig {
        AppConfig::default()
    }

    /// Called after the window and graphics device exist.
    fn initialize(&mut self, ctx: &mut AppContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Creates GPU resources. An error aborts the run before the first frame;
    /// `unload` is still called.
    fn load(&mut self, ctx: &mut AppContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Releases everything created in `load`. Called exactly once per run that
    /// got past Initialize.
    fn unload(&mut self, ctx: &mut AppContext) {
        let _ = ctx;
    }

    fn update(&mut self, ctx: &mut AppContext, time: FrameTime) {
        let _ = (ctx, time);
    }

    fn render(&mut self, ctx: &mut AppContext) {
        ctx.clear();
    }

    /// Called only for sizes with both dimensions greater than zero.
    fn on_framebuffer_resized(&mut self, ctx: &mut AppContext, width: i32, height: i32) {
        let _ = (width, height);
        ctx.apply_framebuffer_viewport();
    }

    /// Press and auto-repeat.
    fn on_key_down(&mut self, ctx: &mut AppContext, event: &KeyEvent) {
        ctx.handle_default_key_down(event);
    }

    fn on_key_up(&mut self, ctx: &mut AppContext, event: &KeyEvent) {
        let _ = (ctx, event);
    }

    /// Diagnostics reported by the graphics backend, minus ignored ids.
    fn on_debug_message(&mut self, ctx: &mut AppContext, message: &DebugMessage) {
        ctx.report_debug_message(message);
    }
}
