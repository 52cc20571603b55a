use crate::device::{GpuInit, RenderState};
use crate::input::Key;
use crate::paint::Color;

/// What the lifecycle does when the graphics backend reports an error-kind
/// diagnostic.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DebugBreakPolicy {
    /// Raise a breakpoint trap so an attached debugger stops at the report.
    ///
    /// Without a debugger attached the process is terminated by the OS.
    Trap,
    /// Panic with the diagnostic text.
    Panic,
    /// Log the diagnostic and keep running.
    LogOnly,
}

impl Default for DebugBreakPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            DebugBreakPolicy::Trap
        } else {
            DebugBreakPolicy::LogOnly
        }
    }
}

/// Diagnostic ids that are known to be informational noise.
pub const DEFAULT_IGNORED_DEBUG_IDS: [u32; 7] = [131169, 131185, 131218, 131204, 131222, 131154, 0];

/// Application configuration.
///
/// Read once through [`Application::config`](super::Application::config)
/// before the window is created.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,

    /// Windowed size as a fraction of the primary monitor, clamped to `[0.05, 1]`.
    pub window_scale: f32,

    pub clear_color: Color,
    pub clear_depth: f32,
    pub render_state: RenderState,

    /// Key handled by the default `on_key_down` to toggle fullscreen.
    pub fullscreen_key: Key,

    pub debug_break_policy: DebugBreakPolicy,

    /// Diagnostics with these ids are dropped before reaching any hook.
    pub ignored_debug_ids: Vec<u32>,

    pub gpu: GpuInit,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            window_scale: 0.8,
            clear_color: Color::new(0.35, 0.76, 0.16, 1.0),
            clear_depth: 1.0,
            render_state: RenderState::default(),
            fullscreen_key: Key::F11,
            debug_break_policy: DebugBreakPolicy::default(),
            ignored_debug_ids: DEFAULT_IGNORED_DEBUG_IDS.to_vec(),
            gpu: GpuInit::default(),
        }
    }
}

impl AppConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn is_ignored(&self, id: u32) -> bool {
        self.ignored_debug_ids.contains(&id)
    }
}
