//! Application lifecycle.
//!
//! [`Runtime::run`] owns the platform and drives an [`Application`] through
//! Initialize, Load, the frame loop and Unload. Hooks receive an
//! [`AppContext`] that exposes the device, the window state and the default
//! hook behaviors.

mod app;
mod config;
mod ctx;
mod debug_break;
mod runtime;

#[cfg(test)]
mod tests;

pub use app::Application;
pub use config::{AppConfig, DebugBreakPolicy, DEFAULT_IGNORED_DEBUG_IDS};
pub use ctx::AppContext;
pub use runtime::{LifecycleState, RunSummary, Runtime};
