//! Windowing platforms.
//!
//! The lifecycle talks to a window only through [`Platform`]. [`WinitPlatform`]
//! drives a real window with non-blocking event pumping.

mod platform;
mod winit;

pub use platform::{Platform, PlatformEvent};
pub use self::winit::WinitPlatform;
