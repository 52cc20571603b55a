//! Screen-space geometry shared by the platform layer and the lifecycle.
//!
//! All values are physical pixels.

mod geometry;
mod viewport;

pub use geometry::{MonitorBounds, WindowGeometry};
pub use viewport::Viewport;
