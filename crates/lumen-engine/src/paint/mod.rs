//! Color values used by the lifecycle and the device layer.

mod color;

pub use color::Color;
