//! Frame timing.
//!
//! The lifecycle owns one [`FrameClock`] and ticks it once per frame, just
//! before the `update` hook.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
