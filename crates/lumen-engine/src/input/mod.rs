//! Keyboard input types.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Platform code is responsible for translating native key events into `KeyEvent`s.

pub(crate) mod platform;
mod types;

pub use types::{Key, KeyEvent, KeyState, Modifiers};
