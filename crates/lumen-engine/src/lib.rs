//! Lumen engine crate.
//!
//! A small real-time rendering framework: an application lifecycle driven over
//! a windowing [`window::Platform`], a [`device::GraphicsDevice`] abstraction
//! with a wgpu backend, and RAII resource builders for stage programs, program
//! pipelines, buffers and vertex input layouts.
//!
//! The `headless` feature adds recording test doubles for the platform and the
//! device.

pub mod core;
pub mod coords;
pub mod device;
pub mod error;
#[cfg(any(test, feature = "headless"))]
pub mod headless;
pub mod input;
pub mod logging;
pub mod paint;
pub mod resource;
pub mod time;
pub mod window;

pub use crate::core::{AppConfig, AppContext, Application, LifecycleState, RunSummary, Runtime};
