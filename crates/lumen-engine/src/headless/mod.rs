//! In-memory platform and device.
//!
//! Used by the test suites and by CI runs that have no display or GPU. The
//! device records every call it receives; the platform replays scripted events.

mod device;
mod platform;

pub use device::{BufferRecord, DeviceCall, HeadlessDevice, LayoutRecord, PipelineRecord, ProgramRecord};
pub use platform::{HeadlessPlatform, HeadlessProbe};
