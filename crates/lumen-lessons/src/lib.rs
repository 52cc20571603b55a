//! Lessons built on `lumen-engine`.
//!
//! Each lesson is an [`Application`](lumen_engine::Application) with a matching
//! binary under `src/bin`.

pub mod basic_window;
pub mod hello_triangle;
pub mod vertex;

pub use basic_window::BasicWindowApplication;
pub use hello_triangle::HelloTriangleApplication;

/// Absolute path of a file under this crate's `data/` directory.
#[macro_export]
macro_rules! data_path {
    ($relative:literal) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/data/", $relative)
    };
}
